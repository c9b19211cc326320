use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use fleet_framework_config::constants::{
    NETWORK_FILE_NAME, NODE_DEFAULTS_CONTENTS, NODE_DEFAULTS_FILE_NAME,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::descriptor::FleetDescriptor;

#[derive(Debug, Error)]
/// Failures writing the rendered fleet to disk.
pub enum AssetsError {
    #[error("network name {name:?} must be a single non-empty path component")]
    InvalidNetworkName { name: String },
    #[error("failed to create network directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write asset at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to render network.yaml: {source}")]
    Render {
        #[source]
        source: serde_yaml::Error,
    },
}

/// Files produced for one generated fleet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FleetArtifacts {
    pub network_dir: PathBuf,
    pub network_file: PathBuf,
    pub defaults_file: PathBuf,
}

pub fn render_network_yaml(descriptor: &FleetDescriptor) -> Result<String, AssetsError> {
    serde_yaml::to_string(descriptor).map_err(|source| AssetsError::Render { source })
}

/// Write `network.yaml` and `node-defaults.yaml` under `root/network_name`.
///
/// The directory is created if needed; existing files are overwritten.
pub fn write_fleet(
    root: &Path,
    network_name: &str,
    descriptor: &FleetDescriptor,
) -> Result<FleetArtifacts, AssetsError> {
    let network_dir = network_dir(root, network_name)?;
    info!(
        nodes = descriptor.nodes().len(),
        dir = %network_dir.display(),
        "writing fleet assets"
    );

    fs::create_dir_all(&network_dir).map_err(|source| AssetsError::CreateDir {
        path: network_dir.clone(),
        source,
    })?;

    let network_yaml = render_network_yaml(descriptor)?;
    let network_file = write_file(&network_dir, NETWORK_FILE_NAME, network_yaml)?;
    let defaults_file = write_file(&network_dir, NODE_DEFAULTS_FILE_NAME, NODE_DEFAULTS_CONTENTS)?;

    debug!(
        network = %network_file.display(),
        defaults = %defaults_file.display(),
        "fleet assets written"
    );

    Ok(FleetArtifacts {
        network_dir,
        network_file,
        defaults_file,
    })
}

fn network_dir(root: &Path, network_name: &str) -> Result<PathBuf, AssetsError> {
    let mut components = Path::new(network_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(root.join(network_name)),
        _ => Err(AssetsError::InvalidNetworkName {
            name: network_name.to_owned(),
        }),
    }
}

fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf, AssetsError> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|source| AssetsError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
