use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use fleet_framework_env as tf_env;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    constants::{
        DEFAULT_BITCOIN_IMAGE_TAG, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CHANNEL_FIRST_BLOCK,
        DEFAULT_CHANNEL_PUSH_AMOUNT, DEFAULT_CHANNELS_PER_BLOCK, DEFAULT_EXPORTER_IMAGE,
        DEFAULT_LND_IMAGE_TAG, DEFAULT_METRICS_PORT, DEFAULT_MINTER_IMAGE_TAG,
        DEFAULT_SIGNER_ATTEMPTS, DEFAULT_SIGNER_PROGRAM, DEFAULT_SIGNER_SUBCOMMAND,
    },
    timeouts,
};

#[derive(Debug, Error)]
pub enum FleetConfigError {
    #[error("failed to open fleet config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse fleet config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("channel push amount {push_amount} exceeds capacity {capacity}")]
    PushExceedsCapacity { capacity: u64, push_amount: u64 },
    #[error("channels_per_block must be > 0")]
    EmptyChannelBlock,
    #[error("signer attempts must be > 0")]
    NoSignerAttempts,
}

/// Tunables for a generated fleet. Every field falls back to the reference
/// values, so an empty YAML document is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FleetConfig {
    pub images: ImageConfig,
    pub channels: ChannelParams,
    pub metrics: MetricsConfig,
    pub signer: SignerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    pub bitcoin_tag: String,
    pub minter_tag: String,
    pub lnd_tag: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            bitcoin_tag: DEFAULT_BITCOIN_IMAGE_TAG.to_owned(),
            minter_tag: DEFAULT_MINTER_IMAGE_TAG.to_owned(),
            lnd_tag: DEFAULT_LND_IMAGE_TAG.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelParams {
    pub capacity: u64,
    pub push_amount: u64,
    pub first_block: u64,
    pub channels_per_block: u32,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            push_amount: DEFAULT_CHANNEL_PUSH_AMOUNT,
            first_block: DEFAULT_CHANNEL_FIRST_BLOCK,
            channels_per_block: DEFAULT_CHANNELS_PER_BLOCK,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    pub exporter_image: String,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            exporter_image: DEFAULT_EXPORTER_IMAGE.to_owned(),
            port: DEFAULT_METRICS_PORT,
        }
    }
}

/// How to reach the external macaroon signer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignerConfig {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub attempts: u32,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            program: tf_env::fleet_signer_bin()
                .unwrap_or_else(|| DEFAULT_SIGNER_PROGRAM.to_owned()),
            args: vec![DEFAULT_SIGNER_SUBCOMMAND.to_owned()],
            timeout_secs: None,
            attempts: tf_env::fleet_signer_attempts().unwrap_or(DEFAULT_SIGNER_ATTEMPTS),
        }
    }
}

impl SignerConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(|secs| crate::adjust_timeout(Duration::from_secs(secs)))
            .unwrap_or_else(timeouts::signer_timeout)
    }
}

impl FleetConfig {
    pub fn validate(&self) -> Result<(), FleetConfigError> {
        if self.channels.push_amount > self.channels.capacity {
            return Err(FleetConfigError::PushExceedsCapacity {
                capacity: self.channels.capacity,
                push_amount: self.channels.push_amount,
            });
        }
        if self.channels.channels_per_block == 0 {
            return Err(FleetConfigError::EmptyChannelBlock);
        }
        if self.signer.attempts == 0 {
            return Err(FleetConfigError::NoSignerAttempts);
        }
        Ok(())
    }
}

pub fn load_fleet_config(path: &Path) -> Result<FleetConfig, FleetConfigError> {
    debug!(path = %path.display(), "loading fleet config");
    let file = File::open(path).map_err(|source| FleetConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FleetConfig =
        serde_yaml::from_reader(file).map_err(|source| FleetConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
