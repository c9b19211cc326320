use std::{fs, path::Path};

use anyhow::Context as _;
use async_trait::async_trait;
use fleet_framework_config::{fleet::FleetConfig, nodes::Permission};
use fleet_framework_core::{
    CredentialIssuer, FleetArtifacts, FleetBuilder, IssuanceError,
};
use serde_yaml::Value;

/// Issuer that never shells out: the macaroon is derived from the root key so
/// every node still gets a distinct credential.
pub struct EchoIssuer;

#[async_trait]
impl CredentialIssuer for EchoIssuer {
    async fn bake(
        &self,
        root_key_hex: &str,
        _permissions: &[Permission],
    ) -> Result<String, IssuanceError> {
        Ok(format!("0201{root_key_hex}"))
    }
}

/// Run every builder stage and write the fleet under `root/network`.
pub async fn generate_fleet(
    root: &Path,
    network: &str,
    nodes: usize,
    channels: usize,
) -> anyhow::Result<FleetArtifacts> {
    let mut builder = FleetBuilder::new(network, FleetConfig::default(), EchoIssuer)?;
    builder.derive_genesis()?;
    builder.add_nodes(nodes).await?;
    builder.add_channels(channels)?;
    builder.add_minter().await?;
    Ok(builder.write(root)?)
}

/// Parse a written `network.yaml` back into its `nodes` list.
pub fn read_nodes(artifacts: &FleetArtifacts) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(&artifacts.network_file)
        .with_context(|| format!("reading {}", artifacts.network_file.display()))?;
    let doc: Value = serde_yaml::from_str(&raw).context("parsing network.yaml")?;
    let nodes = doc
        .get("nodes")
        .and_then(Value::as_sequence)
        .context("network.yaml has no nodes list")?;
    Ok(nodes.clone())
}

/// Value of `key=...` inside a node's bitcoind config block.
#[must_use]
pub fn config_value<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get("config")?
        .as_str()?
        .lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
}

#[must_use]
pub fn str_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key)?.as_str()
}
