use rand::{RngCore as _, rngs::OsRng};
use thiserror::Error;

use super::{channel::ChannelSpec, credential::Credential};
use crate::{
    constants::{LN_ENDPOINT_SUFFIX, MINTER_NAME, NODE_NAME_PREFIX},
    fleet::ImageConfig,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("secure entropy source unavailable: {0}")]
    Entropy(String),
    #[error("node {node} cannot open a channel to itself")]
    SelfLoop { node: String },
}

/// Sequential, zero-padded fleet member name.
#[must_use]
pub fn node_name(index: usize) -> String {
    format!("{NODE_NAME_PREFIX}-{index:04}")
}

/// Name of the lightning daemon sitting next to `node`.
#[must_use]
pub fn ln_endpoint(node: &str) -> String {
    format!("{node}{LN_ENDPOINT_SUFFIX}")
}

fn rpc_password() -> Result<String, NodeError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| NodeError::Entropy(err.to_string()))?;
    Ok(hex::encode(bytes))
}

/// One bitcoind + lnd pair in the fleet.
#[derive(Clone, Debug)]
pub struct FleetNode {
    name: String,
    bitcoin_image_tag: String,
    lnd_image_tag: String,
    rpc_password: String,
    addnode: Vec<String>,
    channels: Vec<ChannelSpec>,
    credential: Credential,
}

impl FleetNode {
    /// Build a node with a fresh RPC password and no peers or channels.
    pub fn generate(
        name: impl Into<String>,
        images: &ImageConfig,
        credential: Credential,
    ) -> Result<Self, NodeError> {
        Ok(Self::new(
            name,
            images.bitcoin_tag.clone(),
            images.lnd_tag.clone(),
            rpc_password()?,
            credential,
        ))
    }

    #[must_use]
    pub fn new(
        name: impl Into<String>,
        bitcoin_image_tag: impl Into<String>,
        lnd_image_tag: impl Into<String>,
        rpc_password: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            name: name.into(),
            bitcoin_image_tag: bitcoin_image_tag.into(),
            lnd_image_tag: lnd_image_tag.into(),
            rpc_password: rpc_password.into(),
            addnode: Vec::new(),
            channels: Vec::new(),
            credential,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ln_endpoint(&self) -> String {
        ln_endpoint(&self.name)
    }

    #[must_use]
    pub fn bitcoin_image_tag(&self) -> &str {
        &self.bitcoin_image_tag
    }

    #[must_use]
    pub fn lnd_image_tag(&self) -> &str {
        &self.lnd_image_tag
    }

    #[must_use]
    pub fn rpc_password(&self) -> &str {
        &self.rpc_password
    }

    #[must_use]
    pub fn addnode(&self) -> &[String] {
        &self.addnode
    }

    #[must_use]
    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn add_peer(&mut self, peer: impl Into<String>) {
        self.addnode.push(peer.into());
    }

    /// Append a channel this node initiates. Channels to the node's own
    /// lightning endpoint are rejected.
    pub fn open_channel(&mut self, channel: ChannelSpec) -> Result<(), NodeError> {
        if channel.target == self.ln_endpoint() {
            return Err(NodeError::SelfLoop {
                node: self.name.clone(),
            });
        }
        self.channels.push(channel);
        Ok(())
    }
}

/// The single block producer. Carries the same base record as any node but
/// never takes part in the channel graph.
#[derive(Clone, Debug)]
pub struct MinterNode {
    node: FleetNode,
}

impl MinterNode {
    pub fn generate(images: &ImageConfig, credential: Credential) -> Result<Self, NodeError> {
        Ok(Self {
            node: FleetNode::new(
                MINTER_NAME,
                images.minter_tag.clone(),
                images.lnd_tag.clone(),
                rpc_password()?,
                credential,
            ),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.node.name()
    }

    #[must_use]
    pub fn node(&self) -> &FleetNode {
        &self.node
    }
}
