use std::path::Path;

use fleet_framework_config::{
    constants::MINTER_NAME,
    fleet::{FleetConfig, FleetConfigError},
    genesis::{GenesisError, GenesisMaterial, derive_genesis},
    nodes::{
        ADMIN_PERMISSIONS, ChannelSequence, ChannelSpec, FleetNode, MinterNode, NodeError,
        ln_endpoint, node_name,
    },
    topology::invariants::{FleetInvariantError, validate_fleet},
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use super::stage::BuildStage;
use crate::{
    assets::{AssetsError, FleetArtifacts, write_fleet},
    credentials::{CredentialIssuer, IssuanceError, issue_credential},
    descriptor::FleetDescriptor,
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{operation} requires stage {expected}, builder is at {actual}")]
    OutOfOrder {
        operation: &'static str,
        expected: BuildStage,
        actual: BuildStage,
    },
    #[error("fleet must include at least one node")]
    EmptyFleet,
    #[error(transparent)]
    Config(#[from] FleetConfigError),
    #[error(transparent)]
    Genesis(#[from] GenesisError),
    #[error(transparent)]
    Issuance(#[from] IssuanceError),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Invariants(#[from] FleetInvariantError),
    #[error(transparent)]
    Assets(#[from] AssetsError),
}

/// Drives one fleet from genesis to written assets.
///
/// Operations must run in order: `derive_genesis`, `add_nodes`,
/// `add_channels`, `add_minter`, `write`. A call made at the wrong stage
/// fails with [`BuildError::OutOfOrder`] and leaves the builder untouched.
pub struct FleetBuilder<I> {
    network_name: String,
    config: FleetConfig,
    issuer: I,
    stage: BuildStage,
    genesis: Option<GenesisMaterial>,
    nodes: Vec<FleetNode>,
    minter: Option<MinterNode>,
    channel_ids: ChannelSequence,
    channel_count: usize,
}

impl<I: CredentialIssuer> FleetBuilder<I> {
    pub fn new(
        network_name: impl Into<String>,
        config: FleetConfig,
        issuer: I,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let channel_ids = ChannelSequence::new(
            config.channels.first_block,
            config.channels.channels_per_block,
        );

        Ok(Self {
            network_name: network_name.into(),
            config,
            issuer,
            stage: BuildStage::Uninitialized,
            genesis: None,
            nodes: Vec::new(),
            minter: None,
            channel_ids,
            channel_count: 0,
        })
    }

    fn require(&self, operation: &'static str, expected: BuildStage) -> Result<(), BuildError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(BuildError::OutOfOrder {
                operation,
                expected,
                actual: self.stage,
            })
        }
    }

    /// Derive the signet challenge and minter key import for this fleet.
    pub fn derive_genesis(&mut self) -> Result<&GenesisMaterial, BuildError> {
        self.require("derive_genesis", BuildStage::Uninitialized)?;

        let genesis = derive_genesis()?;
        debug!(challenge = %genesis.challenge_hex(), "derived signet challenge");
        self.stage = BuildStage::GenesisReady;
        Ok(self.genesis.insert(genesis))
    }

    /// Create `count` nodes, issuing one credential per node in order.
    ///
    /// Nothing is kept if any issuance fails.
    pub async fn add_nodes(&mut self, count: usize) -> Result<(), BuildError> {
        self.require("add_nodes", BuildStage::GenesisReady)?;
        if count == 0 {
            return Err(BuildError::EmptyFleet);
        }

        let mut nodes = Vec::with_capacity(count);
        for index in 0..count {
            let name = node_name(index);
            let credential = issue_credential(&self.issuer, &ADMIN_PERMISSIONS).await?;
            debug!(node = %name, "issued node credential");
            nodes.push(FleetNode::generate(name, &self.config.images, credential)?);
        }

        info!(nodes = count, "created fleet nodes");
        self.nodes = nodes;
        self.stage = BuildStage::NodesReady;
        Ok(())
    }

    /// Make `count - 1` random channel attempts using the thread-local RNG.
    pub fn add_channels(&mut self, count: usize) -> Result<(), BuildError> {
        self.add_channels_with_rng(count, &mut rand::thread_rng())
    }

    /// Make `count - 1` attempts, each picking a source and a target node
    /// uniformly with replacement. Draws where both are the same node are
    /// skipped and still use up the attempt.
    pub fn add_channels_with_rng<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        self.require("add_channels", BuildStage::NodesReady)?;

        let params = self.config.channels;
        let fleet_size = self.nodes.len();
        let mut opened = 0usize;
        for _ in 1..count {
            let source = rng.gen_range(0..fleet_size);
            let target = rng.gen_range(0..fleet_size);
            if source == target {
                trace!(node = self.nodes[source].name(), "skipping self-loop channel");
                continue;
            }

            let channel = ChannelSpec {
                id: self.channel_ids.allocate(),
                target: ln_endpoint(self.nodes[target].name()),
                capacity: params.capacity,
                push_amount: params.push_amount,
            };
            trace!(
                source = self.nodes[source].name(),
                target = %channel.target,
                block = channel.id.block,
                index = channel.id.index,
                "opening channel"
            );
            self.nodes[source].open_channel(channel)?;
            opened += 1;
        }

        info!(
            attempts = count.saturating_sub(1),
            channels = opened,
            "wired channel graph"
        );
        self.channel_count += opened;
        self.stage = BuildStage::ChannelsReady;
        Ok(())
    }

    /// Create the minter and have every node dial it.
    pub async fn add_minter(&mut self) -> Result<(), BuildError> {
        self.require("add_minter", BuildStage::ChannelsReady)?;

        let credential = issue_credential(&self.issuer, &ADMIN_PERMISSIONS).await?;
        let minter = MinterNode::generate(&self.config.images, credential)?;
        for node in &mut self.nodes {
            node.add_peer(MINTER_NAME);
        }

        debug!(minter = minter.name(), "attached minter");
        self.minter = Some(minter);
        self.stage = BuildStage::MinterAttached;
        Ok(())
    }

    /// Render the fleet without touching the filesystem.
    pub fn declaration(&self) -> Result<FleetDescriptor, BuildError> {
        let (Some(genesis), Some(minter)) = (&self.genesis, &self.minter) else {
            return Err(BuildError::OutOfOrder {
                operation: "declaration",
                expected: BuildStage::MinterAttached,
                actual: self.stage,
            });
        };

        validate_fleet(&self.nodes, Some(minter))?;
        Ok(FleetDescriptor::builder(genesis, &self.config).build(&self.nodes, minter))
    }

    /// Validate, render and write `network.yaml` plus `node-defaults.yaml`
    /// under `root/<network name>`.
    pub fn write(&mut self, root: &Path) -> Result<FleetArtifacts, BuildError> {
        self.require("write", BuildStage::MinterAttached)?;

        let descriptor = self.declaration()?;
        let artifacts = write_fleet(root, &self.network_name, &descriptor)?;
        info!(
            network = %self.network_name,
            nodes = self.nodes.len(),
            channels = self.channel_count,
            path = %artifacts.network_file.display(),
            "fleet written"
        );
        self.stage = BuildStage::Written;
        Ok(artifacts)
    }

    #[must_use]
    pub const fn stage(&self) -> BuildStage {
        self.stage
    }

    #[must_use]
    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    #[must_use]
    pub const fn config(&self) -> &FleetConfig {
        &self.config
    }

    #[must_use]
    pub const fn genesis(&self) -> Option<&GenesisMaterial> {
        self.genesis.as_ref()
    }

    #[must_use]
    pub fn nodes(&self) -> &[FleetNode] {
        &self.nodes
    }

    #[must_use]
    pub const fn minter(&self) -> Option<&MinterNode> {
        self.minter.as_ref()
    }

    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }
}
