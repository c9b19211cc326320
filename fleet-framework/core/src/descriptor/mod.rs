use fleet_framework_config::{
    fleet::FleetConfig,
    genesis::GenesisMaterial,
    nodes::{FleetNode, MinterNode},
};
use serde::Serialize;

mod minter;
mod node;

pub use minter::{ExecAction, StartupProbe};
pub use node::{
    ContainerPort, ContainerSpec, EnvEntry, GlobalSettings, ImageTag, LnToggle, LndDeclaration,
    NodeDeclaration, VolumeMount,
};

/// Top-level warnet `network.yaml` built from a wired fleet.
#[derive(Clone, Debug, Serialize)]
pub struct FleetDescriptor {
    nodes: Vec<NodeDeclaration>,
    caddy: CaddyToggle,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct CaddyToggle {
    pub enabled: bool,
}

impl FleetDescriptor {
    /// Start building a descriptor for the given genesis and config.
    #[must_use]
    pub const fn builder<'a>(
        genesis: &'a GenesisMaterial,
        config: &'a FleetConfig,
    ) -> FleetDescriptorBuilder<'a> {
        FleetDescriptorBuilder::new(genesis, config)
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeDeclaration] {
        &self.nodes
    }

    #[must_use]
    pub const fn caddy(&self) -> CaddyToggle {
        self.caddy
    }
}

/// Builder for `FleetDescriptor` that renders each node against the shared
/// genesis material.
pub struct FleetDescriptorBuilder<'a> {
    genesis: &'a GenesisMaterial,
    config: &'a FleetConfig,
    caddy: Option<bool>,
}

impl<'a> FleetDescriptorBuilder<'a> {
    const fn new(genesis: &'a GenesisMaterial, config: &'a FleetConfig) -> Self {
        Self {
            genesis,
            config,
            caddy: None,
        }
    }

    #[must_use]
    /// Toggle the caddy reverse-proxy sidecar (enabled by default).
    pub const fn with_caddy(mut self, enabled: bool) -> Self {
        self.caddy = Some(enabled);
        self
    }

    /// Render ordinary nodes in roster order followed by the minter.
    #[must_use]
    pub fn build(self, nodes: &[FleetNode], minter: &MinterNode) -> FleetDescriptor {
        let mut declarations: Vec<NodeDeclaration> = nodes
            .iter()
            .map(|node| NodeDeclaration::from_node(node, self.genesis, self.config))
            .collect();
        declarations.push(NodeDeclaration::from_minter(
            minter,
            self.genesis,
            self.config,
        ));

        FleetDescriptor {
            nodes: declarations,
            caddy: CaddyToggle {
                enabled: self.caddy.unwrap_or(true),
            },
        }
    }
}
