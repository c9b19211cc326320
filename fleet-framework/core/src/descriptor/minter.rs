use fleet_framework_config::{
    constants::{
        MINTER_NAME, MINTER_PROBE_FAILURE_THRESHOLD, MINTER_PROBE_PERIOD_SECS,
        MINTER_PROBE_SUCCESS_THRESHOLD, MINTER_PROBE_TIMEOUT_SECS,
    },
    fleet::FleetConfig,
    genesis::GenesisMaterial,
    nodes::MinterNode,
};
use serde::Serialize;

use super::node::NodeDeclaration;

/// Readiness gate that only passes once the minter wallet holds the signet
/// signing key.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartupProbe {
    pub failure_threshold: u32,
    pub period_seconds: u32,
    pub success_threshold: u32,
    pub timeout_seconds: u32,
    pub exec: ExecAction,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ExecAction {
    pub command: Vec<String>,
}

impl StartupProbe {
    #[must_use]
    pub fn import_genesis(genesis: &GenesisMaterial) -> Self {
        Self {
            failure_threshold: MINTER_PROBE_FAILURE_THRESHOLD,
            period_seconds: MINTER_PROBE_PERIOD_SECS,
            success_threshold: MINTER_PROBE_SUCCESS_THRESHOLD,
            timeout_seconds: MINTER_PROBE_TIMEOUT_SECS,
            exec: ExecAction {
                command: vec![
                    "/bin/sh".to_owned(),
                    "-c".to_owned(),
                    format!(
                        "bitcoin-cli createwallet {MINTER_NAME} && bitcoin-cli importdescriptors {}",
                        genesis.import_descriptor()
                    ),
                ],
            },
        }
    }
}

impl NodeDeclaration {
    /// Render the minter: the base record without lnd, gated on importing the
    /// genesis key.
    #[must_use]
    pub fn from_minter(
        minter: &MinterNode,
        genesis: &GenesisMaterial,
        config: &FleetConfig,
    ) -> Self {
        let mut declaration = Self::from_node(minter.node(), genesis, config);
        declaration.strip_lightning();
        declaration.set_startup_probe(StartupProbe::import_genesis(genesis));
        declaration
    }
}
