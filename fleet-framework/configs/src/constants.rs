use std::path::PathBuf;

use fleet_framework_env as tf_env;

/// Chain every fleet node runs on.
pub const DEFAULT_CHAIN: &str = "signet";

/// Default bitcoind image tag for ordinary fleet nodes.
pub const DEFAULT_BITCOIN_IMAGE_TAG: &str = "29.0";

/// Default bitcoind image tag for the minter (ships `bitcoin-cli` tooling).
pub const DEFAULT_MINTER_IMAGE_TAG: &str = "29.0-util";

/// Default lnd image tag.
pub const DEFAULT_LND_IMAGE_TAG: &str = "v0.19.0-beta";

/// Name of the single block-producing node.
pub const MINTER_NAME: &str = "miner";

/// Prefix for ordinary fleet node names (`tank-0000`, `tank-0001`, ...).
pub const NODE_NAME_PREFIX: &str = "tank";

/// Suffix appended to a node name to address its lightning daemon.
pub const LN_ENDPOINT_SUFFIX: &str = "-ln";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 1000;

pub const DEFAULT_CHANNEL_CAPACITY: u64 = 300_000;

pub const DEFAULT_CHANNEL_PUSH_AMOUNT: u64 = 150_000;

/// First block height used for channel ids.
pub const DEFAULT_CHANNEL_FIRST_BLOCK: u64 = 500;

/// Channel ids roll to the next block after this many channels.
pub const DEFAULT_CHANNELS_PER_BLOCK: u32 = 200;

pub const DEFAULT_METRICS_PORT: u16 = 9332;

pub const DEFAULT_EXPORTER_IMAGE: &str = "bitdonkey/lnd-exporter:0.1.3";

pub const DEFAULT_SIGNER_PROGRAM: &str = "lncli";

pub const DEFAULT_SIGNER_SUBCOMMAND: &str = "bakemacaroon";

pub const DEFAULT_SIGNER_ATTEMPTS: u32 = 1;

/// Startup probe thresholds for the minter.
pub const MINTER_PROBE_FAILURE_THRESHOLD: u32 = 10;
pub const MINTER_PROBE_PERIOD_SECS: u32 = 30;
pub const MINTER_PROBE_SUCCESS_THRESHOLD: u32 = 1;
pub const MINTER_PROBE_TIMEOUT_SECS: u32 = 60;

pub const NETWORK_FILE_NAME: &str = "network.yaml";

pub const NODE_DEFAULTS_FILE_NAME: &str = "node-defaults.yaml";

pub const NODE_DEFAULTS_CONTENTS: &str = "comment: enjoy";

pub const DEFAULT_NETWORK_NAME: &str = "test";

pub const DEFAULT_NODE_COUNT: usize = 100;
pub const DEFAULT_CHANNEL_COUNT: usize = 500;

/// Default output root (relative to the working directory).
pub const DEFAULT_NETWORKS_DIR: &str = "networks";

/// Resolve the output root from `FLEET_NETWORKS_DIR`, falling back to the
/// default.
pub fn networks_dir() -> PathBuf {
    tf_env::fleet_networks_dir().unwrap_or_else(|| PathBuf::from(DEFAULT_NETWORKS_DIR))
}

/// Resolve the per-run network name from `FLEET_NETWORK_NAME`, falling back to
/// the default.
pub fn network_name() -> String {
    tf_env::fleet_network_name().unwrap_or_else(|| DEFAULT_NETWORK_NAME.to_owned())
}
