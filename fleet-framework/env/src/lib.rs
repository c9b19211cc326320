use std::{env, path::PathBuf};

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

#[must_use]
pub fn fleet_networks_dir() -> Option<PathBuf> {
    env::var("FLEET_NETWORKS_DIR").ok().map(PathBuf::from)
}

#[must_use]
pub fn fleet_network_name() -> Option<String> {
    env::var("FLEET_NETWORK_NAME").ok()
}

#[must_use]
pub fn fleet_signer_bin() -> Option<String> {
    env::var("FLEET_SIGNER_BIN").ok()
}

#[must_use]
pub fn fleet_signer_timeout_secs() -> Option<u64> {
    env::var("FLEET_SIGNER_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

#[must_use]
pub fn fleet_signer_attempts() -> Option<u32> {
    env::var("FLEET_SIGNER_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
}
