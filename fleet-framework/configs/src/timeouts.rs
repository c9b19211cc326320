use std::time::Duration;

use fleet_framework_env as tf_env;

pub const SIGNER_TIMEOUT_SECS: u64 = 30;

/// Per-invocation budget for the credential signer, honoring
/// `FLEET_SIGNER_TIMEOUT_SECS`.
pub fn signer_timeout() -> Duration {
    let secs = tf_env::fleet_signer_timeout_secs().unwrap_or(SIGNER_TIMEOUT_SECS);
    crate::adjust_timeout(Duration::from_secs(secs))
}
