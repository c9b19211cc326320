use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use fleet_framework_config::{fleet::SignerConfig, nodes::Permission, timeouts};
use tokio::{process::Command, time::timeout};
use tracing::{debug, warn};

use super::{CredentialIssuer, IssuanceError};

/// Timeout and retry budget for each signer invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignerPolicy {
    pub timeout: Duration,
    pub attempts: u32,
}

impl Default for SignerPolicy {
    fn default() -> Self {
        Self {
            timeout: timeouts::signer_timeout(),
            attempts: 1,
        }
    }
}

/// Bakes macaroons by shelling out to `lncli bakemacaroon` (or a compatible
/// program).
#[derive(Clone, Debug)]
pub struct LncliIssuer {
    program: String,
    args: Vec<String>,
    policy: SignerPolicy,
}

impl LncliIssuer {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            policy: SignerPolicy::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SignerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone()).with_policy(SignerPolicy {
            timeout: config.timeout(),
            attempts: config.attempts.max(1),
        })
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: SignerPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> SignerPolicy {
        self.policy
    }

    /// Command label used in logs and errors. Never includes the root key.
    fn label(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    fn build_command(&self, root_key_hex: &str, permissions: &[Permission]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(format!("--root_key={root_key_hex}"))
            .args(permissions.iter().map(ToString::to_string))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn bake_once(
        &self,
        root_key_hex: &str,
        permissions: &[Permission],
        command: &str,
    ) -> Result<String, IssuanceError> {
        let cmd = self.build_command(root_key_hex, permissions);
        let stdout = run_signer(cmd, command, self.policy.timeout).await?;
        parse_macaroon(command, &stdout)
    }
}

#[async_trait]
impl CredentialIssuer for LncliIssuer {
    async fn bake(
        &self,
        root_key_hex: &str,
        permissions: &[Permission],
    ) -> Result<String, IssuanceError> {
        let command = self.label();
        let attempts = self.policy.attempts.max(1);

        let mut last = None;
        for attempt in 1..=attempts {
            match self.bake_once(root_key_hex, permissions, &command).await {
                Ok(macaroon) => {
                    debug!(command, attempt, "signer baked macaroon");
                    return Ok(macaroon);
                }
                Err(err) => {
                    warn!(command, attempt, attempts, error = %err, "signer attempt failed");
                    last = Some(err);
                }
            }
        }

        match last {
            Some(err) if attempts == 1 => Err(err),
            Some(err) => Err(IssuanceError::Exhausted {
                attempts,
                last: Box::new(err),
            }),
            None => Err(IssuanceError::EmptyOutput { command }),
        }
    }
}

async fn run_signer(
    mut cmd: Command,
    command: &str,
    budget: Duration,
) -> Result<Vec<u8>, IssuanceError> {
    let output = match timeout(budget, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(IssuanceError::Spawn {
                command: command.to_owned(),
                source,
            });
        }
        Err(_) => {
            return Err(IssuanceError::Timeout {
                command: command.to_owned(),
                timeout: budget,
            });
        }
    };

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(IssuanceError::Failed {
            command: command.to_owned(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn parse_macaroon(command: &str, stdout: &[u8]) -> Result<String, IssuanceError> {
    let text = String::from_utf8_lossy(stdout);
    let macaroon = text.trim();
    if macaroon.is_empty() {
        return Err(IssuanceError::EmptyOutput {
            command: command.to_owned(),
        });
    }
    if macaroon.len() % 2 != 0 || !macaroon.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(IssuanceError::MalformedOutput {
            command: command.to_owned(),
            output: macaroon.to_owned(),
        });
    }
    Ok(macaroon.to_owned())
}
