//! Per-node macaroon issuance.

use std::{io, time::Duration};

use async_trait::async_trait;
use fleet_framework_config::nodes::{Credential, Permission};
use rand::{RngCore as _, rngs::OsRng};
use thiserror::Error;

mod lncli;

pub use lncli::{LncliIssuer, SignerPolicy};

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("secure entropy source unavailable: {0}")]
    Entropy(String),
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with status {status:?}\nstderr:\n{stderr}")]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("{command} printed no macaroon")]
    EmptyOutput { command: String },
    #[error("{command} printed a non-hex macaroon: {output:?}")]
    MalformedOutput { command: String, output: String },
    #[error("signer failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<IssuanceError>,
    },
}

/// Something that can bake a macaroon for a root key.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Bake a macaroon bound to `root_key_hex` carrying `permissions`.
    async fn bake(
        &self,
        root_key_hex: &str,
        permissions: &[Permission],
    ) -> Result<String, IssuanceError>;
}

#[async_trait]
impl<T: CredentialIssuer + ?Sized> CredentialIssuer for Box<T> {
    async fn bake(
        &self,
        root_key_hex: &str,
        permissions: &[Permission],
    ) -> Result<String, IssuanceError> {
        (**self).bake(root_key_hex, permissions).await
    }
}

/// Draw a fresh root key and have `issuer` bake a macaroon for it.
pub async fn issue_credential<I: CredentialIssuer + ?Sized>(
    issuer: &I,
    permissions: &[Permission],
) -> Result<Credential, IssuanceError> {
    let mut root_key = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut root_key)
        .map_err(|err| IssuanceError::Entropy(err.to_string()))?;

    let macaroon = issuer.bake(&hex::encode(root_key), permissions).await?;
    Ok(Credential::new(&root_key, macaroon))
}
