//! Signet genesis material shared by every node in a fleet.

use bitcoin::{
    CompressedPublicKey, Network, PrivateKey, ScriptBuf,
    secp256k1::{Secp256k1, SecretKey},
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;
use tracing::debug;

pub mod descriptor;

use descriptor::{DescriptorError, escape_for_shell, import_request_json, with_checksum};

/// Redraws allowed when entropy lands outside the secp256k1 scalar range.
const MAX_KEY_DRAWS: usize = 8;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("secure entropy source unavailable: {0}")]
    Entropy(String),
    #[error("no valid secp256k1 scalar after {attempts} draws")]
    InvalidKey { attempts: usize },
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Challenge script plus the matching wallet import for the minter.
///
/// Both halves come from one private key that is dropped once derivation
/// returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisMaterial {
    challenge_script: ScriptBuf,
    import_descriptor: String,
}

impl GenesisMaterial {
    #[must_use]
    /// P2WPKH script every node uses as `signetchallenge`.
    pub fn challenge_script(&self) -> &ScriptBuf {
        &self.challenge_script
    }

    #[must_use]
    /// Lowercase hex of the challenge script, as bitcoind expects it.
    pub fn challenge_hex(&self) -> String {
        hex::encode(self.challenge_script.as_bytes())
    }

    #[must_use]
    /// Shell-escaped `importdescriptors` request for the minter's probe.
    pub fn import_descriptor(&self) -> &str {
        &self.import_descriptor
    }
}

/// Derive fresh genesis material from the operating system's entropy source.
pub fn derive_genesis() -> Result<GenesisMaterial, GenesisError> {
    derive_genesis_with(&mut OsRng)
}

/// Derive genesis material from the provided entropy source.
pub fn derive_genesis_with<R: RngCore + ?Sized>(
    rng: &mut R,
) -> Result<GenesisMaterial, GenesisError> {
    for _ in 0..MAX_KEY_DRAWS {
        let mut entropy = [0u8; 32];
        rng.try_fill_bytes(&mut entropy)
            .map_err(|err| GenesisError::Entropy(err.to_string()))?;
        if let Ok(secret) = SecretKey::from_slice(&entropy) {
            return material_from_secret(secret);
        }
    }
    Err(GenesisError::InvalidKey {
        attempts: MAX_KEY_DRAWS,
    })
}

fn material_from_secret(secret: SecretKey) -> Result<GenesisMaterial, GenesisError> {
    let secp = Secp256k1::signing_only();
    let pubkey = CompressedPublicKey(secret.public_key(&secp));
    let challenge_script = ScriptBuf::new_p2wpkh(&pubkey.wpubkey_hash());

    let wif = PrivateKey::new(secret, Network::Signet).to_wif();
    let desc = with_checksum(&format!("combo({wif})"))?;
    let import_descriptor = escape_for_shell(&import_request_json(&desc)?);

    debug!(
        challenge = %hex::encode(challenge_script.as_bytes()),
        "derived signet genesis material"
    );

    Ok(GenesisMaterial {
        challenge_script,
        import_descriptor,
    })
}
