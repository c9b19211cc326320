use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// One `entity:action` macaroon permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Permission {
    pub entity: &'static str,
    pub action: &'static str,
}

impl Permission {
    const fn new(entity: &'static str, action: &'static str) -> Self {
        Self { entity, action }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity, self.action)
    }
}

/// Permission set baked into every node's admin macaroon, in signer order.
pub const ADMIN_PERMISSIONS: [Permission; 19] = [
    Permission::new("address", "read"),
    Permission::new("address", "write"),
    Permission::new("info", "read"),
    Permission::new("info", "write"),
    Permission::new("invoices", "read"),
    Permission::new("invoices", "write"),
    Permission::new("macaroon", "generate"),
    Permission::new("macaroon", "read"),
    Permission::new("macaroon", "write"),
    Permission::new("message", "read"),
    Permission::new("message", "write"),
    Permission::new("offchain", "read"),
    Permission::new("offchain", "write"),
    Permission::new("onchain", "read"),
    Permission::new("onchain", "write"),
    Permission::new("peers", "read"),
    Permission::new("peers", "write"),
    Permission::new("signer", "generate"),
    Permission::new("signer", "read"),
];

/// Root key and the macaroon baked from it. Immutable once issued.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    root_key_base64: String,
    admin_macaroon: String,
}

impl Credential {
    #[must_use]
    pub fn new(root_key: &[u8; 32], admin_macaroon: String) -> Self {
        Self {
            root_key_base64: STANDARD.encode(root_key),
            admin_macaroon,
        }
    }

    #[must_use]
    pub fn root_key_base64(&self) -> &str {
        &self.root_key_base64
    }

    #[must_use]
    pub fn admin_macaroon(&self) -> &str {
        &self.admin_macaroon
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("root_key_base64", &"<redacted>")
            .field("admin_macaroon", &"<redacted>")
            .finish()
    }
}
