pub mod channel;
pub mod credential;
pub mod node;

pub use channel::{ChannelId, ChannelSequence, ChannelSpec};
pub use credential::{ADMIN_PERMISSIONS, Credential, Permission};
pub use node::{FleetNode, MinterNode, NodeError, ln_endpoint, node_name};
