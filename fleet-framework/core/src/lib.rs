pub mod assets;
pub mod credentials;
pub mod descriptor;
pub mod topology;

pub use assets::{AssetsError, FleetArtifacts, write_fleet};
pub use credentials::{CredentialIssuer, IssuanceError, LncliIssuer, SignerPolicy};
pub use descriptor::FleetDescriptor;
pub use topology::{BuildError, BuildStage, FleetBuilder};
