mod builder;
mod stage;

pub use builder::{BuildError, FleetBuilder};
pub use stage::BuildStage;
