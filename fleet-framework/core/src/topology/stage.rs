use std::fmt;

/// Where a `FleetBuilder` is in its fixed sequence of operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Uninitialized,
    GenesisReady,
    NodesReady,
    ChannelsReady,
    MinterAttached,
    Written,
}

impl BuildStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::GenesisReady => "genesis-ready",
            Self::NodesReady => "nodes-ready",
            Self::ChannelsReady => "channels-ready",
            Self::MinterAttached => "minter-attached",
            Self::Written => "written",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
