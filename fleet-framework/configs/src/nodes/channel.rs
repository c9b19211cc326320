use serde::Serialize;

/// Short-channel-id style identifier: channels are numbered within a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChannelId {
    pub block: u64,
    pub index: u32,
}

impl ChannelId {
    #[must_use]
    pub const fn new(block: u64, index: u32) -> Self {
        Self { block, index }
    }

    /// Next id in generation order: bump `index`, rolling to the next block
    /// once `per_block` channels share one.
    #[must_use]
    pub const fn successor(self, per_block: u32) -> Self {
        if self.index >= per_block {
            Self::new(self.block + 1, 1)
        } else {
            Self::new(self.block, self.index + 1)
        }
    }
}

/// Hands out strictly increasing channel ids for one generation run.
#[derive(Clone, Debug)]
pub struct ChannelSequence {
    next: ChannelId,
    per_block: u32,
}

impl ChannelSequence {
    #[must_use]
    pub const fn new(first_block: u64, per_block: u32) -> Self {
        Self {
            next: ChannelId::new(first_block, 1),
            per_block,
        }
    }

    pub fn allocate(&mut self) -> ChannelId {
        let id = self.next;
        self.next = id.successor(self.per_block);
        id
    }

    #[must_use]
    pub const fn peek(&self) -> ChannelId {
        self.next
    }
}

/// A channel the owning node opens towards `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    pub id: ChannelId,
    pub target: String,
    pub capacity: u64,
    #[serde(rename = "push_amt")]
    pub push_amount: u64,
}
