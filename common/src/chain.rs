use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a chain within a chainweb version's fixed chain graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u32);

impl ChainId {
    pub const fn new(id: u32) -> Self {
        ChainId(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChainId {
    fn from(value: u32) -> Self {
        ChainId(value)
    }
}

/// Monotone, non-negative block height on a single chain.
pub type BlockHeight = u64;
