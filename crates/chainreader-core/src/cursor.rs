//! Reader cursor: a serializable snapshot of the last emitted block.
//!
//! The reader keeps its position in memory only. Hosts that want to resume
//! after a restart persist the cursor themselves and seek to
//! [`Cursor::next_block`] on startup.

use serde::{Deserialize, Serialize};

/// The last block a reader emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub block_number: u64,
    pub block_hash: String,
}

impl Cursor {
    pub fn new(block_number: u64, block_hash: impl Into<String>) -> Self {
        Self {
            block_number,
            block_hash: block_hash.into(),
        }
    }

    /// Returns the block to resume from (cursor + 1).
    pub fn next_block(&self) -> u64 {
        self.block_number + 1
    }
}
