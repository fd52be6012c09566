//! Reader configuration.

use serde::{Deserialize, Serialize};

use crate::error::ReaderError;

/// Configuration for a [`crate::BlockReader`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// First block to read. Negative values count back from the head at
    /// the time of the first read: `-1` with head 4 starts at block 3.
    pub start_at_block: i64,
    /// How many recently emitted blocks are kept for fork detection.
    /// A reorganization deeper than this is resolved best-effort only.
    pub max_history_length: usize,
    /// Lowest block number the source serves. Resolved starts are clamped
    /// to it; use 0 for chains whose first block is numbered 0.
    pub genesis_block: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            start_at_block: 0,
            max_history_length: 128,
            genesis_block: 1,
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<(), ReaderError> {
        if self.max_history_length == 0 {
            return Err(ReaderError::Config(
                "max_history_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
