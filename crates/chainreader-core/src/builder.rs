//! Fluent builder API for creating block readers.
//!
//! # Example
//!
//! ```rust,no_run
//! use chainreader_core::{MemorySource, ReaderBuilder};
//!
//! let reader = ReaderBuilder::new()
//!     .start_at_block(-12)
//!     .max_history_length(256)
//!     .build(MemorySource::default())
//!     .expect("valid config");
//! ```

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::reader::BlockReader;
use crate::source::ChainSource;

/// Fluent builder for [`ReaderConfig`] and [`BlockReader`].
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    config: ReaderConfig,
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Start from an existing config.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the start block. Negative values are relative to the head.
    pub fn start_at_block(mut self, block: i64) -> Self {
        self.config.start_at_block = block;
        self
    }

    /// Set how many emitted blocks are kept for fork detection.
    pub fn max_history_length(mut self, len: usize) -> Self {
        self.config.max_history_length = len;
        self
    }

    /// Set the lowest block number the source serves.
    pub fn genesis_block(mut self, block: u64) -> Self {
        self.config.genesis_block = block;
        self
    }

    /// Build the `ReaderConfig`.
    pub fn build_config(self) -> ReaderConfig {
        self.config
    }

    /// Validate the config and build a reader over `source`.
    pub fn build<S: ChainSource>(self, source: S) -> Result<BlockReader<S>, ReaderError> {
        BlockReader::new(source, self.config)
    }
}
