//! chainreader-core: fork-aware, chain-agnostic block reader.
//!
//! # Architecture
//!
//! ```text
//! BlockReader (next_block / seek_to_block)
//!     ├── PositionTracker  (start resolution, cursor, seek floor)
//!     ├── ForkResolver     (parent-hash checks, rollback walk)
//!     │     └── BlockHistory (bounded window of emitted blocks)
//!     └── ChainSource      (head + block-by-number, one impl per chain)
//!           ├── MemorySource
//!           └── RetryingSource<S>
//! ```
//!
//! Each `next_block` call emits one block with [`BlockMeta`] flags telling
//! the consumer whether it is the first block, a rollback, or a repeat of
//! the last one because the reader has caught up with the head.

pub mod builder;
pub mod config;
pub mod cursor;
pub mod error;
pub mod fork;
pub mod history;
pub mod memory;
pub mod position;
pub mod reader;
pub mod retry;
pub mod source;
pub mod types;

pub use builder::ReaderBuilder;
pub use config::ReaderConfig;
pub use cursor::Cursor;
pub use error::ReaderError;
pub use fork::{Continuity, ForkResolver, RewindStep};
pub use history::BlockHistory;
pub use memory::MemorySource;
pub use position::PositionTracker;
pub use reader::{BlockReader, ReadPhase};
pub use retry::{RetryConfig, RetryPolicy, RetryingSource};
pub use source::ChainSource;
pub use types::{Block, BlockInfo, BlockMeta};
