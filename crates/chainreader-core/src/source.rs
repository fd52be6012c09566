//! The chain source trait: the reader's only window onto a ledger.
//!
//! Implement [`ChainSource`] once per chain (JSON-RPC node, archive file,
//! test fixture, ...). The reader never branches on which chain it reads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ReaderError;
use crate::types::Block;

/// Fetches head position and blocks from a hash-linked ledger.
///
/// Both calls may suspend on I/O. A fork may change what `get_block`
/// returns for a number that was fetched before.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Highest block number on the source's current view of the chain.
    ///
    /// Fails with [`ReaderError::SourceUnavailable`] if the source cannot answer.
    async fn get_head_block_number(&self) -> Result<u64, ReaderError>;

    /// The block currently at `number`.
    ///
    /// Fails with [`ReaderError::BlockNotFound`] when `number` is outside the
    /// retained range.
    async fn get_block(&self, number: u64) -> Result<Block, ReaderError>;
}

#[async_trait]
impl<S: ChainSource + ?Sized> ChainSource for Arc<S> {
    async fn get_head_block_number(&self) -> Result<u64, ReaderError> {
        (**self).get_head_block_number().await
    }

    async fn get_block(&self, number: u64) -> Result<Block, ReaderError> {
        (**self).get_block(number).await
    }
}
