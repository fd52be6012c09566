//! In-memory chain source.
//!
//! Holds a whole chain in RAM. Useful for tests, replays of captured
//! data, and hosts that build the chain themselves.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ReaderError;
use crate::source::ChainSource;
use crate::types::Block;

/// A chain kept in memory, ordered by block number.
///
/// `replace_chain` swaps the whole chain at once, which is how tests
/// simulate a fork.
#[derive(Debug, Default)]
pub struct MemorySource {
    blocks: RwLock<Vec<Block>>,
}

impl MemorySource {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: RwLock::new(sorted(blocks)),
        }
    }

    /// Append a block on top of the current chain.
    pub async fn push(&self, block: Block) {
        let mut blocks = self.blocks.write().await;
        blocks.retain(|b| b.number() != block.number());
        blocks.push(block);
        blocks.sort_by_key(Block::number);
    }

    /// Replace the entire chain.
    pub async fn replace_chain(&self, blocks: Vec<Block>) {
        *self.blocks.write().await = sorted(blocks);
    }

    /// Number of blocks held.
    pub async fn len(&self) -> usize {
        self.blocks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blocks.read().await.is_empty()
    }
}

fn sorted(mut blocks: Vec<Block>) -> Vec<Block> {
    blocks.sort_by_key(Block::number);
    blocks
}

#[async_trait]
impl ChainSource for MemorySource {
    async fn get_head_block_number(&self) -> Result<u64, ReaderError> {
        self.blocks
            .read()
            .await
            .last()
            .map(Block::number)
            .ok_or_else(|| ReaderError::SourceUnavailable("memory chain is empty".into()))
    }

    async fn get_block(&self, number: u64) -> Result<Block, ReaderError> {
        let blocks = self.blocks.read().await;
        blocks
            .binary_search_by_key(&number, Block::number)
            .map(|idx| blocks[idx].clone())
            .map_err(|_| ReaderError::BlockNotFound { number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockInfo;

    fn b(number: u64, hash: &str, prev: &str) -> Block {
        Block::new(BlockInfo::new(number, hash, prev), serde_json::Value::Null)
    }

    #[tokio::test]
    async fn head_and_lookup() {
        let source = MemorySource::new(vec![b(2, "0x2", "0x1"), b(1, "0x1", "0x0")]);
        assert_eq!(source.get_head_block_number().await.unwrap(), 2);
        assert_eq!(source.get_block(1).await.unwrap().hash(), "0x1");
        assert!(matches!(
            source.get_block(3).await,
            Err(ReaderError::BlockNotFound { number: 3 })
        ));
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let source = MemorySource::default();
        assert!(source.is_empty().await);
        let err = source.get_head_block_number().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn push_overwrites_same_number() {
        let source = MemorySource::new(vec![b(1, "0x1", "0x0"), b(2, "0x2", "0x1")]);
        source.push(b(2, "0x2b", "0x1")).await;
        source.push(b(3, "0x3", "0x2b")).await;
        assert_eq!(source.len().await, 3);
        assert_eq!(source.get_block(2).await.unwrap().hash(), "0x2b");
        assert_eq!(source.get_head_block_number().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn replace_chain_swaps_everything() {
        let source = MemorySource::new(vec![b(1, "0x1", "0x0")]);
        source
            .replace_chain(vec![b(1, "0x1", "0x0"), b(2, "foo", "0x1")])
            .await;
        assert_eq!(source.get_block(2).await.unwrap().hash(), "foo");
    }
}
