//! Bounded history of emitted blocks, used for parent-hash continuity
//! checks and fork resolution.

use std::collections::VecDeque;

use crate::types::BlockInfo;

/// Ring buffer of the last N emitted block identities (oldest first).
///
/// When full, pushing evicts the oldest entry. Entries are contiguous and
/// hash-linked except while a rollback is being resolved.
#[derive(Debug, Clone)]
pub struct BlockHistory {
    window: VecDeque<BlockInfo>,
    capacity: usize,
}

impl BlockHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a block, evicting the oldest entry when at capacity.
    pub fn push(&mut self, block: BlockInfo) {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(block);
    }

    /// Most recently emitted block.
    pub fn tail(&self) -> Option<&BlockInfo> {
        self.window.back()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry numbered `block_number` or above.
    /// Returns how many entries were dropped.
    pub fn discard_from(&mut self, block_number: u64) -> usize {
        let mut dropped = 0;
        while let Some(back) = self.window.back() {
            if back.number >= block_number {
                self.window.pop_back();
                dropped += 1;
            } else {
                break;
            }
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
