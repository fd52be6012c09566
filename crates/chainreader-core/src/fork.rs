//! Fork detection and rollback resolution.
//!
//! Every fetched block is checked against the tail of the emitted history.
//! A parent-hash mismatch means the source now reports a different chain.
//! The reader then walks backward one block at a time: it re-fetches the
//! block at the rewind cursor, drops the stale history entries at or above
//! it, and checks whether the re-fetched block links onto what remains.
//! The first block that links is the rollback root. It is emitted with
//! `is_rollback = true`, and ordinary forward reading resumes after it.
//!
//! The walk is bounded by the history window. If history runs out first,
//! the deepest re-fetched block becomes the root; a reorganization deeper
//! than the window is only resolved best-effort.

use crate::history::BlockHistory;
use crate::types::BlockInfo;

/// How a freshly fetched block relates to the emitted history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// No history yet (first block since start or seek); accepted as is.
    Unanchored,
    /// Parent hash matches the tail of history.
    Extends,
    /// Parent hash does not match: the chain forked.
    Fork,
}

/// Result of one backward step during fork resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewindStep {
    /// The re-fetched block links onto the retained history.
    Resolved,
    /// History ran out before a common ancestor was found.
    Exhausted,
    /// Still diverged; re-fetch this block number next.
    Continue(u64),
}

/// Decides whether fetched blocks extend history, and unwinds it on forks.
#[derive(Debug, Clone)]
pub struct ForkResolver {
    history: BlockHistory,
}

impl ForkResolver {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            history: BlockHistory::new(max_history_length),
        }
    }

    pub fn check(&self, block: &BlockInfo) -> Continuity {
        match self.history.tail() {
            None => Continuity::Unanchored,
            Some(tail) if block.extends(tail) => Continuity::Extends,
            Some(_) => Continuity::Fork,
        }
    }

    /// Record an emitted block.
    pub fn accept(&mut self, block: BlockInfo) {
        self.history.push(block);
    }

    /// One backward step of the walk, given the block re-fetched at the
    /// rewind cursor. Stale entries at or above its number are discarded.
    pub fn rewind_step(&mut self, refetched: &BlockInfo) -> RewindStep {
        self.history.discard_from(refetched.number);
        match self.history.tail() {
            None => RewindStep::Exhausted,
            Some(tail) if refetched.previous_hash == tail.hash => RewindStep::Resolved,
            Some(tail) => RewindStep::Continue(tail.number),
        }
    }

    /// Drop history above `block_number` (the source's head went backwards).
    pub fn truncate_above(&mut self, block_number: u64) -> usize {
        self.history.discard_from(block_number + 1)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &BlockHistory {
        &self.history
    }
}
