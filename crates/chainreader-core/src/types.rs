//! Block and emission types shared across the reader.

use serde::{Deserialize, Serialize};

// ─── BlockInfo ───────────────────────────────────────────────────────────────

/// The identity of a block: enough to check hash-chain continuity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: String,
    /// Hash of the immediate predecessor.
    pub previous_hash: String,
    /// Unix timestamp of the block (seconds since epoch).
    #[serde(default)]
    pub timestamp: i64,
}

impl BlockInfo {
    pub fn new(number: u64, hash: impl Into<String>, previous_hash: impl Into<String>) -> Self {
        Self {
            number,
            hash: hash.into(),
            previous_hash: previous_hash.into(),
            timestamp: 0,
        }
    }

    /// Returns `true` if `parent` is the direct parent of `self`.
    pub fn extends(&self, parent: &BlockInfo) -> bool {
        self.number == parent.number + 1 && self.previous_hash == parent.hash
    }

    /// Same number and same hash. Payloads are never compared.
    pub fn same_block(&self, other: &BlockInfo) -> bool {
        self.number == other.number && self.hash == other.hash
    }
}

// ─── Block ───────────────────────────────────────────────────────────────────

/// A fetched block: header identity plus an opaque, chain-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub info: BlockInfo,
    /// Chain-native contents. The reader never looks inside.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Block {
    pub fn new(info: BlockInfo, payload: serde_json::Value) -> Self {
        Self { info, payload }
    }

    pub fn number(&self) -> u64 {
        self.info.number
    }

    pub fn hash(&self) -> &str {
        &self.info.hash
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.info.same_block(&other.info)
    }
}

impl Eq for Block {}

// ─── BlockMeta ───────────────────────────────────────────────────────────────

/// Flags computed for a single emission of [`crate::BlockReader::next_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockMeta {
    /// First emission since construction or the last successful seek.
    pub is_first_block: bool,
    /// This emission replaces history instead of extending it.
    pub is_rollback: bool,
    /// `false` when this is a repeat of the previous emission (caught up to head).
    pub is_new_block: bool,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
