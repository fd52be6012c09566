//! Error types for the block reader.

use thiserror::Error;

/// Errors that can occur while reading blocks.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A seek targeted a block below the configured start bound.
    #[error("Cannot seek to block before configured startAtBlock.")]
    OutOfRange { requested: u64, floor: u64 },

    /// The chain source could not answer (connection refused, timeout, ...).
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The requested block is outside the source's retained range.
    #[error("Block {number} not found")]
    BlockNotFound { number: u64 },

    /// Nothing has been emitted yet and the next target is past the head.
    #[error("Block {target} is beyond the source head {head}")]
    BeyondHead { target: u64, head: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ReaderError {
    /// Returns `true` if polling again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_) | Self::BeyondHead { .. })
    }

    /// Returns `true` if this is a rejected seek.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = ReaderError::OutOfRange {
            requested: 2,
            floor: 3,
        };
        assert_eq!(
            err.to_string(),
            "Cannot seek to block before configured startAtBlock."
        );
        assert!(err.is_out_of_range());
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_classification() {
        assert!(ReaderError::SourceUnavailable("timeout".into()).is_retryable());
        assert!(ReaderError::BeyondHead { target: 5, head: 4 }.is_retryable());
        assert!(!ReaderError::BlockNotFound { number: 9 }.is_retryable());
        assert!(!ReaderError::Config("bad".into()).is_retryable());
    }
}
