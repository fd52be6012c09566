//! The block reader: one step of fetch, resolve, and emit per call.
//!
//! # Phases
//! - `Seeking`: the next read is the configured start or a seek target.
//!   History is empty, so the first block is accepted unconditionally.
//! - `Streaming`: each step reads `current + 1` and checks it against the
//!   tail of history.
//! - `Rewinding`: a fork was detected and the reader is walking backward to
//!   the common ancestor. The walk lives in the phase itself, so a source
//!   error mid-walk is resumed by the next call instead of being restarted.

use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::cursor::Cursor;
use crate::error::ReaderError;
use crate::fork::{Continuity, ForkResolver, RewindStep};
use crate::position::PositionTracker;
use crate::source::ChainSource;
use crate::types::{Block, BlockMeta};

/// Where the reader is in its read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPhase {
    Seeking,
    Streaming,
    Rewinding {
        /// Next block number to re-fetch.
        number: u64,
        /// Block number at which the fork was noticed.
        detected_at: u64,
    },
}

/// Pulls blocks in order from a [`ChainSource`], unwinding forks as it goes.
///
/// Calls take `&mut self`: a reader is a single cursor and is driven by one
/// polling loop. Independent readers over the same source share nothing.
pub struct BlockReader<S> {
    source: S,
    config: ReaderConfig,
    position: PositionTracker,
    resolver: ForkResolver,
    phase: ReadPhase,
    /// Last emission, replayed when the reader is ahead of the head.
    last: Option<(Block, BlockMeta)>,
    first_block_armed: bool,
}

impl<S: ChainSource> BlockReader<S> {
    pub fn new(source: S, config: ReaderConfig) -> Result<Self, ReaderError> {
        config.validate()?;
        Ok(Self {
            position: PositionTracker::new(config.start_at_block, config.genesis_block),
            resolver: ForkResolver::new(config.max_history_length),
            phase: ReadPhase::Seeking,
            last: None,
            first_block_armed: true,
            source,
            config,
        })
    }

    /// Current head of the source. Does not move the reader.
    pub async fn get_head_block_number(&self) -> Result<u64, ReaderError> {
        self.source.get_head_block_number().await
    }

    /// Read the next block.
    ///
    /// When the reader has caught up with the head, the previous emission is
    /// returned again with `is_new_block = false`. Source errors propagate
    /// unchanged and leave the cursor where it was, so calling again retries
    /// the same block.
    pub async fn next_block(&mut self) -> Result<(Block, BlockMeta), ReaderError> {
        let head = self.source.get_head_block_number().await?;

        if let ReadPhase::Rewinding {
            mut number,
            detected_at,
        } = self.phase
        {
            if number > head {
                let dropped = self.resolver.truncate_above(head);
                warn!(head, number, dropped, "Source head moved behind an unfinished rollback");
                number = head;
                self.phase = ReadPhase::Rewinding {
                    number,
                    detected_at,
                };
            }
            return self.rewind(number, detected_at).await;
        }

        let target = match (self.phase, self.position.advance()) {
            (ReadPhase::Streaming, Some(next)) => {
                let current = next - 1;
                if head < current {
                    let dropped = self.resolver.truncate_above(head);
                    warn!(head, current, dropped, "Source head moved behind the reader");
                    self.phase = ReadPhase::Rewinding {
                        number: head,
                        detected_at: current,
                    };
                    return self.rewind(head, current).await;
                }
                next
            }
            _ => self.position.start_target(head),
        };

        if target > head {
            return self.replay_last(target, head);
        }

        let block = self.source.get_block(target).await?;
        match self.resolver.check(&block.info) {
            Continuity::Unanchored | Continuity::Extends => Ok(self.emit(block, false)),
            Continuity::Fork => {
                let tail = self
                    .resolver
                    .history()
                    .tail()
                    .map_or(target.saturating_sub(1), |t| t.number);
                warn!(
                    at = target,
                    hash = %block.info.hash,
                    previous_hash = %block.info.previous_hash,
                    "Fork detected"
                );
                self.phase = ReadPhase::Rewinding {
                    number: tail,
                    detected_at: target,
                };
                self.rewind(tail, target).await
            }
        }
    }

    /// Move the cursor so the next read returns block `number`.
    ///
    /// Fails with [`ReaderError::OutOfRange`] below the configured
    /// `start_at_block` (resolved against the head when negative, but not
    /// clamped to `genesis_block`), leaving the reader untouched.
    pub async fn seek_to_block(&mut self, number: u64) -> Result<(), ReaderError> {
        let head = if self.position.needs_head_for_floor() {
            self.source.get_head_block_number().await?
        } else {
            0
        };
        let floor = self.position.seek_floor(head);
        if number < floor {
            return Err(ReaderError::OutOfRange {
                requested: number,
                floor,
            });
        }

        self.resolver.clear();
        self.position.seek(number);
        self.phase = ReadPhase::Seeking;
        self.last = None;
        self.first_block_armed = true;
        info!(block = number, "Seeked");
        Ok(())
    }

    /// Position of the last emitted block, for hosts that persist it.
    pub fn cursor(&self) -> Option<Cursor> {
        self.last
            .as_ref()
            .map(|(block, _)| Cursor::new(block.number(), block.hash()))
    }

    pub fn phase(&self) -> ReadPhase {
        self.phase
    }

    pub fn is_rewinding(&self) -> bool {
        matches!(self.phase, ReadPhase::Rewinding { .. })
    }

    /// Number of blocks currently retained for fork detection.
    pub fn history_len(&self) -> usize {
        self.resolver.history().len()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Walk backward from `number` until a re-fetched block links onto the
    /// retained history, then emit it as the rollback root.
    async fn rewind(
        &mut self,
        mut number: u64,
        detected_at: u64,
    ) -> Result<(Block, BlockMeta), ReaderError> {
        loop {
            let block = self.source.get_block(number).await?;
            match self.resolver.rewind_step(&block.info) {
                RewindStep::Resolved => {
                    info!(
                        root = number,
                        depth = detected_at.saturating_sub(number),
                        hash = %block.info.hash,
                        "Fork resolved"
                    );
                    return Ok(self.emit(block, true));
                }
                RewindStep::Exhausted => {
                    warn!(
                        root = number,
                        detected_at,
                        window = self.resolver.history().capacity(),
                        "History exhausted before finding a common ancestor; rolling back to deepest retained block"
                    );
                    return Ok(self.emit(block, true));
                }
                RewindStep::Continue(next) => {
                    debug!(mismatch = number, next, "Still diverged, rewinding");
                    number = next;
                    self.phase = ReadPhase::Rewinding {
                        number,
                        detected_at,
                    };
                }
            }
        }
    }

    fn replay_last(&self, target: u64, head: u64) -> Result<(Block, BlockMeta), ReaderError> {
        match &self.last {
            Some((block, meta)) => {
                debug!(block = block.number(), head, "No new block yet");
                let meta = BlockMeta {
                    is_new_block: false,
                    ..*meta
                };
                Ok((block.clone(), meta))
            }
            None => Err(ReaderError::BeyondHead { target, head }),
        }
    }

    fn emit(&mut self, block: Block, is_rollback: bool) -> (Block, BlockMeta) {
        let meta = BlockMeta {
            is_first_block: std::mem::take(&mut self.first_block_armed),
            is_rollback,
            is_new_block: true,
        };
        debug!(
            block = block.number(),
            hash = %block.info.hash,
            rollback = is_rollback,
            first = meta.is_first_block,
            "Emitting block"
        );
        self.resolver.accept(block.info.clone());
        self.position.set_current(block.number());
        self.phase = ReadPhase::Streaming;
        self.last = Some((block.clone(), meta));
        (block, meta)
    }
}
