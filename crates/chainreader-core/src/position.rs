//! Position tracker: where the reader starts, where it is, and how far
//! back it may seek.

/// Owns the read cursor and the configured start position.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    start_at_block: i64,
    genesis_block: u64,
    /// Configured start resolved against the head, before clamping to the
    /// genesis block. Head-relative starts are resolved once.
    resolved_start: Option<u64>,
    /// Last emitted block number, or the seek target while a seek is pending.
    current: Option<u64>,
}

impl PositionTracker {
    pub fn new(start_at_block: i64, genesis_block: u64) -> Self {
        Self {
            start_at_block,
            genesis_block,
            resolved_start: None,
            current: None,
        }
    }

    /// Effective start for a given head, clamped to the genesis block.
    ///
    /// The first resolution sticks: a later call with a different head
    /// returns the same number.
    pub fn resolve_start_number(&mut self, head: u64) -> u64 {
        self.configured_start(head).max(self.genesis_block)
    }

    /// Whether computing the seek floor needs the current head.
    pub fn needs_head_for_floor(&self) -> bool {
        self.resolved_start.is_none() && self.start_at_block < 0
    }

    /// The lowest block a seek may target: the configured start, not the
    /// genesis-clamped one. With the default start of 0 a seek to block 0
    /// is allowed; whether the source serves it is the source's business.
    pub fn seek_floor(&mut self, head: u64) -> u64 {
        self.configured_start(head)
    }

    /// Target of the first read after construction or a seek.
    pub fn start_target(&mut self, head: u64) -> u64 {
        match self.current {
            Some(n) => n,
            None => self.resolve_start_number(head),
        }
    }

    /// Target of an ordinary forward step.
    pub fn advance(&self) -> Option<u64> {
        self.current.map(|n| n + 1)
    }

    /// Record the number of the block that was just emitted.
    pub fn set_current(&mut self, number: u64) {
        self.current = Some(number);
    }

    /// Position the cursor for a seek. The caller has checked the floor.
    pub fn seek(&mut self, number: u64) {
        self.current = Some(number);
    }

    fn configured_start(&mut self, head: u64) -> u64 {
        let start_at_block = self.start_at_block;
        *self.resolved_start.get_or_insert_with(|| {
            if start_at_block >= 0 {
                start_at_block as u64
            } else {
                head.saturating_sub(start_at_block.unsigned_abs())
            }
        })
    }
}
