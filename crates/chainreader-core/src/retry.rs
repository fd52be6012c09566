//! Exponential backoff retry around a chain source.
//!
//! The reader never retries on its own. Hosts that want transient source
//! failures absorbed wrap their source in a [`RetryingSource`] before
//! handing it to the reader.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::ReaderError;
use crate::source::ChainSource;
use crate::types::Block;

/// How often and how patiently [`RetryingSource`] retries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first failed call. Zero disables retrying.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub base_delay: Duration,
    /// Upper bound for the exponential part of the wait.
    pub max_delay: Duration,
    /// Growth of the wait from one retry to the next.
    pub factor: f64,
    /// Each wait is stretched by a random share of itself, up to this
    /// fraction, so readers sharing a node do not retry in lockstep.
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            factor: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

/// Backoff schedule derived from a [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Wait before retry number `attempt` (1-based) without jitter, or
    /// `None` once the retries are used up.
    pub fn base_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let grown = self.config.base_delay.as_secs_f64() * self.config.factor.powi(exponent);
        Some(Duration::from_secs_f64(
            grown.min(self.config.max_delay.as_secs_f64()),
        ))
    }

    /// [`base_delay`](Self::base_delay) plus up to `jitter_fraction` of it,
    /// drawn uniformly.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        let base = self.base_delay(attempt)?;
        let spread = base.as_secs_f64() * self.config.jitter_fraction;
        if spread <= 0.0 {
            return Some(base);
        }
        let extra = rand::thread_rng().gen_range(0.0..=spread);
        Some(base + Duration::from_secs_f64(extra))
    }
}

/// A [`ChainSource`] that retries retryable failures of the wrapped source.
///
/// Non-retryable errors such as [`ReaderError::BlockNotFound`] are returned
/// immediately.
#[derive(Debug)]
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ChainSource> RetryingSource<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self {
            inner,
            policy: RetryPolicy::new(config),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn sleep_or_give_up(&self, attempt: u32, op: &str, err: &ReaderError) -> bool {
        if !err.is_retryable() {
            return false;
        }
        match self.policy.next_delay(attempt) {
            Some(delay) => {
                tracing::debug!(attempt, ?delay, op, error = %err, "Retrying chain source call");
                tokio::time::sleep(delay).await;
                true
            }
            None => {
                tracing::warn!(attempts = attempt, op, error = %err, "Chain source retries exhausted");
                false
            }
        }
    }
}

#[async_trait]
impl<S: ChainSource> ChainSource for RetryingSource<S> {
    async fn get_head_block_number(&self) -> Result<u64, ReaderError> {
        let mut attempt = 0;
        loop {
            match self.inner.get_head_block_number().await {
                Ok(head) => return Ok(head),
                Err(err) => {
                    attempt += 1;
                    if !self.sleep_or_give_up(attempt, "get_head_block_number", &err).await {
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn get_block(&self, number: u64) -> Result<Block, ReaderError> {
        let mut attempt = 0;
        loop {
            match self.inner.get_block(number).await {
                Ok(block) => return Ok(block),
                Err(err) => {
                    attempt += 1;
                    if !self.sleep_or_give_up(attempt, "get_block", &err).await {
                        return Err(err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockInfo;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            factor: 2.0,
            jitter_fraction: 0.0,
        }
    }

    /// Fails the first `failures` calls of each kind with `error`.
    struct Stub {
        failures: u32,
        calls: AtomicU32,
        not_found: bool,
    }

    #[async_trait]
    impl ChainSource for Stub {
        async fn get_head_block_number(&self) -> Result<u64, ReaderError> {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            if call < self.failures {
                return Err(ReaderError::SourceUnavailable("connection refused".into()));
            }
            Ok(4)
        }

        async fn get_block(&self, number: u64) -> Result<Block, ReaderError> {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            if self.not_found {
                return Err(ReaderError::BlockNotFound { number });
            }
            if call < self.failures {
                return Err(ReaderError::SourceUnavailable("timeout".into()));
            }
            Ok(Block::new(
                BlockInfo::new(number, "0xa", "0x0"),
                serde_json::Value::Null,
            ))
        }
    }

    fn stub(failures: u32, not_found: bool) -> Stub {
        Stub {
            failures,
            calls: AtomicU32::new(0),
            not_found,
        }
    }

    #[test]
    fn first_retry_delay() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            jitter_fraction: 0.0,
        });
        assert_eq!(policy.next_delay(1).unwrap().as_millis(), 100);
        assert_eq!(policy.next_delay(2).unwrap().as_millis(), 200);
        assert_eq!(policy.next_delay(3).unwrap().as_millis(), 400);
        assert!(policy.next_delay(4).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            factor: 10.0,
            jitter_fraction: 0.0,
        });
        let d5 = policy.next_delay(5).unwrap();
        assert!(d5 <= Duration::from_millis(500), "d5={d5:?} exceeds max");
    }

    #[test]
    fn jitter_stays_within_fraction() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(1),
            factor: 2.0,
            jitter_fraction: 0.5,
        });
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let delay = policy.next_delay(2).unwrap();
            assert!(delay >= Duration::from_millis(400), "{delay:?} below base");
            assert!(delay <= Duration::from_millis(600), "{delay:?} above jitter bound");
            seen.insert(delay);
        }
        assert!(seen.len() > 1, "jitter produced a fixed delay");
        assert!(policy.next_delay(3).is_none());
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let source = RetryingSource::new(stub(2, false), fast(3));
        assert_eq!(source.get_head_block_number().await.unwrap(), 4);
        assert_eq!(source.inner().calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let source = RetryingSource::new(stub(10, false), fast(2));
        let err = source.get_block(1).await.unwrap_err();
        assert!(matches!(err, ReaderError::SourceUnavailable(_)));
        assert_eq!(source.inner().calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let source = RetryingSource::new(stub(0, true), fast(5));
        let err = source.get_block(9).await.unwrap_err();
        assert!(matches!(err, ReaderError::BlockNotFound { number: 9 }));
        assert_eq!(source.inner().calls.load(Ordering::Relaxed), 1);
    }
}
