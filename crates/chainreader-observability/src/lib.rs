//! # chainreader-observability
//!
//! Structured logging setup for hosts embedding a ChainReader.
//!
//! The reader crates only emit `tracing` events; this crate installs the
//! subscriber. Log levels are configurable per component, and output is
//! either human-readable text or JSON for ELK, Loki, or CloudWatch.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, try_init_tracing, LogConfig};
