//! Shared building blocks for the Prime Hub functions: logging setup,
//! Prometheus counters and small response types.

pub mod metrics;
pub mod types;
pub mod utils;
