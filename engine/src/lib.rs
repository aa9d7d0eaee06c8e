//! Bounded-concurrency execution engine for fanout.
//!
//! Two layers, built bottom-up:
//!
//! - [`BoundedExecutor`]: admits queued operations FIFO with at most `max_concurrent`
//!   in flight, and captures every outcome (value, error or panic) without propagating it.
//! - [`run_parallel`]: the run coordinator. Applies the skip predicate and the
//!   `only_first_n` cutoff, drives the executor once, classifies completed operations
//!   with the caller's success predicate and returns a [`RunReport`].
//!
//! ```text
//! items ──► cutoff / skip ──► BoundedExecutor ──► classify ──► RunReport
//!                 │                                               ▲
//!                 └──────────────── skipped records ──────────────┘
//! ```

mod coordinator;
mod executor;
mod skip;

pub use coordinator::{RunOptions, run_parallel};
pub use executor::BoundedExecutor;
pub use skip::SkipPredicate;

// Re-export from crates for public API
pub use fanout_types::{
    ExecutorError, MaxConcurrent, Outcome, Rejection, RunRecord, RunReport, RunSummary, Settled,
};
