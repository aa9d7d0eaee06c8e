//! Core domain types for fanout.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! the validated concurrency limit, per-item run records and the aggregate run report.
//! The executor and coordinator in `fanout-engine` produce these; callers only read them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod limits;
mod record;
mod report;

pub use limits::{ExecutorError, MaxConcurrent};
pub use record::{Outcome, Rejection, RunRecord, Settled};
pub use report::{RunReport, RunSummary};
