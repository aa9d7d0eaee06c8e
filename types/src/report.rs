//! Aggregate run report.
//!
//! The report owns every record of a run and exposes filtered views that are
//! recomputed on each access rather than stored alongside the records.

use std::fmt;

use serde::Serialize;

use crate::record::RunRecord;

/// Immutable result of one run.
///
/// Records are ordered as executed items in settle order followed by skipped items in
/// input order. Settle order is non-deterministic; use [`RunReport::records_in_input_order`]
/// or [`RunReport::all_input_items`] when input order matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport<I, O, E> {
    records: Vec<RunRecord<I, O, E>>,
}

impl<I, O, E> RunReport<I, O, E> {
    #[must_use]
    pub fn new(records: Vec<RunRecord<I, O, E>>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[RunRecord<I, O, E>] {
        &self.records
    }

    #[must_use]
    pub fn records_in_input_order(&self) -> Vec<&RunRecord<I, O, E>> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by_key(|record| record.input_index());
        records
    }

    #[must_use]
    pub fn successful(&self) -> Vec<&RunRecord<I, O, E>> {
        self.filtered(RunRecord::success)
    }

    /// Records whose operation completed but whose output was judged unsuccessful.
    #[must_use]
    pub fn failed(&self) -> Vec<&RunRecord<I, O, E>> {
        self.filtered(RunRecord::is_failed)
    }

    #[must_use]
    pub fn skipped(&self) -> Vec<&RunRecord<I, O, E>> {
        self.filtered(RunRecord::skipped)
    }

    #[must_use]
    pub fn rejected(&self) -> Vec<&RunRecord<I, O, E>> {
        self.filtered(RunRecord::is_rejected)
    }

    /// Every considered input item, in input order.
    #[must_use]
    pub fn all_input_items(&self) -> Vec<&I> {
        self.records_in_input_order()
            .into_iter()
            .map(RunRecord::input_item)
            .collect()
    }

    /// Outputs of every completed operation (succeeded or failed), in record order.
    #[must_use]
    pub fn all_output_results(&self) -> Vec<&O> {
        self.records
            .iter()
            .filter_map(RunRecord::output_result)
            .collect()
    }

    #[must_use]
    pub fn num_successful(&self) -> usize {
        self.count(RunRecord::success)
    }

    #[must_use]
    pub fn num_failed(&self) -> usize {
        self.count(RunRecord::is_failed)
    }

    #[must_use]
    pub fn num_rejected(&self) -> usize {
        self.count(RunRecord::is_rejected)
    }

    #[must_use]
    pub fn num_skipped(&self) -> usize {
        self.count(RunRecord::skipped)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.total(),
            successful: self.num_successful(),
            failed: self.num_failed(),
            rejected: self.num_rejected(),
            skipped: self.num_skipped(),
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<RunRecord<I, O, E>> {
        self.records
    }

    fn filtered(&self, keep: impl Fn(&RunRecord<I, O, E>) -> bool) -> Vec<&RunRecord<I, O, E>> {
        self.records.iter().filter(|record| keep(record)).collect()
    }

    fn count(&self, keep: impl Fn(&RunRecord<I, O, E>) -> bool) -> usize {
        self.records.iter().filter(|record| keep(record)).count()
    }
}

/// Per-classification counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub rejected: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Number of items whose operation was actually invoked.
    #[must_use]
    pub const fn executed(&self) -> usize {
        self.total.saturating_sub(self.skipped)
    }

    /// True when every executed item succeeded. Skipped items do not count against a run.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.rejected == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.total == 1 { "item" } else { "items" };
        write!(
            f,
            "{} {noun}: {} succeeded, {} failed, {} rejected, {} skipped",
            self.total, self.successful, self.failed, self.rejected, self.skipped
        )
    }
}
