//! Run coordinator: turns an input sequence plus policy into a classified [`RunReport`].
//!
//! # Flow
//!
//! 1. Pull items in order. Stop once `only_first_n` items have been considered; later
//!    items are never pulled and never appear in the report.
//! 2. Items matching the skip predicate become skipped records.
//! 3. Everything else is queued on a [`BoundedExecutor`] and driven by one
//!    `process_queue` call.
//! 4. Fulfilled outcomes are classified by the success predicate; captured errors and
//!    panics become rejected records.

use std::fmt;
use std::future::Future;

use tracing::Instrument;

use fanout_types::{ExecutorError, MaxConcurrent, RunRecord, RunReport};

use crate::executor::BoundedExecutor;
use crate::skip::SkipPredicate;

const DEFAULT_LABEL: &str = "fanout";

/// Policy for one [`run_parallel`] call.
pub struct RunOptions<'a, I> {
    /// Forwarded to the executor; must be positive.
    pub max_concurrent: i64,
    pub should_skip: Option<SkipPredicate<'a, I>>,
    /// Consider at most this many items (submitted plus skipped).
    pub only_first_n: Option<usize>,
    /// Name recorded on the run's tracing span.
    pub label: Option<String>,
}

impl<I> Default for RunOptions<'_, I> {
    fn default() -> Self {
        Self {
            max_concurrent: MaxConcurrent::DEFAULT.get() as i64,
            should_skip: None,
            only_first_n: None,
            label: None,
        }
    }
}

impl<'a, I> RunOptions<'a, I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrent(mut self, max_concurrent: i64) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_should_skip(mut self, predicate: SkipPredicate<'a, I>) -> Self {
        self.should_skip = Some(predicate);
        self
    }

    pub fn skip_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'a,
    {
        self.with_should_skip(SkipPredicate::new(predicate))
    }

    pub fn with_only_first_n(mut self, only_first_n: usize) -> Self {
        self.only_first_n = Some(only_first_n);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl<I> fmt::Debug for RunOptions<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("max_concurrent", &self.max_concurrent)
            .field("should_skip", &self.should_skip)
            .field("only_first_n", &self.only_first_n)
            .field("label", &self.label)
            .finish()
    }
}

/// Run `operation` over `items` with bounded concurrency and classify every outcome.
///
/// `is_success` only classifies operations that produced a value; it never decides
/// whether something runs. The only error is an invalid `max_concurrent`, reported
/// before any item is pulled. Per-item errors and panics end up in the report.
pub async fn run_parallel<'a, I, O, E, It, F, Fut, S>(
    items: It,
    operation: F,
    is_success: S,
    options: RunOptions<'a, I>,
) -> Result<RunReport<I, O, E>, ExecutorError>
where
    It: IntoIterator<Item = I>,
    I: Clone + fmt::Debug + Send + 'a,
    O: Send,
    E: fmt::Display + Send,
    F: Fn(I) -> Fut + Sync,
    Fut: Future<Output = Result<O, E>> + Send,
    S: Fn(&O) -> bool,
{
    let RunOptions {
        max_concurrent,
        should_skip,
        only_first_n,
        label,
    } = options;

    let limit = MaxConcurrent::new(max_concurrent)?;
    let span = tracing::info_span!(
        "run",
        label = label.as_deref().unwrap_or(DEFAULT_LABEL),
        max_concurrent = limit.get(),
    );

    async move {
        let operation = &operation;
        let mut executor = BoundedExecutor::with_limit(limit);
        let mut skipped = Vec::new();
        let mut considered = 0_usize;
        let mut items = items.into_iter();

        loop {
            if only_first_n.is_some_and(|cutoff| considered >= cutoff) {
                tracing::debug!(only_first_n = considered, "item cutoff reached");
                break;
            }
            let Some(item) = items.next() else {
                break;
            };
            let index = considered;
            considered += 1;

            if let Some(predicate) = &should_skip
                && predicate.should_skip(&item).await
            {
                tracing::trace!(index, item = ?item, "skipped");
                skipped.push(RunRecord::skip(index, item));
                continue;
            }

            executor.queue_task((index, item), move |(_, item)| operation(item));
        }

        tracing::debug!(
            submitted = executor.registered(),
            skipped = skipped.len(),
            "processing queue"
        );
        let settled = executor.process_queue().await;

        let mut records = Vec::with_capacity(settled.len() + skipped.len());
        for outcome in settled {
            let ((index, item), result) = outcome.into_parts();
            let record = match result {
                Ok(output) => {
                    let success = is_success(&output);
                    if !success {
                        tracing::debug!(index, item = ?item, "operation completed unsuccessfully");
                    }
                    RunRecord::complete(index, item, output, success)
                }
                Err(reason) => {
                    tracing::warn!(index, item = ?item, %reason, "operation rejected");
                    RunRecord::reject(index, item, reason)
                }
            };
            records.push(record);
        }
        records.extend(skipped);

        let report = RunReport::new(records);
        let summary = report.summary();
        tracing::info!(
            processed = summary.executed(),
            skipped = summary.skipped,
            successful = summary.successful,
            failed = summary.failed,
            rejected = summary.rejected,
            "run finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
