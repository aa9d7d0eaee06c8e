//! Bounded executor: admission-on-release scheduling of queued operations.
//!
//! Queued operations are started in FIFO order, at most `max_concurrent` at a time.
//! Whenever one settles (value, error or panic) its slot is released and the next
//! queued operation is admitted before the executor waits again, so the pipeline stays
//! saturated until the queue drains.
//!
//! ```text
//! queue_task() ──► [ queue (FIFO) ] ──admit──► [ in flight <= max ] ──settle──► Vec<Settled>
//!                        ▲                                 │
//!                        └───────── release slot ──────────┘
//! ```
//!
//! All admitted futures are polled on the caller's task through a `FuturesUnordered`
//! set. Admission and release only happen between polls, so the counter and queue
//! need no lock.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};

use fanout_types::{ExecutorError, MaxConcurrent, Rejection, Settled};

/// A not-yet-started operation. Calling it creates the future that runs the operation.
type QueuedTask<'a, I, O, E> = Box<dyn FnOnce() -> BoxFuture<'a, Settled<I, O, E>> + Send + 'a>;

/// Runs queued operations with at most `max_concurrent` in flight.
///
/// One executor serves one run: [`BoundedExecutor::process_queue`] consumes it.
pub struct BoundedExecutor<'a, I, O, E> {
    limit: MaxConcurrent,
    queue: VecDeque<QueuedTask<'a, I, O, E>>,
    num_executing: usize,
    registered: usize,
}

impl<'a, I, O, E> BoundedExecutor<'a, I, O, E>
where
    I: Clone + Send + 'a,
    O: Send + 'a,
    E: Send + 'a,
{
    /// Create an executor for `max_concurrent` simultaneous operations.
    ///
    /// Fails with [`ExecutorError::InvalidArgument`] when `max_concurrent <= 0`.
    pub fn new(max_concurrent: i64) -> Result<Self, ExecutorError> {
        MaxConcurrent::new(max_concurrent).map(Self::with_limit)
    }

    #[must_use]
    pub fn with_limit(limit: MaxConcurrent) -> Self {
        Self {
            limit,
            queue: VecDeque::new(),
            num_executing: 0,
            registered: 0,
        }
    }

    #[must_use]
    pub const fn max_concurrent(&self) -> MaxConcurrent {
        self.limit
    }

    /// Number of registered operations that have not been admitted yet.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub const fn registered(&self) -> usize {
        self.registered
    }

    /// Register `operation(item)` for later execution. Nothing runs until
    /// [`BoundedExecutor::process_queue`] is awaited.
    ///
    /// The item is cloned into the operation; the original is kept for the outcome.
    pub fn queue_task<F, Fut>(&mut self, item: I, operation: F)
    where
        F: FnOnce(I) -> Fut + Send + 'a,
        Fut: Future<Output = Result<O, E>> + Send + 'a,
    {
        let task = self.registered;
        self.registered += 1;

        self.queue.push_back(Box::new(move || {
            async move {
                tracing::trace!(task, "operation admitted");
                let input = item.clone();
                let result = AssertUnwindSafe(async move { operation(input).await })
                    .catch_unwind()
                    .await;

                let settled = match result {
                    Ok(Ok(value)) => Settled::Fulfilled { item, value },
                    Ok(Err(err)) => Settled::Rejected {
                        item,
                        reason: Rejection::Error(err),
                    },
                    Err(payload) => Settled::Rejected {
                        item,
                        reason: Rejection::Panicked(panic_message(payload.as_ref())),
                    },
                };
                tracing::trace!(task, fulfilled = settled.is_fulfilled(), "operation settled");
                settled
            }
            .boxed()
        }));
    }

    /// Drive every registered operation to completion.
    ///
    /// Returns one [`Settled`] per registered operation, in settle order. Operation
    /// errors and panics are captured in the outcomes; this never fails.
    pub async fn process_queue(mut self) -> Vec<Settled<I, O, E>> {
        let mut in_flight = FuturesUnordered::new();
        let mut settled = Vec::with_capacity(self.registered);

        self.admit(&mut in_flight);
        while let Some(outcome) = in_flight.next().await {
            self.num_executing -= 1;
            settled.push(outcome);
            self.admit(&mut in_flight);
        }

        debug_assert!(self.queue.is_empty(), "queue drained when nothing is in flight");
        debug_assert_eq!(settled.len(), self.registered, "one outcome per registered task");
        settled
    }

    fn admit(&mut self, in_flight: &mut FuturesUnordered<BoxFuture<'a, Settled<I, O, E>>>) {
        while self.num_executing < self.limit.get() {
            let Some(start) = self.queue.pop_front() else {
                break;
            };
            self.num_executing += 1;
            in_flight.push(start());
        }
    }
}

impl<I, O, E> fmt::Debug for BoundedExecutor<'_, I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedExecutor")
            .field("max_concurrent", &self.limit)
            .field("queued", &self.queue.len())
            .field("num_executing", &self.num_executing)
            .field("registered", &self.registered)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
