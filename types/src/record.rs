//! Per-item settle outcomes and run records.
//!
//! A [`RunRecord`] is created exactly once per considered item and never mutated.
//! Its [`Outcome`] is a sum type, so "skipped implies no output and no rejection"
//! and "exactly one classification per item" hold by construction.

use std::fmt;

/// Why an operation did not produce an output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection<E> {
    /// The operation returned `Err`.
    Error(E),
    /// The operation panicked; holds the panic payload message when it was a string.
    Panicked(String),
}

impl<E> Rejection<E> {
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Rejection::Panicked(_))
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&E> {
        match self {
            Rejection::Error(err) => Some(err),
            Rejection::Panicked(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Rejection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Error(err) => write!(f, "{err}"),
            Rejection::Panicked(message) => write!(f, "operation panicked: {message}"),
        }
    }
}

/// Outcome of one executed operation as reported by the bounded executor.
///
/// The executor never classifies success; it only distinguishes "produced a value"
/// from "failed to produce one".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<I, O, E> {
    Fulfilled { item: I, value: O },
    Rejected { item: I, reason: Rejection<E> },
}

impl<I, O, E> Settled<I, O, E> {
    #[must_use]
    pub fn item(&self) -> &I {
        match self {
            Settled::Fulfilled { item, .. } | Settled::Rejected { item, .. } => item,
        }
    }

    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled { .. })
    }

    #[must_use]
    pub fn into_parts(self) -> (I, Result<O, Rejection<E>>) {
        match self {
            Settled::Fulfilled { item, value } => (item, Ok(value)),
            Settled::Rejected { item, reason } => (item, Err(reason)),
        }
    }
}

/// Final classification of one considered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<O, E> {
    /// Excluded by the skip predicate; the operation never ran.
    Skipped,
    /// The operation failed to produce a value.
    Rejected(Rejection<E>),
    /// The operation produced a value the success predicate accepted.
    Succeeded(O),
    /// The operation produced a value the success predicate rejected.
    Failed(O),
}

impl<O, E> Outcome<O, E> {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Rejected(_) => "rejected",
            Outcome::Succeeded(_) => "succeeded",
            Outcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord<I, O, E> {
    input_index: usize,
    input_item: I,
    outcome: Outcome<O, E>,
}

impl<I, O, E> RunRecord<I, O, E> {
    #[must_use]
    pub const fn skip(input_index: usize, input_item: I) -> Self {
        Self {
            input_index,
            input_item,
            outcome: Outcome::Skipped,
        }
    }

    #[must_use]
    pub const fn reject(input_index: usize, input_item: I, reason: Rejection<E>) -> Self {
        Self {
            input_index,
            input_item,
            outcome: Outcome::Rejected(reason),
        }
    }

    /// Record a completed operation, classified by the caller's success predicate.
    #[must_use]
    pub fn complete(input_index: usize, input_item: I, output: O, success: bool) -> Self {
        let outcome = if success {
            Outcome::Succeeded(output)
        } else {
            Outcome::Failed(output)
        };
        Self {
            input_index,
            input_item,
            outcome,
        }
    }

    /// Zero-based position of the item in the input sequence.
    #[must_use]
    pub const fn input_index(&self) -> usize {
        self.input_index
    }

    #[must_use]
    pub const fn input_item(&self) -> &I {
        &self.input_item
    }

    #[must_use]
    pub const fn outcome(&self) -> &Outcome<O, E> {
        &self.outcome
    }

    /// The operation's output; present only for succeeded and failed records.
    #[must_use]
    pub const fn output_result(&self) -> Option<&O> {
        match &self.outcome {
            Outcome::Succeeded(output) | Outcome::Failed(output) => Some(output),
            Outcome::Skipped | Outcome::Rejected(_) => None,
        }
    }

    #[must_use]
    pub const fn rejected_reason(&self) -> Option<&Rejection<E>> {
        match &self.outcome {
            Outcome::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded(_))
    }

    #[must_use]
    pub const fn skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped)
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self.outcome, Outcome::Rejected(_))
    }

    /// Completed with an output the success predicate judged unsuccessful.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    #[must_use]
    pub fn into_parts(self) -> (usize, I, Outcome<O, E>) {
        (self.input_index, self.input_item, self.outcome)
    }
}
