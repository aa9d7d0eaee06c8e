//! Concurrency limit invariant types.
//!
//! `MaxConcurrent` makes a zero or negative ceiling unrepresentable by construction.

use std::fmt;
use std::num::NonZeroUsize;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("invalid argument: max_concurrent must be a positive integer (got {value})")]
    InvalidArgument { value: i64 },
}

/// Upper bound on the number of operations in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxConcurrent(NonZeroUsize);

impl MaxConcurrent {
    /// Ceiling used when none is configured.
    pub const DEFAULT: MaxConcurrent = MaxConcurrent(NonZeroUsize::new(10).unwrap());

    /// A ceiling of one; the executor runs items strictly one after another.
    pub const SEQUENTIAL: MaxConcurrent = MaxConcurrent(NonZeroUsize::MIN);

    pub fn new(value: i64) -> Result<Self, ExecutorError> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(ExecutorError::InvalidArgument { value })
    }

    #[must_use]
    pub const fn from_non_zero(value: NonZeroUsize) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for MaxConcurrent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for MaxConcurrent {
    type Error = ExecutorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonZeroUsize> for MaxConcurrent {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl fmt::Display for MaxConcurrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
