//! Skip predicates evaluated before an item reaches the executor.

use std::fmt;

use futures_util::future::BoxFuture;

type SyncSkip<'a, I> = Box<dyn Fn(&I) -> bool + Send + Sync + 'a>;
type AsyncSkip<'a, I> = Box<dyn for<'i> Fn(&'i I) -> BoxFuture<'i, bool> + Send + Sync + 'a>;

/// Decides whether an item is recorded as skipped instead of being executed.
pub enum SkipPredicate<'a, I> {
    Sync(SyncSkip<'a, I>),
    Async(AsyncSkip<'a, I>),
}

impl<'a, I> SkipPredicate<'a, I> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'a,
    {
        Self::Sync(Box::new(predicate))
    }

    /// Build from a predicate that has to await something (a lookup, a file check).
    ///
    /// ```ignore
    /// SkipPredicate::new_async(|path: &PathBuf| async move { path.exists() }.boxed())
    /// ```
    pub fn new_async<F>(predicate: F) -> Self
    where
        F: for<'i> Fn(&'i I) -> BoxFuture<'i, bool> + Send + Sync + 'a,
    {
        Self::Async(Box::new(predicate))
    }

    pub async fn should_skip(&self, item: &I) -> bool {
        match self {
            SkipPredicate::Sync(predicate) => predicate(item),
            SkipPredicate::Async(predicate) => predicate(item).await,
        }
    }
}

impl<I> fmt::Debug for SkipPredicate<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipPredicate::Sync(_) => f.write_str("SkipPredicate::Sync(..)"),
            SkipPredicate::Async(_) => f.write_str("SkipPredicate::Async(..)"),
        }
    }
}
