//! Stage Traits
//!
//! A stage is one callable in a chain: a before-hook, the wrapped
//! operation, an after-hook, or an error handler.

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;

/// What a stage produces. `Some` short-circuits the chain, `None` passes on.
pub type StageResult<T, E> = Result<Option<T>, E>;

/// Boxed future returned by every stage
pub type StageFuture<'a, T, E> = BoxFuture<'a, StageResult<T, E>>;

/// Stage of the ideal chain (hooks and the wrapped operation)
pub trait Stage<A, T, E>: Send + Sync {
    /// Run the stage with the original call arguments
    fn call<'a>(&'a self, args: &'a A) -> StageFuture<'a, T, E>;
}

impl<A, T, E, F, Fut> Stage<A, T, E> for F
where
    F: Fn(&A) -> Fut + Send + Sync,
    Fut: Future<Output = StageResult<T, E>> + Send + 'static,
{
    fn call<'a>(&'a self, args: &'a A) -> StageFuture<'a, T, E> {
        Box::pin(self(args))
    }
}

/// Stage of the fallback chain
pub trait ErrorStage<A, T, E>: Send + Sync {
    /// Run the handler with the caught error and the original call arguments
    fn call<'a>(&'a self, error: &'a E, args: &'a A) -> StageFuture<'a, T, E>;
}

impl<A, T, E, F, Fut> ErrorStage<A, T, E> for F
where
    F: Fn(&E, &A) -> Fut + Send + Sync,
    Fut: Future<Output = StageResult<T, E>> + Send + 'static,
{
    fn call<'a>(&'a self, error: &'a E, args: &'a A) -> StageFuture<'a, T, E> {
        Box::pin(self(error, args))
    }
}

/// Position a stage occupies in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Before,
    Operation,
    After,
    OnError,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Before => "before",
            StageKind::Operation => "operation",
            StageKind::After => "after",
            StageKind::OnError => "on_error",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
