//! fnwrap - before/after/on-error wrappers around an async operation
//!
//! Register wrappers against an operation, then invoke it. Each invocation
//! runs every `before` hook, the operation, then every `after` hook, in
//! registration order, stopping at the first stage that yields `Some`.
//! When a stage fails, the `on_error` handlers run instead; the failure is
//! suppressed if one of them yields `Some` and returned otherwise.
//!
//! ```rust,ignore
//! use fnwrap::{wrap, Wrapper};
//! use futures_util::future;
//!
//! let cached = wrap(|id: &u64| future::ready(Ok::<_, String>(Some(format!("user-{id}")))))
//!     .with(Wrapper::named("cache").before(|id: &u64| future::ready(Ok(lookup(*id)))))
//!     .and(Wrapper::named("fallback").on_error(|_: &String, _: &u64| {
//!         future::ready(Ok(Some(String::new())))
//!     }));
//!
//! let name = cached.invoke(42).await?;
//! ```

pub mod engine;

pub use crate::engine::{
    wrap, ConfigError, ConfigResult, ErrorStage, Invocation, Outcome, Stage, StageFuture,
    StageKind, StageResult, WrapConfig, Wrapped, Wrapper,
};
