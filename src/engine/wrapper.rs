//! Wrapper Records
//!
//! A wrapper contributes up to three stages: a before-hook, an after-hook
//! and an error handler. Absent slots contribute nothing to either chain.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::stage::{ErrorStage, Stage, StageResult};

/// Optional before/after/on-error hooks registered around an operation
pub struct Wrapper<A, T, E> {
    name: Option<String>,
    before: Option<Arc<dyn Stage<A, T, E>>>,
    after: Option<Arc<dyn Stage<A, T, E>>>,
    on_error: Option<Arc<dyn ErrorStage<A, T, E>>>,
}

impl<A, T, E> Wrapper<A, T, E> {
    /// Create a wrapper with every slot empty
    pub fn new() -> Self {
        Self {
            name: None,
            before: None,
            after: None,
            on_error: None,
        }
    }

    /// Create an empty wrapper labelled for log output
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Set the hook run before the operation
    pub fn before<F, Fut>(self, f: F) -> Self
    where
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StageResult<T, E>> + Send + 'static,
    {
        self.before_stage(f)
    }

    /// Set the hook run after the operation
    pub fn after<F, Fut>(self, f: F) -> Self
    where
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StageResult<T, E>> + Send + 'static,
    {
        self.after_stage(f)
    }

    /// Set the handler run when any ideal-chain stage fails
    pub fn on_error<F, Fut>(self, f: F) -> Self
    where
        F: Fn(&E, &A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StageResult<T, E>> + Send + 'static,
    {
        self.on_error_stage(f)
    }

    pub fn before_stage(mut self, stage: impl Stage<A, T, E> + 'static) -> Self {
        self.before = Some(Arc::new(stage));
        self
    }

    pub fn after_stage(mut self, stage: impl Stage<A, T, E> + 'static) -> Self {
        self.after = Some(Arc::new(stage));
        self
    }

    pub fn on_error_stage(mut self, stage: impl ErrorStage<A, T, E> + 'static) -> Self {
        self.on_error = Some(Arc::new(stage));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn before_hook(&self) -> Option<&Arc<dyn Stage<A, T, E>>> {
        self.before.as_ref()
    }

    pub(crate) fn after_hook(&self) -> Option<&Arc<dyn Stage<A, T, E>>> {
        self.after.as_ref()
    }

    pub(crate) fn error_hook(&self) -> Option<&Arc<dyn ErrorStage<A, T, E>>> {
        self.on_error.as_ref()
    }

    /// True when no slot is filled
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.on_error.is_none()
    }
}

impl<A, T, E> Default for Wrapper<A, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> Clone for Wrapper<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for Wrapper<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("name", &self.name)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future;

    type TestWrapper = Wrapper<u8, u8, String>;

    #[test]
    fn test_new_wrapper_is_empty() {
        let wrapper = TestWrapper::new();
        assert!(wrapper.is_empty());
        assert!(wrapper.name().is_none());
    }

    #[test]
    fn test_slots_are_independent() {
        let wrapper = TestWrapper::named("audit").after(|_: &u8| future::ready(Ok(None)));

        assert_eq!(wrapper.name(), Some("audit"));
        assert!(wrapper.before_hook().is_none());
        assert!(wrapper.after_hook().is_some());
        assert!(wrapper.error_hook().is_none());
        assert!(!wrapper.is_empty());
    }

    #[test]
    fn test_clone_shares_hooks() {
        let wrapper = TestWrapper::new().before(|_: &u8| future::ready(Ok(Some(1))));
        let cloned = wrapper.clone();

        match (wrapper.before_hook(), cloned.before_hook()) {
            (Some(original), Some(copy)) => assert!(Arc::ptr_eq(original, copy)),
            _ => panic!("Expected both wrappers to carry a before hook"),
        }
    }

    #[test]
    fn test_debug_reports_filled_slots() {
        let wrapper = TestWrapper::new().on_error(|_: &String, _: &u8| future::ready(Ok(None)));
        let rendered = format!("{:?}", wrapper);
        assert!(rendered.contains("on_error: true"));
        assert!(rendered.contains("before: false"));
    }
}
