//! Wrapping Engine
//!
//! Runs an operation inside its registered wrappers.
//! Ideal chain: before-hooks → operation → after-hooks.
//! Fallback chain: error handlers, entered when an ideal stage fails.
//!
//! Both chains stop at the first stage that yields `Some`. Stages run one
//! at a time, each awaited before the next starts, and always receive the
//! original call arguments.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, debug_span, error, trace, warn, Instrument};

use super::config::WrapConfig;
use super::context::Invocation;
use super::outcome::Outcome;
use super::stage::{ErrorStage, Stage, StageKind, StageResult};
use super::wrapper::Wrapper;

/// A stage scheduled in one invocation's chain
struct Planned<S: ?Sized> {
    kind: StageKind,
    wrapper: Option<String>,
    stage: Arc<S>,
}

impl<S: ?Sized> Planned<S> {
    fn new(kind: StageKind, wrapper: Option<&str>, stage: &Arc<S>) -> Self {
        Self {
            kind,
            wrapper: wrapper.map(str::to_owned),
            stage: Arc::clone(stage),
        }
    }
}

type IdealChain<A, T, E> = Vec<Planned<dyn Stage<A, T, E>>>;
type FallbackChain<A, T, E> = Vec<Planned<dyn ErrorStage<A, T, E>>>;

fn ideal_chain<A, T, E>(
    operation: &Arc<dyn Stage<A, T, E>>,
    wrappers: &[Wrapper<A, T, E>],
) -> IdealChain<A, T, E> {
    let mut chain = Vec::with_capacity(wrappers.len() * 2 + 1);
    chain.extend(wrappers.iter().filter_map(|w| {
        w.before_hook()
            .map(|hook| Planned::new(StageKind::Before, w.name(), hook))
    }));
    chain.push(Planned::new(StageKind::Operation, None, operation));
    chain.extend(wrappers.iter().filter_map(|w| {
        w.after_hook()
            .map(|hook| Planned::new(StageKind::After, w.name(), hook))
    }));
    chain
}

fn fallback_chain<A, T, E>(wrappers: &[Wrapper<A, T, E>]) -> FallbackChain<A, T, E> {
    wrappers
        .iter()
        .filter_map(|w| {
            w.error_hook()
                .map(|hook| Planned::new(StageKind::OnError, w.name(), hook))
        })
        .collect()
}

async fn run_ideal<A, T, E>(chain: &IdealChain<A, T, E>, args: &A) -> StageResult<T, E> {
    for (index, step) in chain.iter().enumerate() {
        trace!(stage = %step.kind, index, wrapper = ?step.wrapper, "running stage");
        if let Some(value) = step.stage.call(args).await? {
            debug!(
                stage = %step.kind,
                index,
                wrapper = ?step.wrapper,
                "stage short-circuited chain"
            );
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Create a wrapped operation from a closure
pub fn wrap<A, T, E, F, Fut>(operation: F) -> Wrapped<A, T, E>
where
    F: Fn(&A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StageResult<T, E>> + Send + 'static,
{
    Wrapped::new(operation)
}

/// An operation together with the wrappers registered around it
pub struct Wrapped<A, T, E> {
    operation: Arc<dyn Stage<A, T, E>>,
    wrappers: RwLock<Vec<Wrapper<A, T, E>>>,
    config: WrapConfig,
}

impl<A, T, E> Wrapped<A, T, E> {
    /// Wrap the given operation with no wrappers registered
    pub fn new(operation: impl Stage<A, T, E> + 'static) -> Self {
        Self {
            operation: Arc::new(operation),
            wrappers: RwLock::new(Vec::new()),
            config: WrapConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WrapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WrapConfig {
        &self.config
    }

    /// Add a wrapper
    pub fn with(self, wrapper: Wrapper<A, T, E>) -> Self {
        self.register(wrapper);
        self
    }

    /// Alias of [`Wrapped::with`]
    pub fn and(self, wrapper: Wrapper<A, T, E>) -> Self {
        self.with(wrapper)
    }

    /// Add a wrapper through a shared reference.
    ///
    /// Invocations already in flight keep the wrappers they started with.
    pub fn register(&self, wrapper: Wrapper<A, T, E>) -> &Self {
        self.wrappers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(wrapper);
        self
    }

    /// Get the number of registered wrappers
    pub fn wrapper_count(&self) -> usize {
        self.wrappers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // The sequence is append-only, so a poisoned lock still guards a
    // consistent value.
    fn snapshot(&self) -> Vec<Wrapper<A, T, E>> {
        self.wrappers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invoke the operation through its wrappers.
    ///
    /// Resolves to the first `Some` any ideal stage yields, `None` if there
    /// was none or if an error handler recovered a failure. Rejects with
    /// the original error when no handler recovers it, or with a
    /// handler's own error when that handler fails.
    pub async fn invoke(&self, args: A) -> StageResult<T, E> {
        self.run(args).await.into_result()
    }

    /// Invoke the operation and report how the invocation finished
    pub async fn run(&self, args: A) -> Outcome<T, E> {
        let invocation = Invocation::new();
        let span = debug_span!(
            "wrapped.invoke",
            wrapped = %self.config.name,
            invocation_id = %invocation.id
        );
        self.execute(&invocation, args).instrument(span).await
    }

    async fn execute(&self, invocation: &Invocation, args: A) -> Outcome<T, E> {
        let wrappers = self.snapshot();
        let ideal = ideal_chain(&self.operation, &wrappers);
        let fallback = fallback_chain(&wrappers);
        debug!(
            wrappers = wrappers.len(),
            ideal = ideal.len(),
            fallback = fallback.len(),
            "invocation started"
        );

        let caught = match run_ideal(&ideal, &args).await {
            Ok(value) => {
                debug!(
                    has_value = value.is_some(),
                    elapsed_ms = invocation.elapsed_ms(),
                    "ideal chain completed"
                );
                return Outcome::Completed(value);
            }
            Err(caught) => caught,
        };

        debug!(handlers = fallback.len(), "ideal chain failed");
        for (index, step) in fallback.iter().enumerate() {
            trace!(stage = %step.kind, index, wrapper = ?step.wrapper, "running stage");
            match step.stage.call(&caught, &args).await {
                Ok(Some(value)) => {
                    if self.config.log_recovered {
                        warn!(
                            index,
                            wrapper = ?step.wrapper,
                            elapsed_ms = invocation.elapsed_ms(),
                            "error recovered by handler"
                        );
                    }
                    return Outcome::Recovered {
                        error: caught,
                        value,
                    };
                }
                Ok(None) => continue,
                Err(handler_error) => {
                    error!(
                        index,
                        wrapper = ?step.wrapper,
                        elapsed_ms = invocation.elapsed_ms(),
                        "error handler failed"
                    );
                    return Outcome::HandlerFailed {
                        original: caught,
                        error: handler_error,
                    };
                }
            }
        }

        debug!(
            elapsed_ms = invocation.elapsed_ms(),
            "no handler recovered error, rethrowing"
        );
        Outcome::Failed(caught)
    }
}

impl<A, T, E> fmt::Debug for Wrapped<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("config", &self.config)
            .field("wrappers", &self.wrapper_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future;

    type TestWrapper = Wrapper<u32, u32, String>;

    fn noop(_: &u32) -> future::Ready<StageResult<u32, String>> {
        future::ready(Ok(None))
    }

    fn kinds<S: ?Sized>(chain: &[Planned<S>]) -> Vec<(StageKind, Option<String>)> {
        chain
            .iter()
            .map(|step| (step.kind, step.wrapper.clone()))
            .collect()
    }

    #[test]
    fn test_ideal_chain_interleaves_hooks_around_operation() {
        let operation: Arc<dyn Stage<u32, u32, String>> = Arc::new(noop);
        let wrappers = vec![
            TestWrapper::named("one").before(noop).after(noop),
            TestWrapper::named("two").before(noop),
            TestWrapper::named("three").after(noop),
        ];

        let chain = ideal_chain(&operation, &wrappers);

        assert_eq!(
            kinds(&chain),
            vec![
                (StageKind::Before, Some("one".to_string())),
                (StageKind::Before, Some("two".to_string())),
                (StageKind::Operation, None),
                (StageKind::After, Some("one".to_string())),
                (StageKind::After, Some("three".to_string())),
            ]
        );
    }

    #[test]
    fn test_fallback_chain_skips_missing_handlers() {
        let handler = |_: &String, _: &u32| future::ready(Ok(None));
        let wrappers = vec![
            TestWrapper::named("one").before(noop),
            TestWrapper::named("two").on_error(handler),
            TestWrapper::new(),
            TestWrapper::named("four").on_error(handler),
        ];

        let chain = fallback_chain(&wrappers);

        assert_eq!(
            kinds(&chain),
            vec![
                (StageKind::OnError, Some("two".to_string())),
                (StageKind::OnError, Some("four".to_string())),
            ]
        );
    }

    #[test]
    fn test_empty_wrappers_leave_only_operation() {
        let operation: Arc<dyn Stage<u32, u32, String>> = Arc::new(noop);
        let wrappers = vec![TestWrapper::new(), TestWrapper::new()];

        assert_eq!(ideal_chain(&operation, &wrappers).len(), 1);
        assert!(fallback_chain(&wrappers).is_empty());
    }

    #[test]
    fn test_registration_accumulates() {
        let wrapped = wrap(noop).with(TestWrapper::new()).and(TestWrapper::new());
        assert_eq!(wrapped.wrapper_count(), 2);

        let same = wrapped.register(TestWrapper::new());
        assert!(std::ptr::eq(same, &wrapped));
        assert_eq!(wrapped.wrapper_count(), 3);
    }

    #[tokio::test]
    async fn test_invoke_without_wrappers_runs_operation() {
        let wrapped = wrap(|n: &u32| future::ready(Ok::<_, String>(Some(n * 10))));
        assert_eq!(wrapped.invoke(4).await, Ok(Some(40)));
    }

    #[tokio::test]
    async fn test_zero_is_a_value() {
        let wrapped = wrap(|_: &u32| future::ready(Ok::<_, String>(Some(0))))
            .with(TestWrapper::new().after(|_: &u32| future::ready(Ok(Some(99)))));
        assert_eq!(wrapped.invoke(1).await, Ok(Some(0)));
    }

    #[tokio::test]
    async fn test_failure_without_handlers_rethrows() {
        let wrapped = wrap(|_: &u32| future::ready(Err::<Option<u32>, _>("boom".to_string())));
        assert_eq!(wrapped.run(1).await, Outcome::Failed("boom".to_string()));
    }

    #[tokio::test]
    async fn test_recovered_outcome_keeps_handler_value() {
        let wrapped = wrap(|_: &u32| future::ready(Err::<Option<u32>, _>("boom".to_string())))
            .with(TestWrapper::new().on_error(|_: &String, n: &u32| future::ready(Ok(Some(*n)))));

        assert_eq!(
            wrapped.run(5).await,
            Outcome::Recovered {
                error: "boom".to_string(),
                value: 5
            }
        );
        assert_eq!(wrapped.invoke(5).await, Ok(None));
    }

    #[test]
    fn test_config_is_attached() {
        let wrapped = wrap(noop).with_config(WrapConfig::named("billing"));
        assert_eq!(wrapped.config().name, "billing");
        assert!(format!("{:?}", wrapped).contains("billing"));
    }
}
