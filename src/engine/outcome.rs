//! Invocation Outcomes
//!
//! Terminal states of one invocation of a wrapped operation.

use super::stage::StageResult;

/// How an invocation finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The ideal chain short-circuited with a value or ran to the end
    Completed(Option<T>),

    /// A stage failed and an error handler produced a value
    Recovered { error: E, value: T },

    /// A stage failed and no error handler produced a value
    Failed(E),

    /// An error handler failed while handling `original`
    HandlerFailed { original: E, error: E },
}

impl<T, E> Outcome<T, E> {
    /// Collapse into the invocation result.
    ///
    /// A recovered error resolves to `Ok(None)`; the handler's value is
    /// dropped. A failing handler surfaces its own error, not the original.
    pub fn into_result(self) -> StageResult<T, E> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Recovered { .. } => Ok(None),
            Outcome::Failed(error) => Err(error),
            Outcome::HandlerFailed { error, .. } => Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(_) | Outcome::Recovered { .. })
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Outcome::Recovered { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The error caught from the ideal chain, if one was raised
    pub fn caught(&self) -> Option<&E> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Recovered { error, .. } => Some(error),
            Outcome::Failed(error) => Some(error),
            Outcome::HandlerFailed { original, .. } => Some(original),
        }
    }
}
