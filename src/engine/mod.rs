//! # Wrapping Engine
//!
//! Before/after/on-error wrappers composed around a single async
//! operation.
//!
//! ## Design Principles
//!
//! - One ideal chain and one fallback chain, rebuilt per invocation
//! - First `Some` short-circuits either chain
//! - Stages run strictly one after another
//! - Caller-owned errors pass through unmodified

pub mod config;
pub mod context;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod stage;
pub mod wrapper;

pub use config::WrapConfig;
pub use context::Invocation;
pub use error::{ConfigError, ConfigResult};
pub use outcome::Outcome;
pub use pipeline::{wrap, Wrapped};
pub use stage::{ErrorStage, Stage, StageFuture, StageKind, StageResult};
pub use wrapper::Wrapper;
