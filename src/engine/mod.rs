//! Execution engine for frame-scoped little languages.
//!
//! Programs here are plain data read under a [`Language`]: the language
//! derives, from a grammar and a set of caller aspects, both a dispatch
//! table and a deterministic execution order. Running a [`Program`]
//! threads a chained [`Frame`] of bindings through that order, so each
//! aspect sees the scopes its predecessors established and may push
//! scopes of its own.

/// Named behaviors dispatched by program-data key.
pub mod aspect;
/// Engine error types.
pub mod error;
/// Chained binding environments.
pub mod frame;
/// Grammar trees and marker shapes.
pub mod grammar;
/// Language construction and aspect derivation.
pub mod language;
/// Programs and the run loop.
pub mod program;
/// Dynamic values and capability wrappers.
pub mod value;

pub use aspect::{Aspect, AspectFn, AspectRef, aspect};
pub use error::{EngineError, FrameError, FrameResult, Result};
pub use frame::{Frame, resolve_value};
pub use grammar::Grammar;
pub use language::Language;
pub use program::{Program, RUNNER_KEY, run};
pub use value::{Bindings, Callable, CallableFn, Runner, RunnerFn, Value, bindings};
