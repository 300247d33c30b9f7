//! Weft – A frame-scoped, aspect-dispatch execution engine for embedded little languages
//!
//! This crate runs programs written as plain data against a frame chain:
//! - Chained immutable scopes with dot-path resolution and parent fallback
//! - Languages derived from a grammar: dispatch table plus deterministic order
//! - Synthetic aspects for binding forms, namespaces, and executable sequences
//! - A recursive runner injected into the frame, so sequences nest freely
//! - Expression compilation and macro expansion as injected host capabilities

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Engine core modules: values, frames, aspects, languages, programs
pub mod engine;
/// Expression-compilation capability contract
pub mod expr;
/// Macro definitions and their language
pub mod macros;

// Re-export key types for convenience
pub use engine::{
    Aspect, AspectFn, AspectRef, Bindings, Callable, CallableFn, EngineError, Frame, FrameError,
    FrameResult, Grammar, Language, Program, RUNNER_KEY, Result, Runner, RunnerFn, Value, aspect,
    bindings, resolve_value, run,
};
pub use expr::{CompilerRef, ExprCompiler};
pub use macros::{MACRO_KEYS, Macro, MacroExpander, macro_language};

/// Current version of the weft engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
