//! Error types for the weft engine
//!
//! Domain errors use thiserror; aspect bodies report failures through
//! anyhow and are folded into [`EngineError`] at the dispatch boundary.

use thiserror::Error;

/// Frame-specific errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// `provide` targeted a path that no frame in the chain owns
    #[error("Path '{0}' not found in any frame")]
    PathNotFound(String),

    /// Strict resolution missed in every frame of the chain
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),
}

/// Convenience result alias for frame operations
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Top-level engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Frame-related errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// A sequence aspect fired without a runner bound in the frame
    #[error("No runner bound under '@runner'")]
    MissingRunner,

    /// A grammar rule or caller aspect used a key the language never declared
    #[error("Key '{0}' is not declared by the language")]
    UndeclaredKey(String),

    /// Failure inside an aspect body, reported as-is
    #[error(transparent)]
    Aspect(#[from] anyhow::Error),
}

/// Result type using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
