//! Expression compilation as an injected capability.
//!
//! The engine never parses expression strings itself. Languages whose
//! aspects need to evaluate expressions (a `transform` step compiling
//! `"x * 2"`, say) receive an [`ExprCompiler`] from the host and close
//! over it; the engine only fixes the contract that compilation yields
//! a [`Callable`] over positional parameters.

use std::sync::Arc;

use crate::engine::value::Callable;

/// Compiles expression source into a callable over named parameters.
pub trait ExprCompiler: Send + Sync {
    /// Compile `source` into a callable whose arguments bind to
    /// `params` positionally.
    fn compile(&self, source: &str, params: &[&str]) -> anyhow::Result<Callable>;
}

/// Shared handle to a type-erased expression compiler.
pub type CompilerRef = Arc<dyn ExprCompiler>;

impl<T: ExprCompiler + ?Sized> ExprCompiler for Arc<T> {
    fn compile(&self, source: &str, params: &[&str]) -> anyhow::Result<Callable> {
        (**self).compile(source, params)
    }
}
