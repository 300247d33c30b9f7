//! Named behaviors dispatched by program-data key
//!
//! An aspect is the unit of behavior in a language: it claims one key
//! and turns that key's (already resolved) value plus the current frame
//! into the next frame. Aspects are type-erased behind [`AspectRef`] so
//! languages can mix caller-supplied closures with the synthetic
//! aspects derived from a grammar.

use std::fmt;
use std::sync::Arc;

use crate::engine::error::Result;
use crate::engine::frame::Frame;
use crate::engine::value::Value;

/// A named transformation from (value, frame) to the next frame.
pub trait Aspect: Send + Sync {
    /// Program-data key this aspect consumes.
    fn key(&self) -> &str;

    /// Apply the aspect. `value` has already been through value
    /// resolution; `frame` is the frame produced by the previous aspect.
    fn apply(&self, value: Value, frame: Frame) -> Result<Frame>;
}

/// Shared handle to a type-erased aspect.
pub type AspectRef = Arc<dyn Aspect>;

/// Closure-backed [`Aspect`] implementation.
pub struct AspectFn {
    key: String,
    apply: Box<dyn Fn(Value, Frame) -> Result<Frame> + Send + Sync>,
}

impl AspectFn {
    /// Wrap a closure under the given key.
    pub fn new<F>(key: impl Into<String>, apply: F) -> Self
    where
        F: Fn(Value, Frame) -> Result<Frame> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            apply: Box::new(apply),
        }
    }
}

impl Aspect for AspectFn {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply(&self, value: Value, frame: Frame) -> Result<Frame> {
        (self.apply)(value, frame)
    }
}

impl fmt::Debug for AspectFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectFn").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Build a shared aspect from a key and a closure.
pub fn aspect<F>(key: impl Into<String>, apply: F) -> AspectRef
where
    F: Fn(Value, Frame) -> Result<Frame> + Send + Sync + 'static,
{
    Arc::new(AspectFn::new(key, apply))
}
