//! Dynamic values flowing through frames and programs
//!
//! Program data, frame bindings, and aspect inputs all share one value
//! type. Two variants are capabilities rather than data: [`Callable`]
//! wraps an injected function and [`Runner`] wraps the recursive
//! program-execution hook. Both are opaque to serialization and compare
//! by identity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::error::EngineError;
use crate::engine::frame::Frame;

/// Named bindings, ordered by key.
pub type Bindings = BTreeMap<String, Value>;

/// Signature of an injected function capability.
pub type CallableFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Signature of the recursive execution capability bound under `@runner`.
pub type RunnerFn = Arc<dyn Fn(&Value, &Frame) -> Result<Frame, EngineError> + Send + Sync>;

/// A dynamic value: JSON-shaped data plus opaque capabilities.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or filtered-out value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// UTF-8 string; may act as a reference into the frame chain
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed map
    Map(Bindings),
    /// Injected function capability
    Callable(Callable),
    /// Recursive program-execution capability
    Runner(Runner),
}

impl Value {
    /// Short human-readable name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Callable(_) => "callable",
            Value::Runner(_) => "runner",
        }
    }

    /// True when this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(num) => Some(*num),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// List payload, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map payload, if any.
    pub fn as_map(&self) -> Option<&Bindings> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Callable payload, if any.
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    /// Runner payload, if any.
    pub fn as_runner(&self) -> Option<&Runner> {
        match self {
            Value::Runner(runner) => Some(runner),
            _ => None,
        }
    }

    /// Consume the value, yielding its map payload if it has one.
    pub fn into_map(self) -> Option<Bindings> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Consume the value, yielding its list payload if it has one.
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Project into JSON. Capability variants have no JSON form and
    /// yield `None`, as does a non-finite float.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(flag) => Some(serde_json::Value::Bool(*flag)),
            Value::Int(num) => Some(serde_json::Value::from(*num)),
            Value::Float(num) => serde_json::Number::from_f64(*num).map(serde_json::Value::Number),
            Value::String(text) => Some(serde_json::Value::String(text.clone())),
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Map(entries) => entries
                .iter()
                .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(serde_json::Value::Object),
            Value::Callable(_) | Value::Runner(_) => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(int) => Value::Int(int),
                None => Value::Float(num.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(num: i64) -> Self {
        Value::Int(num)
    }
}

impl From<i32> for Value {
    fn from(num: i32) -> Self {
        Value::Int(i64::from(num))
    }
}

impl From<f64> for Value {
    fn from(num: f64) -> Self {
        Value::Float(num)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Bindings> for Value {
    fn from(entries: Bindings) -> Self {
        Value::Map(entries)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Callable(callable)
    }
}

impl From<Runner> for Value {
    fn from(runner: Runner) -> Self {
        Value::Runner(runner)
    }
}

/// Build [`Bindings`] from key/value pairs.
pub fn bindings<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Bindings
where
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// An injected function capability.
///
/// Callables enter the engine from outside (an expression compiler, a
/// host binding) and are carried through frames untouched by value
/// resolution.
#[derive(Clone)]
pub struct Callable {
    func: CallableFn,
}

impl Callable {
    /// Wrap a closure as a callable capability.
    pub fn new(func: impl Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
        }
    }

    /// Invoke with positional arguments.
    pub fn invoke(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<callable>")
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

/// The recursive program-execution capability.
///
/// The run loop binds one of these under `@runner` before dispatching
/// aspects; sequence aspects use it to execute their steps under the
/// hosting language without depending on the program module.
#[derive(Clone)]
pub struct Runner {
    func: RunnerFn,
}

impl Runner {
    /// Wrap a closure as a runner capability.
    pub fn new(
        func: impl Fn(&Value, &Frame) -> Result<Frame, EngineError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Arc::new(func),
        }
    }

    /// Execute sub-program data against a frame.
    pub fn run(&self, data: &Value, frame: &Frame) -> Result<Frame, EngineError> {
        (self.func)(data, frame)
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<runner>")
    }
}

impl PartialEq for Runner {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}
