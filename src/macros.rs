//! Macro definitions and the language they are written in.
//!
//! A macro is a named rewrite: argument names plus a template body that
//! replaces uses of the macro's key in program data. Expansion itself
//! is a host concern behind [`MacroExpander`]; this module fixes the
//! definition shape and builds the little language macro definitions
//! are themselves written in.

use crate::engine::error::Result;
use crate::engine::grammar::Grammar;
use crate::engine::language::Language;
use crate::engine::value::{Bindings, Value};

/// Keys every macro-definition language understands, the binding key
/// aside.
pub const MACRO_KEYS: [&str; 4] = ["args", "defaults", "methods", "body"];

/// A reusable rewrite pattern: named arguments plus a template body.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    /// Key the macro claims in a widened language.
    pub key: String,
    /// Ordered argument names.
    pub args: Vec<String>,
    /// Fallback values for arguments a use site omits.
    pub defaults: Bindings,
    /// Template body substituted at each use site.
    pub body: Bindings,
}

impl Macro {
    /// Build a macro definition with no defaults.
    pub fn new(key: impl Into<String>, args: &[&str], body: Bindings) -> Self {
        Self {
            key: key.into(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
            defaults: Bindings::new(),
            body,
        }
    }

    /// The same definition with fallback argument values.
    pub fn with_defaults(mut self, defaults: Bindings) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Expands macro uses inside program data into plain program data.
///
/// Implementations rewrite a program before it runs; the engine never
/// expands macros on its own.
pub trait MacroExpander {
    /// Expand every use of `definition` inside `data`, returning the
    /// rewritten program data.
    fn expand(&self, definition: &Macro, data: &Value) -> Result<Value>;
}

/// The language macro definitions are written in.
///
/// `args` is an argument list, `defaults` a list of records, and the
/// binding key introduces local bindings exactly as in any other
/// language. A host that accepts macros runs definition programs under
/// this language before widening the target language with the macro
/// keys (see [`Language::with_keys`]).
pub fn macro_language(binding_key: &str) -> Result<Language> {
    let mut allowed: Vec<&str> = MACRO_KEYS.to_vec();
    allowed.push(binding_key);
    let grammar = Grammar::rules([
        (binding_key, Grammar::BindingForm),
        ("args", Grammar::ArgList),
        ("defaults", Grammar::list_of(Grammar::empty())),
        ("body", Grammar::ValueReference),
    ]);
    Language::new(&allowed, binding_key, grammar, Vec::new())
}
