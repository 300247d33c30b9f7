//! Grammar trees describing a language's program shape
//!
//! A grammar does two jobs. It documents what well-formed program data
//! looks like, and it drives derivation: marker shapes at rule
//! positions ([`Grammar::BindingForm`], [`Grammar::SequenceOf`],
//! [`Grammar::Namespace`]) each give rise to a synthetic aspect when a
//! [`Language`](crate::engine::language::Language) is built over the
//! grammar. The purely descriptive shapes derive nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shape of one position in program data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Grammar {
    /// The value is a map of bindings pushed as a child scope.
    BindingForm,
    /// The value references an existing binding. Descriptive only.
    ValueReference,
    /// The value is an ordered list of parameter names. Descriptive only.
    ArgList,
    /// The value is exposed verbatim under a synthesized `@<key>` binding.
    Namespace,
    /// The value is an ordered list of sub-programs, each executed
    /// through the runner bound in the frame.
    SequenceOf(Box<Grammar>),
    /// The value is a plain list of the inner shape. Derives nothing
    /// itself, but its inner shape is still walked.
    ListOf(Box<Grammar>),
    /// Nested rules keyed by program-data key.
    Rules(BTreeMap<String, Grammar>),
}

impl Grammar {
    /// An empty rule set.
    pub fn empty() -> Self {
        Grammar::Rules(BTreeMap::new())
    }

    /// Build a rule set from key/shape pairs.
    pub fn rules<K: Into<String>>(entries: impl IntoIterator<Item = (K, Grammar)>) -> Self {
        Grammar::Rules(
            entries
                .into_iter()
                .map(|(key, shape)| (key.into(), shape))
                .collect(),
        )
    }

    /// Wrap a shape as an executable sequence.
    pub fn sequence_of(inner: Grammar) -> Self {
        Grammar::SequenceOf(Box::new(inner))
    }

    /// Wrap a shape as a plain list.
    pub fn list_of(inner: Grammar) -> Self {
        Grammar::ListOf(Box::new(inner))
    }
}

/// Marker keys collected from a grammar in one walk.
///
/// Each vector holds first occurrences in walk order: rule sets are
/// visited in key order, outer rules before the rules nested inside
/// their shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DerivedKeys {
    /// Keys whose shape is `SequenceOf`.
    pub sequences: Vec<String>,
    /// Keys whose shape is `BindingForm`.
    pub binding_forms: Vec<String>,
    /// Keys whose shape is `Namespace`.
    pub namespaces: Vec<String>,
}

impl DerivedKeys {
    /// Walk the grammar and collect every marker key.
    pub(crate) fn collect(grammar: &Grammar) -> Self {
        let mut derived = DerivedKeys::default();
        derived.walk(grammar);
        derived
    }

    /// Every collected key, role notwithstanding.
    pub(crate) fn all_keys(&self) -> impl Iterator<Item = &String> {
        self.sequences
            .iter()
            .chain(self.binding_forms.iter())
            .chain(self.namespaces.iter())
    }

    fn walk(&mut self, grammar: &Grammar) {
        match grammar {
            Grammar::Rules(rules) => {
                for (key, shape) in rules {
                    match shape {
                        Grammar::BindingForm => push_unique(&mut self.binding_forms, key),
                        Grammar::Namespace => push_unique(&mut self.namespaces, key),
                        Grammar::SequenceOf(inner) => {
                            push_unique(&mut self.sequences, key);
                            self.walk(inner);
                        }
                        Grammar::ListOf(inner) => self.walk(inner),
                        Grammar::Rules(_) => self.walk(shape),
                        Grammar::ValueReference | Grammar::ArgList => {}
                    }
                }
            }
            Grammar::SequenceOf(inner) | Grammar::ListOf(inner) => self.walk(inner),
            _ => {}
        }
    }
}

/// Append `key` unless an equal entry is already present.
pub(crate) fn push_unique(keys: &mut Vec<String>, key: &str) {
    if !keys.iter().any(|existing| existing == key) {
        keys.push(key.to_string());
    }
}
