//! Language construction and aspect derivation
//!
//! A [`Language`] is the fixed contract a program is read under: the
//! keys it may use, the binding key that introduces local scopes, a
//! grammar describing its shape, and a dispatch table of aspects. The
//! table and the execution order are both derived here, once, at
//! construction; running a program never re-derives anything.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::anyhow;

use crate::engine::aspect::{AspectRef, aspect};
use crate::engine::error::{EngineError, Result};
use crate::engine::grammar::{DerivedKeys, Grammar, push_unique};
use crate::engine::program::RUNNER_KEY;
use crate::engine::value::{Value, bindings};

/// An immutable little language: allowed keys, binding key, grammar,
/// and the derived aspect table with its execution order.
#[derive(Clone)]
pub struct Language {
    allowed_keys: Vec<String>,
    binding_key: String,
    grammar: Grammar,
    aspects: BTreeMap<String, AspectRef>,
    aspect_order: Vec<String>,
}

impl Language {
    /// Derive a language from its parts.
    ///
    /// The aspect table is assembled from four sources, in insertion
    /// order so that later sources win a key collision: namespace
    /// aspects, binding-form aspects (the binding key always gets one),
    /// caller-supplied aspects, then sequence aspects. The execution
    /// order concatenates namespace, caller, sequence, and binding-form
    /// keys, first occurrence winning.
    ///
    /// A caller aspect claiming the binding key is dropped with a
    /// warning; the synthetic scope-pushing aspect is not overridable.
    /// The binding key, every grammar key, and every caller key must be
    /// declared in `allowed_keys`; any that is not fails with
    /// [`EngineError::UndeclaredKey`].
    pub fn new(
        allowed_keys: &[&str],
        binding_key: impl Into<String>,
        grammar: Grammar,
        aspects: Vec<AspectRef>,
    ) -> Result<Self> {
        let binding_key = binding_key.into();
        let allowed: Vec<String> = allowed_keys.iter().map(|key| (*key).to_string()).collect();
        if !allowed.contains(&binding_key) {
            return Err(EngineError::UndeclaredKey(binding_key));
        }

        let derived = DerivedKeys::collect(&grammar);
        for key in derived.all_keys() {
            if !allowed.contains(key) {
                return Err(EngineError::UndeclaredKey(key.clone()));
            }
        }

        let mut binding_form_keys = vec![binding_key.clone()];
        for key in &derived.binding_forms {
            push_unique(&mut binding_form_keys, key);
        }

        let mut table: BTreeMap<String, AspectRef> = BTreeMap::new();
        for key in &derived.namespaces {
            table.insert(key.clone(), namespace_aspect(key));
        }
        for key in &binding_form_keys {
            table.insert(key.clone(), binding_form_aspect(key));
        }

        let mut caller_keys: Vec<String> = Vec::new();
        for supplied in aspects {
            let key = supplied.key().to_string();
            if key == binding_key {
                tracing::warn!("Dropping caller aspect for binding key '{}'", key);
                continue;
            }
            if !allowed.contains(&key) {
                return Err(EngineError::UndeclaredKey(key));
            }
            push_unique(&mut caller_keys, &key);
            table.insert(key, supplied);
        }

        for key in &derived.sequences {
            table.insert(key.clone(), sequence_aspect(key));
        }

        let mut aspect_order: Vec<String> = Vec::new();
        for key in derived
            .namespaces
            .iter()
            .chain(caller_keys.iter())
            .chain(derived.sequences.iter())
            .chain(binding_form_keys.iter())
        {
            push_unique(&mut aspect_order, key);
        }

        Ok(Self {
            allowed_keys: allowed,
            binding_key,
            grammar,
            aspects: table,
            aspect_order,
        })
    }

    /// Keys programs in this language may use.
    pub fn allowed_keys(&self) -> &[String] {
        &self.allowed_keys
    }

    /// The key that introduces local bindings.
    pub fn binding_key(&self) -> &str {
        &self.binding_key
    }

    /// The grammar this language was derived from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Aspect keys in execution order.
    pub fn aspect_order(&self) -> &[String] {
        &self.aspect_order
    }

    /// Look up the aspect registered for a key.
    pub fn aspect(&self, key: &str) -> Option<&AspectRef> {
        self.aspects.get(key)
    }

    /// Aspects in execution order.
    pub fn aspects(&self) -> impl Iterator<Item = (&str, &AspectRef)> {
        self.aspect_order
            .iter()
            .filter_map(|key| self.aspects.get(key).map(|entry| (key.as_str(), entry)))
    }

    /// A copy of this language whose allowed-key set is widened.
    ///
    /// Dispatch is unchanged; the extra keys only make richer program
    /// data legal, for callers that rewrite programs before running
    /// them.
    pub fn with_keys(&self, keys: &[&str]) -> Language {
        let mut extended = self.clone();
        for key in keys {
            push_unique(&mut extended.allowed_keys, key);
        }
        extended
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("allowed_keys", &self.allowed_keys)
            .field("binding_key", &self.binding_key)
            .field("aspect_order", &self.aspect_order)
            .finish_non_exhaustive()
    }
}

/// Synthetic aspect for a binding-form key: the value (a map of
/// bindings) becomes a new child scope.
fn binding_form_aspect(key: &str) -> AspectRef {
    let key = key.to_string();
    aspect(key.clone(), move |value, frame| {
        let kind = value.kind();
        let locals = value
            .into_map()
            .ok_or_else(|| anyhow!("Binding form '{}' expects a map, got {}", key, kind))?;
        Ok(frame.extend_with(locals))
    })
}

/// Synthetic aspect for a namespace key: the whole value is bound
/// verbatim under `@<key>` in a new child scope.
fn namespace_aspect(key: &str) -> AspectRef {
    let namespaced = format!("@{key}");
    aspect(key, move |value, frame| {
        Ok(frame.extend_with(bindings([(namespaced.clone(), value)])))
    })
}

/// Synthetic aspect for a sequence key: each element is handed to the
/// runner bound under `@runner`, threading the frame from step to step.
fn sequence_aspect(key: &str) -> AspectRef {
    let key = key.to_string();
    aspect(key.clone(), move |value, frame| {
        let runner = match frame.resolve(RUNNER_KEY) {
            Some(Value::Runner(runner)) => runner,
            _ => return Err(EngineError::MissingRunner),
        };
        let steps = match value {
            Value::List(items) => items,
            other => {
                let report = anyhow!("Sequence '{}' expects a list, got {}", key, other.kind());
                return Err(report.into());
            }
        };
        let mut current = frame;
        for step in &steps {
            current = runner.run(step, &current)?;
        }
        Ok(current)
    })
}
