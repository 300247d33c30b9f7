//! Chained binding environments
//!
//! A [`Frame`] is one scope in a parent-linked chain. Reads walk the
//! chain from the youngest frame outward; writes land in exactly one
//! frame. Handles are cheap to clone and share, so a parent frame stays
//! alive and observable for as long as any descendant holds on to it.
//!
//! Bindings are replaced wholesale rather than edited in place: `bind`
//! and `provide` build the next binding map and swap it in under the
//! frame's lock. Readers therefore always see a complete map, never a
//! half-applied update.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::error::{FrameError, FrameResult};
use crate::engine::value::{Bindings, Value};

/// One scope in a parent-linked chain of bindings.
#[derive(Clone)]
pub struct Frame {
    inner: Arc<FrameInner>,
}

struct FrameInner {
    parent: Option<Frame>,
    bindings: RwLock<Bindings>,
}

impl Frame {
    /// A root frame with no bindings and no parent.
    pub fn new() -> Self {
        Self::with_bindings(Bindings::new())
    }

    /// A root frame seeded with the given bindings.
    pub fn with_bindings(bindings: Bindings) -> Self {
        Self {
            inner: Arc::new(FrameInner {
                parent: None,
                bindings: RwLock::new(bindings),
            }),
        }
    }

    /// Resolve a dot-separated path, falling back to the parent chain.
    ///
    /// The fallback applies per full path: a frame that binds `a` but
    /// not `a.b.c` does not shadow an ancestor that binds the whole
    /// path.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut frame = self;
        loop {
            {
                let bindings = frame.inner.bindings.read();
                if let Some(value) = get_path(&bindings, &segments) {
                    return Some(value.clone());
                }
            }
            frame = frame.inner.parent.as_ref()?;
        }
    }

    /// Resolve a path or fail with [`FrameError::UnresolvedReference`].
    pub fn resolve_required(&self, path: &str) -> FrameResult<Value> {
        self.resolve(path)
            .ok_or_else(|| FrameError::UnresolvedReference(path.to_string()))
    }

    /// Merge bindings into this frame, shallowly per top-level key, and
    /// return the same frame for chaining.
    ///
    /// An incoming key replaces the local key outright; nested maps are
    /// not merged. Ancestors are never touched.
    pub fn bind(&self, bindings: Bindings) -> Frame {
        {
            let mut local = self.inner.bindings.write();
            let mut next = local.clone();
            next.extend(bindings);
            *local = next;
        }
        self.clone()
    }

    /// Push an empty child scope whose parent is this frame.
    pub fn extend(&self) -> Frame {
        self.extend_with(Bindings::new())
    }

    /// Push a child scope seeded with the given bindings.
    pub fn extend_with(&self, bindings: Bindings) -> Frame {
        Frame {
            inner: Arc::new(FrameInner {
                parent: Some(self.clone()),
                bindings: RwLock::new(bindings),
            }),
        }
    }

    /// The parent scope, if this frame has one.
    pub fn parent(&self) -> Option<Frame> {
        self.inner.parent.clone()
    }

    /// Number of frames in the chain, this one included.
    pub fn depth(&self) -> usize {
        match &self.inner.parent {
            Some(parent) => parent.depth() + 1,
            None => 1,
        }
    }

    /// Write a value at an existing path, targeting the nearest frame
    /// that owns the path.
    ///
    /// `provide` updates, it never creates: when no frame in the chain
    /// owns the path the chain is left untouched and
    /// [`FrameError::PathNotFound`] is returned. The owning frame swaps
    /// in a rebuilt binding map, so every holder of that frame observes
    /// the update.
    pub fn provide(&self, path: &str, value: Value) -> FrameResult<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut frame = self;
        loop {
            {
                let mut bindings = frame.inner.bindings.write();
                if contains_path(&bindings, &segments) {
                    let mut next = bindings.clone();
                    set_path(&mut next, &segments, value);
                    *bindings = next;
                    return Ok(());
                }
            }
            match &frame.inner.parent {
                Some(parent) => frame = parent,
                None => return Err(FrameError::PathNotFound(path.to_string())),
            }
        }
    }

    /// Flatten the chain into one binding map, deep-merging from the
    /// root down so that younger frames win per leaf.
    pub fn value(&self) -> Bindings {
        let mut merged = match &self.inner.parent {
            Some(parent) => parent.value(),
            None => Bindings::new(),
        };
        merge_deep(&mut merged, &self.inner.bindings.read());
        merged
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.inner.bindings.read().keys().cloned().collect();
        f.debug_struct("Frame")
            .field("depth", &self.depth())
            .field("local_keys", &keys)
            .finish()
    }
}

/// Resolve reference strings inside a value against a frame.
///
/// Strings are treated as paths; a string no frame binds stays as the
/// literal it was. Lists and maps are resolved element-wise, one level
/// of substitution only. Every other variant passes through untouched.
pub fn resolve_value(value: &Value, frame: &Frame) -> Value {
    match value {
        Value::String(path) => frame.resolve(path).unwrap_or_else(|| value.clone()),
        Value::List(items) => {
            Value::List(items.iter().map(|item| resolve_value(item, frame)).collect())
        }
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), resolve_value(item, frame)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn get_path<'a>(bindings: &'a Bindings, segments: &[&str]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = bindings.get(*first)?;
    for segment in rest {
        match current {
            Value::Map(entries) => current = entries.get(*segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn contains_path(bindings: &Bindings, segments: &[&str]) -> bool {
    get_path(bindings, segments).is_some()
}

/// Replace the value at `segments`. Returns false when an intermediate
/// segment is missing or not a map; the map is unchanged in that case.
fn set_path(bindings: &mut Bindings, segments: &[&str], value: Value) -> bool {
    match segments {
        [] => false,
        [leaf] => {
            bindings.insert((*leaf).to_string(), value);
            true
        }
        [head, rest @ ..] => match bindings.get_mut(*head) {
            Some(Value::Map(entries)) => set_path(entries, rest, value),
            _ => false,
        },
    }
}

fn merge_deep(into: &mut Bindings, from: &Bindings) {
    for (key, value) in from {
        let merged_nested = match (into.get_mut(key), value) {
            (Some(Value::Map(existing)), Value::Map(incoming)) => {
                merge_deep(existing, incoming);
                true
            }
            _ => false,
        };
        if !merged_nested {
            into.insert(key.clone(), value.clone());
        }
    }
}
