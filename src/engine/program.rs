//! Programs and the run loop
//!
//! A [`Program`] pairs raw program data with the [`Language`] it is to
//! be read under. Running it walks the language's aspect order: for
//! each key the program data actually carries, the value is resolved
//! against the current frame and handed to that key's aspect, and the
//! frame the aspect returns feeds the next one. Keys absent from the
//! data are skipped.
//!
//! Before the walk starts the frame is extended with a [`Runner`]
//! bound under [`RUNNER_KEY`]. The runner closes over the language, so
//! sequence aspects can execute their steps as sub-programs without a
//! dependency back into this module.

use crate::engine::error::Result;
use crate::engine::frame::{Frame, resolve_value};
use crate::engine::language::Language;
use crate::engine::value::{Runner, Value, bindings};

/// Reserved frame key under which the run loop binds the runner.
pub const RUNNER_KEY: &str = "@runner";

/// Program data paired with the language it is interpreted under.
#[derive(Debug, Clone)]
pub struct Program {
    language: Language,
    data: Value,
}

impl Program {
    /// Pair program data with a language.
    ///
    /// No validation happens here; unknown keys are simply never
    /// dispatched, and malformed values surface as aspect errors at run
    /// time.
    pub fn new(data: impl Into<Value>, language: Language) -> Self {
        Self {
            language,
            data: data.into(),
        }
    }

    /// The raw program data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The language this program is read under.
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Execute the program against a frame and return the final frame.
    ///
    /// The input frame itself is never mutated; the runner and every
    /// binding form extend the chain instead. Results land either in
    /// the returned frame's chain or, via `provide`, in frames the
    /// caller already holds.
    pub fn run(&self, frame: &Frame) -> Result<Frame> {
        let language = self.language.clone();
        let runner = Runner::new(move |data, frame| {
            Program::new(data.clone(), language.clone()).run(frame)
        });
        let mut current = frame.extend_with(bindings([(RUNNER_KEY, Value::Runner(runner))]));

        for (key, entry) in self.language.aspects() {
            let Some(raw) = self.data.as_map().and_then(|data| data.get(key)) else {
                continue;
            };
            tracing::trace!("Applying aspect '{}'", key);
            let resolved = resolve_value(raw, &current);
            current = entry.apply(resolved, current)?;
        }
        Ok(current)
    }
}

/// Run a program against a frame.
pub fn run(program: &Program, frame: &Frame) -> Result<Frame> {
    program.run(frame)
}
