//! Language derivation through the public API: table precedence,
//! execution order, and invariants over arbitrary grammars.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::json;
use weft::{AspectRef, EngineError, Frame, Grammar, Language, Value, aspect, bindings};

fn noop(key: &str) -> AspectRef {
    aspect(key, |_, frame| Ok(frame))
}

fn marker(key: &str, binding: &str) -> AspectRef {
    let binding = binding.to_string();
    aspect(key, move |_, frame| {
        Ok(frame.extend_with(bindings([(binding.clone(), true)])))
    })
}

#[test]
fn caller_aspects_override_synthetic_binding_forms() {
    let language = Language::new(
        &["transform", "bind"],
        "bind",
        Grammar::rules([("transform", Grammar::BindingForm)]),
        vec![marker("transform", "caller-won")],
    )
    .unwrap();

    let frame = language
        .aspect("transform")
        .unwrap()
        .apply(Value::from(json!({"local": 1})), Frame::new())
        .unwrap();
    assert_eq!(frame.resolve("caller-won"), Some(Value::Bool(true)));
    // the synthetic scope push did not run
    assert_eq!(frame.resolve("local"), None);
}

#[test]
fn sequence_aspects_override_caller_aspects() {
    let language = Language::new(
        &["steps", "bind"],
        "bind",
        Grammar::rules([("steps", Grammar::sequence_of(Grammar::empty()))]),
        vec![marker("steps", "caller-won")],
    )
    .unwrap();

    // the synthetic sequence survived: it demands a runner, the marker would not
    let err = language
        .aspect("steps")
        .unwrap()
        .apply(Value::List(Vec::new()), Frame::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingRunner));
    // the caller key still occupies its slot in the execution order
    assert_eq!(language.aspect_order().to_vec(), ["steps", "bind"]);
}

#[test]
fn namespaces_run_before_everything_else() {
    let language = Language::new(
        &["config", "emit", "steps", "bind"],
        "bind",
        Grammar::rules([
            ("config", Grammar::Namespace),
            ("steps", Grammar::sequence_of(Grammar::empty())),
        ]),
        vec![noop("emit")],
    )
    .unwrap();
    assert_eq!(
        language.aspect_order().to_vec(),
        ["config", "emit", "steps", "bind"]
    );
}

#[test]
fn duplicate_caller_keys_keep_one_slot_and_the_last_aspect() {
    let language = Language::new(
        &["emit", "bind"],
        "bind",
        Grammar::empty(),
        vec![marker("emit", "first"), marker("emit", "second")],
    )
    .unwrap();
    assert_eq!(language.aspect_order().to_vec(), ["emit", "bind"]);
    let frame = language
        .aspect("emit")
        .unwrap()
        .apply(Value::Null, Frame::new())
        .unwrap();
    assert_eq!(frame.resolve("second"), Some(Value::Bool(true)));
    assert_eq!(frame.resolve("first"), None);
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn dropping_a_binding_key_caller_warns() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || CaptureWriter(Arc::clone(&sink)))
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        Language::new(&["bind"], "bind", Grammar::empty(), vec![noop("bind")]).unwrap();
    });

    let output = String::from_utf8(captured.lock().clone()).unwrap();
    assert!(output.contains("Dropping caller aspect for binding key 'bind'"));
}

fn key() -> impl Strategy<Value = String> {
    "[a-k]{1,3}"
}

fn arbitrary_grammar() -> impl Strategy<Value = Grammar> {
    let markers = prop_oneof![
        Just(Grammar::BindingForm),
        Just(Grammar::ValueReference),
        Just(Grammar::ArgList),
        Just(Grammar::Namespace),
    ];
    markers.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Grammar::sequence_of),
            inner.clone().prop_map(Grammar::list_of),
            prop::collection::btree_map(key(), inner, 0..4).prop_map(Grammar::Rules),
        ]
    })
}

fn rule_keys(grammar: &Grammar, keys: &mut Vec<String>) {
    match grammar {
        Grammar::Rules(rules) => {
            for (key, shape) in rules {
                keys.push(key.clone());
                rule_keys(shape, keys);
            }
        }
        Grammar::SequenceOf(inner) | Grammar::ListOf(inner) => rule_keys(inner, keys),
        _ => {}
    }
}

proptest! {
    #[test]
    fn derived_languages_dispatch_each_ordered_key_exactly_once(
        grammar in arbitrary_grammar(),
    ) {
        let mut keys = Vec::new();
        rule_keys(&grammar, &mut keys);
        let mut allowed: Vec<&str> = keys.iter().map(String::as_str).collect();
        allowed.push("bind");

        let language = Language::new(&allowed, "bind", grammar, Vec::new()).unwrap();

        let mut sorted = language.aspect_order().to_vec();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), language.aspect_order().len());
        for ordered_key in language.aspect_order() {
            prop_assert!(language.aspect(ordered_key).is_some());
        }
        prop_assert!(language.aspect_order().contains(&"bind".to_string()));
    }

    #[test]
    fn derivation_is_deterministic(grammar in arbitrary_grammar()) {
        let mut keys = Vec::new();
        rule_keys(&grammar, &mut keys);
        let mut allowed: Vec<&str> = keys.iter().map(String::as_str).collect();
        allowed.push("bind");

        let first = Language::new(&allowed, "bind", grammar.clone(), Vec::new()).unwrap();
        let second = Language::new(&allowed, "bind", grammar, Vec::new()).unwrap();
        prop_assert_eq!(first.aspect_order(), second.aspect_order());
    }
}
