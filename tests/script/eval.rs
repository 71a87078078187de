//! Pure evaluation: literals, special forms, natives, scoping.

use thistle_foundation::{ErrorKind, Result, Value};
use thistle_script::{Env, Interpreter, NullHost};

fn eval(source: &str) -> Result<Value> {
    let mut host = NullHost;
    let mut env = Env::new();
    Interpreter::new(&mut host).eval_source(source, &mut env)
}

// =============================================================================
// Literals and natives
// =============================================================================

#[test]
fn arithmetic_nests() {
    assert_eq!(eval("(+ 1 (* 2 3))").unwrap(), Value::Int(7));
    assert_eq!(eval("(- 10 (/ 9 3))").unwrap(), Value::Int(7));
}

#[test]
fn string_natives_compose() {
    assert_eq!(
        eval("(upper (str \"th\" \"istle\"))").unwrap(),
        Value::from("THISTLE")
    );
    assert_eq!(eval("(len \"four\")").unwrap(), Value::Int(4));
}

#[test]
fn vectors_evaluate_elementwise() {
    let result = eval("(nth [1 (+ 1 1) 3] 1)").unwrap();
    assert_eq!(result, Value::Int(2));
}

#[test]
fn keywords_evaluate_to_their_name() {
    assert_eq!(eval(":health").unwrap(), Value::from("health"));
}

#[test]
fn multiple_forms_return_the_last() {
    assert_eq!(eval("1 2 3").unwrap(), Value::Int(3));
}

// =============================================================================
// Special forms
// =============================================================================

#[test]
fn if_takes_the_right_branch() {
    assert_eq!(eval("(if (> 2 1) \"yes\" \"no\")").unwrap(), Value::from("yes"));
    assert_eq!(eval("(if (< 2 1) \"yes\" \"no\")").unwrap(), Value::from("no"));
    assert_eq!(eval("(if false \"yes\")").unwrap(), Value::Nil);
}

#[test]
fn when_runs_its_body_in_order() {
    assert_eq!(eval("(when true 1 2 3)").unwrap(), Value::Int(3));
    assert_eq!(eval("(when false 1 2 3)").unwrap(), Value::Nil);
}

#[test]
fn let_bindings_scope_and_shadow() {
    assert_eq!(eval("(let [x 2 y (* x x)] (+ x y))").unwrap(), Value::Int(6));
    // Inner binding must not leak.
    let err = eval("(do (let [x 1] x) x)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
}

#[test]
fn and_or_short_circuit() {
    // The world-touching call would fail against NullHost; short circuit
    // means it is never reached.
    assert_eq!(eval("(and false (say \"boom\"))").unwrap(), Value::Bool(false));
    assert_eq!(eval("(or 7 (say \"boom\"))").unwrap(), Value::Int(7));
    assert_eq!(eval("(or false nil)").unwrap(), Value::Nil);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn undefined_symbol_is_reported() {
    let err = eval("(+ 1 missing)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(ref name) if name == "missing"));
}

#[test]
fn world_builtins_fail_without_a_host() {
    let err = eval("(get #1 \"name\")").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReferenceFailure(_)));
}

#[test]
fn arithmetic_edge_cases_error_cleanly() {
    let err = eval("(/)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));
    let err = eval("(/ 1 0)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
    // Remainder overflow must surface as an error, not a panic.
    assert!(eval("(rem -9223372036854775808 -1)").is_err());
}

#[test]
fn unbalanced_input_is_a_parse_error() {
    let err = eval("(+ 1 2").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
}

// =============================================================================
// Robustness
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary printable input may fail to parse or evaluate, but
        /// must never panic.
        #[test]
        fn arbitrary_input_never_panics(source in "[ -~]{0,64}") {
            let _ = eval(&source);
        }

        #[test]
        fn integer_addition_matches_rust(a in -1000i64..1000, b in -1000i64..1000) {
            let result = eval(&format!("(+ {a} {b})")).unwrap();
            prop_assert_eq!(result, Value::Int(a + b));
        }
    }
}
