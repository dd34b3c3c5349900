//! Purpose: Exercise the public `exprport` façade the way a host program would.
//! Role: Integration tests over parse, bind, evaluate, value extraction and callbacks.
//! Invariants: Only public API is used; ownership is checked through observable behavior.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use exprport::{
    Context, Expr, Value, make_bool, make_context, make_float, make_int, make_string, parse,
};

#[test]
fn callback_receives_bound_argument_and_contributes_its_result() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let mut context = make_context();
    assert!(context.set_int("a", 1));
    assert!(context.set_int("b", 2));
    assert!(context.set_string("c", "hello"));
    let counter = Rc::clone(&calls);
    let arguments = Rc::clone(&seen);
    assert!(context.set_function("f", move |value| {
        counter.set(counter.get() + 1);
        let text = value.get_string()?;
        arguments.borrow_mut().push(text.clone());
        Some(make_int(text.len() as i64))
    }));

    let expr = parse("a + b * f(c)").expect("parse");
    assert_eq!(expr.eval_int(&context), Some(11));
    assert_eq!(calls.get(), 1);
    assert_eq!(seen.borrow().as_slice(), ["hello".to_string()]);
}

#[test]
fn tuple_results_extract_in_order() {
    let context = Context::new();
    let value = parse("(1, 2, 3)")
        .and_then(|expr| expr.eval_value(&context))
        .expect("tuple value");
    let items: Vec<i64> = value
        .get_tuple()
        .expect("tuple")
        .iter()
        .map(|item| item.get_int().expect("int element"))
        .collect();
    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(value.get_int(), None);
}

#[test]
fn nested_tuples_keep_their_shape() {
    let context = Context::new();
    let value = parse("(1, (\"x\", true))")
        .and_then(|expr| expr.eval_value(&context))
        .expect("tuple value");
    let outer = value.get_tuple().expect("outer tuple");
    assert_eq!(outer.len(), 2);
    assert_eq!(outer[0].get_int(), Some(1));
    let inner = outer[1].get_tuple().expect("inner tuple");
    assert_eq!(inner[0].get_string().as_deref(), Some("x"));
    assert_eq!(inner[1].get_bool(), Some(true));
}

#[test]
fn typed_accessors_fail_on_other_variants() {
    let value = make_bool(true);
    assert_eq!(value.get_bool(), Some(true));
    assert_eq!(value.get_int(), None);
    assert_eq!(value.get_float(), None);
    assert_eq!(value.get_string(), None);
    assert!(value.get_tuple().is_none());

    assert_eq!(make_float(2.5).get_float(), Some(2.5));
    assert_eq!(make_string("héllo").get_string().as_deref(), Some("héllo"));
}

#[test]
fn malformed_expressions_do_not_parse() {
    for text in ["", "(1 + 2", "1 +* * 2)"] {
        assert!(Expr::parse(text).is_none(), "{text:?} should not parse");
    }
}

#[test]
fn overwriting_a_binding_changes_the_result() {
    let mut context = Context::new();
    let expr = parse("x + 1").expect("parse");
    assert!(context.set_float("x", 1.0));
    assert_eq!(expr.eval_float(&context), Some(2.0));
    assert!(context.set_float("x", 4.5));
    assert_eq!(expr.eval_float(&context), Some(5.5));
}

#[test]
fn bound_values_are_visible_through_get_value() {
    let mut context = Context::new();
    assert!(context.set_value("flag", Value::from(true)));
    assert!(context.set_value("label", Value::from("ready")));
    let flag = context.get_value("flag").and_then(|v| v.get_bool());
    assert_eq!(flag, Some(true));
    let label = context.get_value("label").and_then(|v| v.get_string());
    assert_eq!(label.as_deref(), Some("ready"));
    assert!(context.get_value("absent").is_none());
}

#[test]
fn declining_callback_fails_the_whole_evaluation() {
    let mut context = Context::new();
    assert!(context.set_function("only_strings", |value| {
        value.get_string().map(|text| make_int(text.len() as i64))
    }));
    let expr = parse("1 + only_strings(2)").expect("parse");
    assert_eq!(expr.eval_int(&context), None);
}

#[test]
fn panicking_callback_fails_the_evaluation_and_the_context_stays_usable() {
    let mut context = Context::new();
    assert!(context.set_function("boom", |_| panic!("host bug")));
    assert!(context.set_int("n", 3));
    assert_eq!(parse("boom(1)").and_then(|e| e.eval_int(&context)), None);
    assert_eq!(parse("n * n").and_then(|e| e.eval_int(&context)), Some(9));
}

#[test]
fn multi_argument_calls_arrive_as_one_tuple() {
    let mut context = Context::new();
    assert!(context.set_function("sum", |value| {
        let items = value.get_tuple()?;
        let mut total = 0;
        for item in &items {
            total += item.get_int()?;
        }
        Some(make_int(total))
    }));
    assert_eq!(
        parse("sum(1, 2, 3)").and_then(|e| e.eval_int(&context)),
        Some(6)
    );
}

#[test]
fn callback_state_is_released_with_its_context() {
    let state = Rc::new(Cell::new(0));
    {
        let mut context = Context::new();
        let held = Rc::clone(&state);
        assert!(context.set_function("g", move |_| {
            held.set(held.get() + 1);
            Some(make_int(held.get()))
        }));
        assert_eq!(
            parse("g(0) + g(0)").and_then(|e| e.eval_int(&context)),
            Some(3)
        );
        assert_eq!(Rc::strong_count(&state), 2);
    }
    assert_eq!(Rc::strong_count(&state), 1);
    assert_eq!(state.get(), 2);
}

#[test]
fn one_expression_evaluates_against_many_contexts() {
    let expr = parse("base * 2").expect("parse");
    let mut small = Context::new();
    let mut large = Context::new();
    assert!(small.set_int("base", 2));
    assert!(large.set_int("base", 1_000));
    assert_eq!(expr.eval_int(&small), Some(4));
    assert_eq!(expr.eval_int(&large), Some(2_000));
}

#[test]
fn debug_strings_describe_handles() {
    let expr = parse("a && b").expect("parse");
    let mut context = Context::new();
    assert!(context.set_bool("a", true));
    assert!(!expr.debug_string().is_empty());
    assert!(format!("{context:?}").contains('a'));
    assert!(!format!("{:?}", make_int(7)).is_empty());
}
