// ABOUTME: Black-box integration tests driving the interpreter through its
// public API the way the CLI driver does: parse source, evaluate each
// top-level form, inspect the resulting Values.

use aslisp::env::Environment;
use aslisp::value::{cons_iter, Value};
use aslisp::{builtins, eval, parser};
use std::path::PathBuf;
use std::rc::Rc;

fn fresh_env() -> Rc<Environment> {
    let env = Environment::new(PathBuf::from("."));
    builtins::register_all(&env);
    env
}

/// Parses and evaluates every top-level form in `source`, returning the
/// last form's result.
fn run(env: &Rc<Environment>, source: &str) -> Value {
    let forms = parser::parse_program(source).expect("source should parse");
    let mut last = Value::Nil;
    for form in &forms {
        last = eval::eval_top_level(env, form).expect("no quit expected in these scenarios");
    }
    last
}

#[test]
fn arithmetic_and_list_operations() {
    let env = fresh_env();
    assert_eq!(run(&env, "(add 2 3)"), Value::Int(5));
    assert_eq!(run(&env, "(head (cons 1 (cons 2 ())))"), Value::Int(1));

    let tail = run(&env, "(tail (cons 1 (cons 2 ())))");
    let items: Vec<Value> = cons_iter(tail).collect();
    assert_eq!(items, vec![Value::Int(2)]);
}

#[test]
fn closure_free_tail_recursion_handles_large_n_without_overflow() {
    let env = fresh_env();
    run(
        &env,
        "(def count ((n) (if (equal? n 0) done (count (sub n 1)))))",
    );
    assert_eq!(run(&env, "(count 100000)"), Value::symbol("done"));
}

#[test]
fn user_defined_macro_chooses_a_branch_without_evaluating_the_other() {
    let env = fresh_env();
    run(&env, "(def when (0 (c body) (if c body ())))");
    assert_eq!(run(&env, "(when 1 (add 2 3))"), Value::Int(5));
    assert_eq!(run(&env, "(when 0 (add 2 3))"), Value::Nil);
}

#[test]
fn object_get_copy_has_property() {
    let env = fresh_env();
    run(&env, "(def p (object (x 1) (y 2)))");
    assert_eq!(run(&env, "(get-property p x)"), Value::Int(1));
    assert_eq!(run(&env, "(get-property (copy p (x 10)) x)"), Value::Int(10));
    assert_eq!(run(&env, "(has-property? p z)"), Value::Bool(false));
}

#[test]
fn laziness_via_cons_never_forces_an_infinite_tail() {
    let env = fresh_env();
    run(&env, "(def ones ((a) (cons 1 (ones a))))");
    // If the tail were eagerly forced this would never return.
    assert_eq!(run(&env, "(head (ones 0))"), Value::Int(1));
}

#[test]
fn division_by_zero_is_reported_and_yields_nil() {
    let env = fresh_env();
    assert_eq!(run(&env, "(div 1 0)"), Value::Nil);
}

#[test]
fn repl_completeness_detects_single_line_vs_multi_line_forms() {
    assert!(parser::is_complete("(add 1 2)"));
    assert!(!parser::is_complete("(add 1"));
    assert!(!parser::is_complete("(add 1 (sub 2"));
    assert!(parser::is_complete("(add 1 (sub 2 1))"));
}

#[test]
fn repl_completeness_treats_block_comments_as_balanced_spans() {
    // A block comment is itself a balanced-paren span, so depth
    // counting sees it close before the real expression does.
    assert!(parser::is_complete("(; a comment with (nested) parens ;) (add 1 2)"));
    assert!(!parser::is_complete("(; still open"));
}

#[test]
fn backtick_token_can_hold_characters_illegal_in_a_bare_symbol() {
    let env = fresh_env();
    let value = run(&env, "`has a space and (parens)`");
    assert_eq!(value, Value::symbol("has a space and (parens)"));
}

#[test]
fn loading_a_module_binds_its_definitions_into_the_caller() {
    let dir = std::env::temp_dir().join(format!("aslisp-e2e-load-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("greet.asl"), "(def greeting 42)").unwrap();

    let env = Environment::new(dir);
    builtins::register_all(&env);
    run(&env, "(load greet.asl)");
    assert_eq!(env.lookup("greeting"), Some(Value::Int(42)));

    // Loading the same module again is a no-op, not a redefinition error.
    let result = run(&env, "(load greet.asl)");
    assert_eq!(result, Value::Nil);
    assert_eq!(env.lookup("greeting"), Some(Value::Int(42)));
}

#[test]
fn deeply_nested_non_tail_recursion_reports_host_exhaustion_instead_of_crashing() {
    let env = fresh_env();
    run(
        &env,
        "(def deep ((n) (if (equal? n 0) 0 (add 1 (deep (sub n 1))))))",
    );
    // Bound well past the host-exhaustion threshold; must come back as
    // nil, never abort the test process with a stack overflow.
    let result = run(&env, "(deep 100000)");
    assert_eq!(result, Value::Nil);
}
