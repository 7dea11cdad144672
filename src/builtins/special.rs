//! Special forms and REPL/top-level-only operators: def, q, if, eval,
//! load, help, restart, quit.
//!
//! `if` and `eval` are also intercepted directly inside the macro
//! rewriter (`crate::macros::resolve`) so that they rewrite in tail
//! position instead of growing the host stack; the implementations
//! here are the ordinary-dispatch fallback used when one appears in a
//! non-tail position (e.g. as an argument to another call).

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{cons_iter, BuiltinDispatch, Value};
use std::rc::Rc;

/// True iff `value_expr` should be bound to `name` as-is rather than
/// evaluated: a macro literal's leading `0` marker can never denote a
/// callable, so `(0 params body)` is unambiguous. A function literal
/// `(params body)` is ambiguous with an ordinary call of the same
/// length, so it is only treated as data when its head isn't a name
/// already bound to something — i.e. `params` is a fresh parameter
/// name or spec list, not a reference to an existing function.
fn is_self_quoting_literal(env: &Rc<Environment>, value_expr: &Value) -> bool {
    if crate::macros::is_macro(value_expr) {
        return true;
    }
    if !crate::macros::is_function(value_expr) {
        return false;
    }
    match value_expr {
        Value::Cons(cell) => match &cell.head {
            Value::Symbol(name) => !env.is_global(name),
            _ => true,
        },
        _ => false,
    }
}

pub fn builtin_def(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let name_expr = parts.next().ok_or_else(|| EvalError::arity_exact("def", 2, 0))?;
    let value_expr = parts.next().ok_or_else(|| EvalError::arity_exact("def", 2, 1))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("def", 2, 3));
    }
    let name = name_expr
        .text()
        .ok_or_else(|| EvalError::type_error(format!("def requires a name, not {}", name_expr.type_name())))?
        .to_string();
    let value = if is_self_quoting_literal(env, &value_expr) {
        value_expr
    } else {
        crate::eval::eval(env, &value_expr, false)?
    };
    env.define_global(&name, value.clone())?;
    Ok(value)
}

pub fn builtin_q(_env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let quoted = parts.next().ok_or_else(|| EvalError::arity_exact("q", 1, 0))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("q", 1, 2));
    }
    Ok(quoted)
}

pub fn builtin_if(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let cond = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 0))?;
    let then_branch = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 1))?;
    let else_branch = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 2))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("if", 3, 4));
    }
    let cond_val = crate::eval::eval(env, &cond, false)?;
    let chosen = if cond_val.truthy() { then_branch } else { else_branch };
    crate::eval::eval(env, &chosen, false)
}

pub fn builtin_eval(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let arg = parts.next().ok_or_else(|| EvalError::arity_exact("eval", 1, 0))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_at_most("eval", 1, 2));
    }
    let code = crate::eval::eval(env, &arg, false)?;
    crate::eval::eval(env, &code, false)
}

pub fn builtin_load(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let path_expr = parts.next().ok_or_else(|| EvalError::arity_exact("load", 1, 0))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("load", 1, 2));
    }
    let path_val = crate::eval::eval(env, &path_expr, false)?;
    let path_text = path_val
        .text()
        .ok_or_else(|| EvalError::type_error(format!("cannot load {}", path_val.type_name())))?
        .to_string();
    crate::loader::load(env, &path_text)
}

pub fn builtin_help(args: &[Value]) -> Result<Value, EvalError> {
    match args.first() {
        Some(v) => {
            if let Some(name) = v.text() {
                if let Some(entry) = crate::help::get_help(name) {
                    println!("{}", crate::help::format_help_entry(&entry));
                } else {
                    println!("No help entry for {name}");
                }
            }
        }
        None => println!("{}", crate::help::format_quick_reference()),
    }
    Ok(Value::Nil)
}

pub fn builtin_restart(env: &Rc<Environment>, _raw_args: Value) -> Result<Value, EvalError> {
    env.clear_global();
    crate::builtins::register_all(env);
    Ok(Value::Nil)
}

pub fn builtin_quit(_args: &[Value]) -> Result<Value, EvalError> {
    Err(EvalError::UserQuit)
}

pub fn register(env: &Rc<Environment>) {
    super::define_macro(env, "def", BuiltinDispatch::Macro(builtin_def), 2, Some(2), true, false);
    super::define_macro(env, "q", BuiltinDispatch::Macro(builtin_q), 1, Some(1), false, false);
    super::define_macro(env, "if", BuiltinDispatch::Macro(builtin_if), 3, Some(3), false, false);
    super::define_macro(env, "eval", BuiltinDispatch::Macro(builtin_eval), 1, Some(1), false, false);
    super::define_macro(env, "load", BuiltinDispatch::Macro(builtin_load), 1, Some(1), true, false);
    super::define_function(env, "help", BuiltinDispatch::Function(builtin_help), 0, Some(1));
    super::set_repl_only(env, "help");
    super::define_macro(env, "restart", BuiltinDispatch::Macro(builtin_restart), 0, Some(0), false, true);
    super::define_function(env, "quit", BuiltinDispatch::Function(builtin_quit), 0, Some(0));
    super::set_repl_only(env, "quit");

    crate::help::register_help(crate::help::HelpEntry {
        name: "def".to_string(),
        signature: "(def name value)".to_string(),
        description: "Binds name to value in the global frame. Redefining an existing name is an error.".to_string(),
        examples: vec!["(def x 1)".to_string()],
        related: vec![],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "q".to_string(),
        signature: "(q expression)".to_string(),
        description: "Returns expression unevaluated.".to_string(),
        examples: vec!["(q (add 1 2)) => (add 1 2)".to_string()],
        related: vec!["eval".to_string()],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "if".to_string(),
        signature: "(if condition then else)".to_string(),
        description: "Evaluates condition; evaluates and returns then if truthy, else otherwise. Only the chosen branch is evaluated.".to_string(),
        examples: vec!["(if true 1 2) => 1".to_string()],
        related: vec![],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "eval".to_string(),
        signature: "(eval expression)".to_string(),
        description: "Evaluates expression, then evaluates the result again as code.".to_string(),
        examples: vec![],
        related: vec!["q".to_string()],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "load".to_string(),
        signature: "(load path)".to_string(),
        description: "Loads and executes a module by path; a no-op if already loaded. Only valid at the top level.".to_string(),
        examples: vec![],
        related: vec![],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "help".to_string(),
        signature: "(help [name])".to_string(),
        description: "Prints documentation for name, or a quick reference of every builtin if omitted. REPL only.".to_string(),
        examples: vec![],
        related: vec![],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "restart".to_string(),
        signature: "(restart)".to_string(),
        description: "Clears all global bindings and re-registers the builtins. REPL only.".to_string(),
        examples: vec![],
        related: vec![],
        category: "Special Forms".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "quit".to_string(),
        signature: "(quit)".to_string(),
        description: "Ends the session. REPL only.".to_string(),
        examples: vec![],
        related: vec![],
        category: "Special Forms".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn env() -> Rc<Environment> {
        Environment::new(PathBuf::from("."))
    }

    #[test]
    fn q_returns_its_argument_unevaluated() {
        let e = env();
        let expr = Value::list_from([Value::symbol("add"), Value::Int(1), Value::Int(2)]);
        let raw = Value::cons(expr.clone(), Value::Nil);
        assert_eq!(builtin_q(&e, raw).unwrap(), expr);
    }

    #[test]
    fn quit_is_an_error_sentinel() {
        let err = builtin_quit(&[]).unwrap_err();
        assert!(err.is_quit());
    }

    #[test]
    fn def_binds_a_function_literal_without_evaluating_it() {
        // ((n) n) would, if evaluated as an ordinary call, try to call
        // the unbound parameter list (n) and fail; def must bind it
        // as-is instead, since it's shaped like a function literal.
        let e = env();
        let raw = Value::list_from([
            Value::symbol("identity"),
            Value::list_from([Value::list_from([Value::symbol("n")]), Value::symbol("n")]),
        ]);
        let bound = builtin_def(&e, raw).unwrap();
        assert!(crate::macros::is_function(&bound));
        assert_eq!(e.lookup("identity"), Some(bound));
    }

    #[test]
    fn def_binds_a_macro_literal_without_evaluating_it() {
        let e = env();
        let raw = Value::list_from([
            Value::symbol("my-macro"),
            Value::list_from([Value::Int(0), Value::Nil, Value::Int(1)]),
        ]);
        let bound = builtin_def(&e, raw).unwrap();
        assert!(crate::macros::is_macro(&bound));
    }

    #[test]
    fn def_evaluates_a_three_element_call_normally() {
        // (object (x 1) (y 2)) is three elements long, so it is never
        // mistaken for a function/macro literal and is evaluated as
        // the call it is.
        let e = env();
        crate::builtins::register_all(&e);
        let raw = Value::list_from([
            Value::symbol("p"),
            Value::list_from([
                Value::symbol("object"),
                Value::list_from([Value::symbol("x"), Value::Int(1)]),
            ]),
        ]);
        let bound = builtin_def(&e, raw).unwrap();
        assert!(matches!(bound, Value::Object(_)));
    }
}
