//! List construction and decomposition: cons, head, tail.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{cons_iter, BuiltinDispatch, Value};
use std::rc::Rc;

/// `cons` takes its arguments raw rather than pre-evaluated like the
/// rest of this module, so that its tail can stay an unresolved `Thunk`
/// instead of being forced by the ordinary argument-evaluation path —
/// that's what lets a recursive call in tail position build an
/// infinite list one cell at a time.
pub fn builtin_cons(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let head_expr = parts.next().ok_or_else(|| EvalError::arity_exact("cons", 2, 0))?;
    let tail_expr = parts.next().ok_or_else(|| EvalError::arity_exact("cons", 2, 1))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("cons", 2, 3));
    }
    let head = crate::thunk::resolve_thunks(crate::eval::eval(env, &head_expr, false)?);
    let tail = crate::eval::eval(env, &tail_expr, false)?;
    match &tail {
        // A lazy tail arrives as an unresolved thunk; it's only known
        // to be list-shaped once forced.
        Value::Nil | Value::Cons(_) | Value::Thunk(_) => Ok(Value::cons(head, tail)),
        other => Err(EvalError::type_error(format!("cons tail must be a list, not {}", other.type_name()))),
    }
}

pub fn builtin_head(args: &[Value]) -> Result<Value, EvalError> {
    match &crate::thunk::resolve_thunks(args[0].clone()) {
        Value::Cons(cell) => Ok(cell.head.clone()),
        Value::Nil => Ok(Value::Nil),
        other => Err(EvalError::type_error(format!("cannot get head of {}", other.type_name()))),
    }
}

pub fn builtin_tail(args: &[Value]) -> Result<Value, EvalError> {
    match &crate::thunk::resolve_thunks(args[0].clone()) {
        Value::Cons(cell) => Ok(cell.tail.clone()),
        Value::Nil => Ok(Value::Nil),
        other => Err(EvalError::type_error(format!("cannot get tail of {}", other.type_name()))),
    }
}

pub fn register(env: &Rc<Environment>) {
    super::define_macro(env, "cons", BuiltinDispatch::Macro(builtin_cons), 2, Some(2), false, false);
    super::define_function(env, "head", BuiltinDispatch::Function(builtin_head), 1, Some(1));
    super::define_function(env, "tail", BuiltinDispatch::Function(builtin_tail), 1, Some(1));

    crate::help::register_help(crate::help::HelpEntry {
        name: "cons".to_string(),
        signature: "(cons head tail)".to_string(),
        description: "Builds a new cons cell. `tail` may itself be an unresolved thunk, making the result's tail lazy.".to_string(),
        examples: vec!["(cons 1 ()) => (1)".to_string()],
        related: vec!["head".to_string(), "tail".to_string()],
        category: "Lists".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "head".to_string(),
        signature: "(head list)".to_string(),
        description: "The first element of a non-empty list.".to_string(),
        examples: vec!["(head (cons 1 ())) => 1".to_string()],
        related: vec!["tail".to_string(), "cons".to_string()],
        category: "Lists".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "tail".to_string(),
        signature: "(tail list)".to_string(),
        description: "Everything after the first element of a non-empty list. The list argument is forced enough to inspect its shape; the tail returned may itself still be an unresolved thunk.".to_string(),
        examples: vec!["(tail (cons 1 ())) => ()".to_string()],
        related: vec!["head".to_string(), "cons".to_string()],
        category: "Lists".to_string(),
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
    fn head_and_tail_of_a_cons() {
        let pair = Value::cons(Value::Int(1), Value::Int(2));
        assert_eq!(builtin_head(&[pair.clone()]).unwrap(), Value::Int(1));
        assert_eq!(builtin_tail(&[pair]).unwrap(), Value::Int(2));
    }

    #[test]
    fn head_of_non_list_is_an_error() {
        assert!(builtin_head(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn head_and_tail_of_nil_are_nil() {
        assert_eq!(builtin_head(&[Value::Nil]).unwrap(), Value::Nil);
        assert_eq!(builtin_tail(&[Value::Nil]).unwrap(), Value::Nil);
    }

    #[test]
    fn cons_builds_a_pair_from_its_evaluated_arguments() {
        let e = env();
        let raw = Value::list_from([Value::Int(1), Value::Nil]);
        let result = builtin_cons(&e, raw).unwrap();
        assert_eq!(result, Value::cons(Value::Int(1), Value::Nil));
    }

    #[test]
    fn cons_rejects_a_non_list_tail() {
        let e = env();
        let raw = Value::list_from([Value::Int(1), Value::Int(2)]);
        assert!(builtin_cons(&e, raw).is_err());
    }
}
