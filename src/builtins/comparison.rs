//! Comparison: less?, equal?
//!
//! `less?` imposes a total order on values of the same kind (integers
//! numerically, strings lexicographically, lists lexicographically by
//! element) and is a type error across kinds. `equal?` is structural
//! equality, treating strings and symbols of matching spelling as equal.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{value_equal, value_less, BuiltinDispatch, Value};
use std::rc::Rc;

pub fn builtin_less(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(value_less(&args[0], &args[1])?))
}

pub fn builtin_equal(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(value_equal(&args[0], &args[1])))
}

pub fn register(env: &Rc<Environment>) {
    super::define_function(env, "less?", BuiltinDispatch::Function(builtin_less), 2, Some(2));
    super::define_function(env, "equal?", BuiltinDispatch::Function(builtin_equal), 2, Some(2));

    crate::help::register_help(crate::help::HelpEntry {
        name: "less?".to_string(),
        signature: "(less? a b)".to_string(),
        description: "True iff a precedes b in the total order over their shared kind (Int, String, or List). Mixing kinds is an error."
            .to_string(),
        examples: vec!["(less? 1 2) => true".to_string()],
        related: vec!["equal?".to_string()],
        category: "Comparison".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "equal?".to_string(),
        signature: "(equal? a b)".to_string(),
        description: "Structural equality. A quoted symbol and a string of equal spelling compare equal."
            .to_string(),
        examples: vec!["(equal? (cons 1 ()) (cons 1 ())) => true".to_string()],
        related: vec!["less?".to_string()],
        category: "Comparison".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn less_compares_ints() {
        assert_eq!(builtin_less(&[Value::Int(1), Value::Int(2)]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn equal_is_structural() {
        let a = Value::cons(Value::Int(1), Value::Nil);
        let b = Value::cons(Value::Int(1), Value::Nil);
        assert_eq!(builtin_equal(&[a, b]).unwrap(), Value::Bool(true));
    }
}
