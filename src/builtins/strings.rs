//! Text and printed-representation conversions: str, chars, repr, bool, debug.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{cons_iter, BuiltinDispatch, Value};
use std::rc::Rc;

/// Codepoints -> string. Integers outside the valid codepoint range
/// produce a warning and are skipped rather than failing the call.
pub fn builtin_str(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = String::new();
    for item in cons_iter(args[0].clone()) {
        match item {
            Value::Int(n) => match u32::try_from(n).ok().and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => crate::diagnostics::warn(&format!("{n} is not a valid codepoint, skipping")),
            },
            other => return Err(EvalError::type_error(format!("cannot build a string from {}", other.type_name()))),
        }
    }
    Ok(Value::string(out))
}

/// String -> codepoints. Exact inverse of `str` for valid codepoints.
pub fn builtin_chars(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::list_from(s.chars().map(|c| Value::Int(c as i64)))),
        other => Err(EvalError::type_error(format!("cannot take chars of {}", other.type_name()))),
    }
}

pub fn builtin_repr(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::string(crate::printer::repr(&args[0])))
}

/// Writes `args[0]`'s repr to the error sink, then returns `args[1]` unchanged.
pub fn builtin_debug(args: &[Value]) -> Result<Value, EvalError> {
    eprintln!("{}", crate::printer::repr(&args[0]));
    Ok(args[1].clone())
}

pub fn builtin_bool(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].truthy()))
}

pub fn register(env: &Rc<Environment>) {
    super::define_function(env, "str", BuiltinDispatch::Function(builtin_str), 1, Some(1));
    super::define_function(env, "chars", BuiltinDispatch::Function(builtin_chars), 1, Some(1));
    super::define_function(env, "repr", BuiltinDispatch::Function(builtin_repr), 1, Some(1));
    super::define_function(env, "debug", BuiltinDispatch::Function(builtin_debug), 2, Some(2));
    super::define_function(env, "bool", BuiltinDispatch::Function(builtin_bool), 1, Some(1));

    crate::help::register_help(crate::help::HelpEntry {
        name: "str".to_string(),
        signature: "(str codepoints)".to_string(),
        description: "Builds a string from a list of integer codepoints. Codepoints outside the valid range are skipped with a warning.".to_string(),
        examples: vec!["(str (cons 104 (cons 105 ()))) => \"hi\"".to_string()],
        related: vec!["chars".to_string(), "repr".to_string()],
        category: "Text".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "chars".to_string(),
        signature: "(chars string)".to_string(),
        description: "Explodes a string into a list of its integer codepoints; the exact inverse of str.".to_string(),
        examples: vec!["(chars \"hi\") => (104 105)".to_string()],
        related: vec!["str".to_string()],
        category: "Text".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "repr".to_string(),
        signature: "(repr value)".to_string(),
        description: "The re-readable printed form of value: strings are quoted and escaped.".to_string(),
        examples: vec!["(repr \"hi\") => \"hi\"".to_string()],
        related: vec!["str".to_string(), "debug".to_string()],
        category: "Text".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "debug".to_string(),
        signature: "(debug tag value)".to_string(),
        description: "Writes tag's repr to the error sink as a side effect, then returns value unchanged.".to_string(),
        examples: vec!["(debug `checkpoint` x) => x".to_string()],
        related: vec!["repr".to_string()],
        category: "Text".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "bool".to_string(),
        signature: "(bool value)".to_string(),
        description: "value's truthiness: false for 0, false, (), \"\", and {}; true otherwise.".to_string(),
        examples: vec!["(bool 0) => false".to_string(), "(bool 1) => true".to_string()],
        related: vec![],
        category: "Text".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_builds_a_string_from_codepoints() {
        let codepoints = Value::list_from([Value::Int(104), Value::Int(105)]);
        assert_eq!(builtin_str(&[codepoints]).unwrap(), Value::string("hi"));
    }

    #[test]
    fn str_skips_invalid_codepoints() {
        let codepoints = Value::list_from([Value::Int(104), Value::Int(-1), Value::Int(105)]);
        assert_eq!(builtin_str(&[codepoints]).unwrap(), Value::string("hi"));
    }

    #[test]
    fn chars_is_the_inverse_of_str() {
        let codepoints = Value::list_from([Value::Int(104), Value::Int(105)]);
        let s = builtin_str(&[codepoints.clone()]).unwrap();
        assert_eq!(builtin_chars(&[s]).unwrap(), codepoints);
    }

    #[test]
    fn repr_quotes_strings() {
        assert_eq!(builtin_repr(&[Value::string("hi")]).unwrap(), Value::string("\"hi\""));
    }

    #[test]
    fn debug_returns_second_arg_unchanged() {
        assert_eq!(
            builtin_debug(&[Value::string("tag"), Value::Int(42)]).unwrap(),
            Value::Int(42)
        );
    }

    #[test]
    fn bool_reflects_truthiness() {
        assert_eq!(builtin_bool(&[Value::Int(0)]).unwrap(), Value::Bool(false));
    }
}
