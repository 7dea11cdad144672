//! Objects: object, has-property?, get-property, copy.
//!
//! Objects are immutable string-keyed maps. All four operators are
//! macro-convention: `object` and `copy` take raw `(name value)`
//! pairs (only `value` is evaluated), and `has-property?`/
//! `get-property` take the property name as a bare, unevaluated
//! symbol rather than an evaluated string — this lets callers write
//! `(get-property p x)` instead of `(get-property p "x")`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{cons_iter, BuiltinDispatch, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Extracts a property name from an unevaluated symbol/string token.
fn raw_key_text(v: &Value) -> Result<String, EvalError> {
    v.text()
        .map(|s| s.to_string())
        .ok_or_else(|| EvalError::type_error(format!("object keys must be strings or symbols, not {}", v.type_name())))
}

/// Evaluates a raw `(name value)` pair into (key, value).
fn eval_pair(env: &Rc<Environment>, pair: &Value) -> Result<(String, Value), EvalError> {
    let mut parts = cons_iter(pair.clone());
    let name_expr = parts.next().ok_or_else(|| EvalError::shape("object pairs must have a name and a value"))?;
    let value_expr = parts.next().ok_or_else(|| EvalError::shape("object pairs must have a name and a value"))?;
    if parts.next().is_some() {
        return Err(EvalError::shape("object pairs must have exactly two elements"));
    }
    let key = raw_key_text(&name_expr)?;
    let value = crate::eval::eval(env, &value_expr, false)?;
    Ok((key, value))
}

pub fn builtin_object(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut map = HashMap::new();
    for pair in cons_iter(raw_args) {
        let (key, value) = eval_pair(env, &pair)?;
        map.insert(key, value);
    }
    Ok(Value::Object(Rc::new(map)))
}

pub fn builtin_has_property(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let object_expr = parts.next().ok_or_else(|| EvalError::arity_exact("has-property?", 2, 0))?;
    let key_expr = parts.next().ok_or_else(|| EvalError::arity_exact("has-property?", 2, 1))?;
    if parts.next().is_some() {
        return Err(EvalError::arity_exact("has-property?", 2, 3));
    }
    let object = crate::eval::eval(env, &object_expr, false)?;
    let key = raw_key_text(&key_expr)?;
    match object {
        Value::Object(map) => Ok(Value::Bool(map.contains_key(&key))),
        other => Err(EvalError::type_error(format!("cannot check properties of {}", other.type_name()))),
    }
}

pub fn builtin_get_property(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let object_expr = parts.next().ok_or_else(|| EvalError::arity_at_least("get-property", 2, 0))?;
    let key_expr = parts.next().ok_or_else(|| EvalError::arity_at_least("get-property", 2, 1))?;
    let default_expr = parts.next();
    if parts.next().is_some() {
        return Err(EvalError::arity_at_most("get-property", 3, 4));
    }
    let object = crate::eval::eval(env, &object_expr, false)?;
    let key = raw_key_text(&key_expr)?;
    match object {
        Value::Object(map) => match map.get(&key) {
            Some(v) => Ok(v.clone()),
            None => match default_expr {
                Some(default_expr) => crate::eval::eval(env, &default_expr, false),
                None => Err(EvalError::name(format!("object has no property {key}"))),
            },
        },
        other => Err(EvalError::type_error(format!("cannot get a property of {}", other.type_name()))),
    }
}

pub fn builtin_copy(env: &Rc<Environment>, raw_args: Value) -> Result<Value, EvalError> {
    let mut parts = cons_iter(raw_args);
    let object_expr = parts.next().ok_or_else(|| EvalError::arity_at_least("copy", 1, 0))?;
    let object = crate::eval::eval(env, &object_expr, false)?;
    let mut map = match object {
        Value::Object(map) => (*map).clone(),
        other => return Err(EvalError::type_error(format!("cannot copy {}", other.type_name()))),
    };
    for pair in parts {
        let (key, value) = eval_pair(env, &pair)?;
        map.insert(key, value);
    }
    Ok(Value::Object(Rc::new(map)))
}

pub fn register(env: &Rc<Environment>) {
    super::define_macro(env, "object", BuiltinDispatch::Macro(builtin_object), 0, None, false, false);
    super::define_macro(env, "has-property?", BuiltinDispatch::Macro(builtin_has_property), 2, Some(2), false, false);
    super::define_macro(env, "get-property", BuiltinDispatch::Macro(builtin_get_property), 2, Some(3), false, false);
    super::define_macro(env, "copy", BuiltinDispatch::Macro(builtin_copy), 1, None, false, false);

    crate::help::register_help(crate::help::HelpEntry {
        name: "object".to_string(),
        signature: "(object (name value) ...)".to_string(),
        description: "Builds an immutable Object from zero or more (name value) pairs. Each value is evaluated; names are taken literally.".to_string(),
        examples: vec!["(object (x 1) (y 2))".to_string()],
        related: vec!["get-property".to_string(), "has-property?".to_string(), "copy".to_string()],
        category: "Objects".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "has-property?".to_string(),
        signature: "(has-property? object name)".to_string(),
        description: "True iff object has a property named name. name is taken literally, not evaluated.".to_string(),
        examples: vec![],
        related: vec!["get-property".to_string()],
        category: "Objects".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "get-property".to_string(),
        signature: "(get-property object name [default])".to_string(),
        description: "The value bound to name in object. With two arguments, a missing name is an error; with three, default is evaluated lazily and returned instead.".to_string(),
        examples: vec![],
        related: vec!["has-property?".to_string()],
        category: "Objects".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "copy".to_string(),
        signature: "(copy object (name value) ...)".to_string(),
        description: "A shallow copy of object, with zero or more (name value) overrides/additions merged in.".to_string(),
        examples: vec!["(copy p (x 10))".to_string()],
        related: vec!["object".to_string()],
        category: "Objects".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn env() -> Rc<Environment> {
        Environment::new(PathBuf::from("."))
    }

    fn pair(name: &str, value: Value) -> Value {
        Value::list_from([Value::symbol(name), value])
    }

    #[test]
    fn object_builds_from_raw_pairs() {
        let e = env();
        let obj = builtin_object(&e, Value::cons(pair("x", Value::Int(1)), Value::Nil)).unwrap();
        match obj {
            Value::Object(map) => assert_eq!(map.get("x"), Some(&Value::Int(1))),
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn get_property_two_args_errors_on_missing_key() {
        let e = env();
        e.define_global("p", builtin_object(&e, Value::Nil).unwrap()).unwrap();
        let call = Value::cons(Value::symbol("p"), Value::cons(Value::symbol("missing"), Value::Nil));
        assert!(builtin_get_property(&e, call).is_err());
    }

    #[test]
    fn get_property_three_args_uses_default_when_absent() {
        let e = env();
        e.define_global("p", builtin_object(&e, Value::Nil).unwrap()).unwrap();
        let call = Value::list_from([Value::symbol("p"), Value::symbol("missing"), Value::Int(42)]);
        assert_eq!(builtin_get_property(&e, call).unwrap(), Value::Int(42));
    }

    #[test]
    fn has_property_is_false_for_missing_keys() {
        let e = env();
        e.define_global("p", builtin_object(&e, Value::Nil).unwrap()).unwrap();
        let call = Value::list_from([Value::symbol("p"), Value::symbol("x")]);
        assert_eq!(builtin_has_property(&e, call).unwrap(), Value::Bool(false));
    }

    #[test]
    fn copy_merges_overrides_without_mutating_original() {
        let e = env();
        let original = builtin_object(&e, Value::cons(pair("x", Value::Int(1)), Value::Nil)).unwrap();
        e.define_global("p", original).unwrap();
        let copied = builtin_copy(
            &e,
            Value::list_from([Value::symbol("p"), pair("x", Value::Int(10))]),
        )
        .unwrap();
        match copied {
            Value::Object(map) => assert_eq!(map.get("x"), Some(&Value::Int(10))),
            other => panic!("expected Object, got {other:?}"),
        }
        match e.lookup("p").unwrap() {
            Value::Object(map) => assert_eq!(map.get("x"), Some(&Value::Int(1))),
            other => panic!("expected Object, got {other:?}"),
        }
    }
}
