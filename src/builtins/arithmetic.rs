//! Integer arithmetic: add, sub, mul, div, mod.
//!
//! All five are strictly binary (two arguments, no negate-on-one-arg
//! or variadic-chain case); `div`/`mod` use floored semantics (`div`
//! rounds toward negative infinity, `mod`'s sign matches the divisor)
//! and reject division by zero.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{BuiltinDispatch, Value};
use std::rc::Rc;

fn as_int(v: &Value, op: &str) -> Result<i64, EvalError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(EvalError::type_error(format!(
            "cannot {op} {}",
            other.type_name()
        ))),
    }
}

pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(as_int(&args[0], "add")? + as_int(&args[1], "add")?))
}

pub fn builtin_sub(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(as_int(&args[0], "subtract")? - as_int(&args[1], "subtract")?))
}

pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(as_int(&args[0], "multiply")? * as_int(&args[1], "multiply")?))
}

/// Floored division: rounds toward negative infinity, unlike Rust's
/// truncating `/`. Matches `floor_mod`'s remainder sign.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Floored remainder: sign always matches the divisor, unlike Rust's `%`.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

pub fn builtin_div(args: &[Value]) -> Result<Value, EvalError> {
    let a = as_int(&args[0], "divide")?;
    let b = as_int(&args[1], "divide")?;
    if b == 0 {
        return Err(EvalError::type_error("division by zero"));
    }
    Ok(Value::Int(floor_div(a, b)))
}

pub fn builtin_mod(args: &[Value]) -> Result<Value, EvalError> {
    let a = as_int(&args[0], "take the remainder of")?;
    let b = as_int(&args[1], "take the remainder of")?;
    if b == 0 {
        return Err(EvalError::type_error("division by zero"));
    }
    Ok(Value::Int(floor_mod(a, b)))
}

pub fn register(env: &Rc<Environment>) {
    super::define_function(env, "add", BuiltinDispatch::Function(builtin_add), 2, Some(2));
    super::define_function(env, "sub", BuiltinDispatch::Function(builtin_sub), 2, Some(2));
    super::define_function(env, "mul", BuiltinDispatch::Function(builtin_mul), 2, Some(2));
    super::define_function(env, "div", BuiltinDispatch::Function(builtin_div), 2, Some(2));
    super::define_function(env, "mod", BuiltinDispatch::Function(builtin_mod), 2, Some(2));

    crate::help::register_help(crate::help::HelpEntry {
        name: "add".to_string(),
        signature: "(add n1 n2)".to_string(),
        description: "Returns the sum of the two arguments.".to_string(),
        examples: vec!["(add 1 2) => 3".to_string()],
        related: vec!["sub".to_string(), "mul".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "sub".to_string(),
        signature: "(sub n1 n2)".to_string(),
        description: "Subtracts the second argument from the first.".to_string(),
        examples: vec!["(sub 10 3) => 7".to_string()],
        related: vec!["add".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "mul".to_string(),
        signature: "(mul n1 n2)".to_string(),
        description: "Returns the product of the two arguments.".to_string(),
        examples: vec!["(mul 2 3) => 6".to_string()],
        related: vec!["div".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "div".to_string(),
        signature: "(div n1 n2)".to_string(),
        description: "Divides the first argument by the second, floored toward negative infinity."
            .to_string(),
        examples: vec!["(div 20 4) => 5".to_string()],
        related: vec!["mod".to_string(), "mul".to_string()],
        category: "Arithmetic".to_string(),
    });
    crate::help::register_help(crate::help::HelpEntry {
        name: "mod".to_string(),
        signature: "(mod n1 n2)".to_string(),
        description: "Remainder of n1 divided by n2; the sign matches the divisor.".to_string(),
        examples: vec!["(mod 17 5) => 2".to_string()],
        related: vec!["div".to_string()],
        category: "Arithmetic".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sums_both_arguments() {
        assert_eq!(builtin_add(&[Value::Int(1), Value::Int(2)]).unwrap(), Value::Int(3));
    }

    #[test]
    fn sub_subtracts_the_second_from_the_first() {
        assert_eq!(builtin_sub(&[Value::Int(10), Value::Int(3)]).unwrap(), Value::Int(7));
    }

    #[test]
    fn div_by_zero_is_an_error() {
        assert!(builtin_div(&[Value::Int(1), Value::Int(0)]).is_err());
    }

    #[test]
    fn mod_matches_divisor_sign() {
        assert_eq!(builtin_mod(&[Value::Int(-1), Value::Int(5)]).unwrap(), Value::Int(4));
    }
}
