//! Runtime type reflection: the single `type` builtin.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{BuiltinDispatch, Value};
use std::rc::Rc;

pub fn builtin_type(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::symbol(args[0].type_name()))
}

pub fn register(env: &Rc<Environment>) {
    super::define_function(env, "type", BuiltinDispatch::Function(builtin_type), 1, Some(1));

    crate::help::register_help(crate::help::HelpEntry {
        name: "type".to_string(),
        signature: "(type value)".to_string(),
        description: "The name of value's runtime type: Int, Bool, String, Symbol, List, Object, Builtin, or Thunk.".to_string(),
        examples: vec!["(type 1) => Int".to_string(), "(type ()) => List".to_string()],
        related: vec![],
        category: "Types".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_each_kind() {
        assert_eq!(builtin_type(&[Value::Int(1)]).unwrap(), Value::symbol("Int"));
        assert_eq!(builtin_type(&[Value::Nil]).unwrap(), Value::symbol("List"));
    }
}
