// ABOUTME: The macro rewriter — resolves a call-position head against raw
// arguments, expanding user macros and the `if`/`eval` rewrite-builtins in
// place until either a builtin dispatch or a tail call to a user function
// is reached.

use crate::binder::{bind_params, substitute, Args, ProcKind};
use crate::env::{new_frame, Environment};
use crate::error::EvalError;
use crate::value::{cons_iter, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// What a fully-rewritten call position reduces to.
pub enum RewriteOutcome {
    /// Expansion ran all the way to a plain value; nothing left to call.
    Value(Value),
    /// A tail call to a user-defined function: hand this to the Thunk
    /// engine instead of recursing the host stack.
    TailCall {
        param_spec: Value,
        body: Value,
        args: Value,
    },
    /// An ordinary builtin call (including `if`/`eval` reached in
    /// non-tail position): dispatch it directly.
    Dispatch { head: Value, args: Value },
}

/// True iff `expression` is shaped like a user macro definition:
/// a three-element list `(0 params body)`.
pub fn is_macro(expression: &Value) -> bool {
    let mut items = cons_iter(expression.clone());
    matches!(items.next(), Some(Value::Int(0)))
        && items.next().is_some()
        && items.next().is_some()
        && items.next().is_none()
}

/// True iff `expression` is shaped like a user function definition:
/// a two-element list `(params body)`.
pub fn is_function(expression: &Value) -> bool {
    let mut items = cons_iter(expression.clone());
    items.next().is_some() && items.next().is_some() && items.next().is_none()
}

/// Rewrites `head`/`raw_args` until it reduces to a value, a tail call,
/// or an ordinary builtin dispatch. `head` must already be an evaluated
/// call-position value (the result of evaluating the first element of
/// a call form).
pub fn resolve(
    env: &Rc<Environment>,
    mut head: Value,
    mut raw_args: Value,
) -> Result<RewriteOutcome, EvalError> {
    loop {
        match &head {
            Value::Builtin(b) if b.name == "if" => {
                let mut parts = cons_iter(raw_args.clone());
                let cond = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 0))?;
                let then_branch = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 1))?;
                let else_branch = parts.next().ok_or_else(|| EvalError::arity_exact("if", 3, 2))?;
                if parts.next().is_some() {
                    return Err(EvalError::arity_exact("if", 3, 4));
                }
                let cond_val = crate::eval::eval(env, &cond, false)?;
                let chosen = if cond_val.truthy() { then_branch } else { else_branch };
                match split_call(&chosen) {
                    Some((next_head_expr, next_args)) => {
                        head = crate::eval::eval(env, &next_head_expr, false)?;
                        raw_args = next_args;
                        continue;
                    }
                    None => return Ok(RewriteOutcome::Value(crate::eval::eval(env, &chosen, false)?)),
                }
            }
            Value::Builtin(b) if b.name == "eval" => {
                let mut parts = cons_iter(raw_args.clone());
                let arg = parts.next().ok_or_else(|| EvalError::arity_exact("eval", 1, 0))?;
                if parts.next().is_some() {
                    return Err(EvalError::arity_at_most("eval", 1, 2));
                }
                let code = crate::eval::eval(env, &arg, false)?;
                match split_call(&code) {
                    Some((next_head_expr, next_args)) => {
                        head = crate::eval::eval(env, &next_head_expr, false)?;
                        raw_args = next_args;
                        continue;
                    }
                    None => return Ok(RewriteOutcome::Value(crate::eval::eval(env, &code, false)?)),
                }
            }
            Value::Builtin(_) => return Ok(RewriteOutcome::Dispatch { head, args: raw_args }),
            _ if is_macro(&head) => {
                let mut parts = cons_iter(head.clone());
                parts.next(); // the 0 marker
                let macro_params = parts.next().expect("checked by is_macro");
                let macro_body = parts.next().expect("checked by is_macro");

                let bindings_target = new_frame();
                bind_params(
                    env,
                    macro_params,
                    Args::Raw(raw_args.clone()),
                    ProcKind::Macro,
                    &bindings_target,
                )?;
                let bindings: HashMap<String, Value> = bindings_target.borrow().clone();
                let rewritten = substitute(&bindings, macro_body);

                match split_call(&rewritten) {
                    Some((next_head_expr, next_args)) => {
                        head = crate::eval::eval(env, &next_head_expr, false)?;
                        raw_args = next_args;
                        continue;
                    }
                    None => {
                        return Ok(RewriteOutcome::Value(crate::eval::eval(env, &rewritten, false)?))
                    }
                }
            }
            _ if is_function(&head) => {
                let mut parts = cons_iter(head.clone());
                let param_spec = parts.next().expect("checked by is_function");
                let body = parts.next().expect("checked by is_function");
                return Ok(RewriteOutcome::TailCall { param_spec, body, args: raw_args });
            }
            other => {
                return Err(EvalError::type_error(format!("{} is not callable", other.type_name())))
            }
        }
    }
}

/// Splits a call-shaped expression `(head . args)` into its parts; `None`
/// if `expression` isn't a non-empty list.
fn split_call(expression: &Value) -> Option<(Value, Value)> {
    match crate::thunk::resolve_thunks(expression.clone()) {
        Value::Cons(cell) => Some((cell.head.clone(), cell.tail.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn recognizes_macro_shape() {
        let m = Value::list_from([Value::Int(0), Value::Nil, Value::Int(1)]);
        assert!(is_macro(&m));
        let f = Value::list_from([Value::Nil, Value::Int(1)]);
        assert!(!is_macro(&f));
        assert!(is_function(&f));
    }
}
