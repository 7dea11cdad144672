// ABOUTME: The thunk engine — resolves a deferred tail call without growing
// the host stack, trampolining through chained tail calls in a loop.

use crate::binder::{bind_params, Args, ProcKind};
use crate::env::{new_frame, Environment};
use crate::error::EvalError;
use crate::macros::{self, RewriteOutcome};
use crate::value::{cons_iter, ThunkCell, Value};
use std::rc::Rc;

impl ThunkCell {
    /// Performs exactly one step of resolution: binds parameters into a
    /// fresh local frame, then either evaluates the body outright (for
    /// a non-list body), defers further via a new `Thunk` (a tail call
    /// to another user function), or dispatches a rewritten form.
    pub fn step(&self) -> Result<Value, EvalError> {
        let frame = new_frame();
        let args: Vec<Value> = cons_iter(self.args.clone()).collect();
        self.env.push_local(frame.clone());
        bind_params(&self.env, self.param_spec.clone(), Args::Evaluated(args), ProcKind::Function, &frame)?;

        let result = (|| -> Result<Value, EvalError> {
            let body = crate::thunk::resolve_thunks(self.body.clone());
            match &body {
                Value::Cons(cell) => {
                    let head = crate::eval::eval(&self.env, &cell.head, false)?;
                    match macros::resolve(&self.env, head, cell.tail.clone())? {
                        RewriteOutcome::Value(v) => Ok(v),
                        RewriteOutcome::Dispatch { head, args } => {
                            // A tail call's body is never itself a top-level
                            // form, regardless of whether the outermost call
                            // that produced this Thunk was: `top_level_only`
                            // builtins like `def`/`load` must not be callable
                            // merely by tail-positioning them inside a
                            // user function body.
                            crate::eval::dispatch(&self.env, head, args, false, self.env.repl_mode())
                        }
                        RewriteOutcome::TailCall { param_spec, body, args } => {
                            let evaluated_args = crate::eval::eval_list(&self.env, &args)?;
                            Ok(Value::Thunk(Rc::new(ThunkCell {
                                env: self.env.clone(),
                                param_spec,
                                body,
                                args: evaluated_args,
                                is_macro_call: false,
                                resolved: std::cell::RefCell::new(None),
                            })))
                        }
                    }
                }
                other => crate::eval::eval(&self.env, other, false),
            }
        })();

        self.env.pop_local();
        result
    }
}

/// Repeatedly resolves chained tail calls until a final, non-`Thunk`
/// value is reached. This is the trampoline that gives tail calls their
/// constant host-stack guarantee: each call to `step` returns to this
/// loop instead of recursing.
pub fn resolve_thunks(value: Value) -> Value {
    let mut current = value;
    loop {
        match current {
            Value::Thunk(cell) => {
                if let Some(cached) = cell.resolved.borrow().clone() {
                    return cached;
                }
                let next = match cell.step() {
                    Ok(v) => v,
                    Err(e) if e.is_quit() => {
                        // resolve_thunks has no Result channel back to its
                        // callers (ConsIter, value_equal, ...), so a quit
                        // reached only through a lazy tail-call chain ends
                        // the process directly rather than the REPL loop.
                        std::process::exit(0)
                    }
                    Err(e) => {
                        crate::diagnostics::report(&e);
                        Value::Nil
                    }
                };
                if !matches!(next, Value::Thunk(_)) {
                    *cell.resolved.borrow_mut() = Some(next.clone());
                }
                current = next;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use std::path::PathBuf;

    #[test]
    fn atom_body_resolves_directly() {
        let env = Environment::new(PathBuf::from("."));
        let thunk = ThunkCell {
            env: env.clone(),
            param_spec: Value::Nil,
            body: Value::Int(42),
            args: Value::Nil,
            is_macro_call: false,
            resolved: std::cell::RefCell::new(None),
        };
        assert_eq!(resolve_thunks(Value::Thunk(Rc::new(thunk))), Value::Int(42));
    }
}
