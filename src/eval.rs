// ABOUTME: Evaluator — dispatches call forms, resolves symbols, and hands
// tail calls to the thunk engine instead of recursing the host stack.

use crate::env::Environment;
use crate::error::EvalError;
use crate::macros::RewriteOutcome;
use crate::value::{cons_iter, BuiltinDispatch, ThunkCell, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Non-tail recursion (e.g. a non-tail-recursive user function, or
/// deeply nested ordinary sub-expressions) grows the host stack one
/// `eval` frame at a time. This bounds it well short of the real stack
/// limit so it surfaces as `HostExhaustion` instead of a hard crash.
const MAX_EVAL_DEPTH: usize = 4000;

thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct DepthGuard;

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

fn enter_eval(expr: &Value) -> Result<DepthGuard, EvalError> {
    EVAL_DEPTH.with(|d| {
        let depth = d.get() + 1;
        if depth > MAX_EVAL_DEPTH {
            return Err(EvalError::HostExhaustion(crate::printer::repr(expr)));
        }
        d.set(depth);
        Ok(DepthGuard)
    })
}

/// Evaluates `expr`. Every evaluation error except the `quit` sentinel is
/// already reported and converted to `nil` by the time this returns —
/// the `Result` here exists only so `quit` can be recognized by callers
/// that need to end the process (the REPL and script driver).
pub fn eval(env: &Rc<Environment>, expr: &Value, top_level: bool) -> Result<Value, EvalError> {
    let _guard = match enter_eval(expr) {
        Ok(guard) => guard,
        Err(e) => {
            crate::diagnostics::report(&e);
            return Ok(Value::Nil);
        }
    };
    match eval_core(env, expr, top_level) {
        Ok(v) => Ok(v),
        Err(e) if e.is_quit() => Err(e),
        Err(e) => {
            crate::diagnostics::report(&e);
            Ok(Value::Nil)
        }
    }
}

fn eval_core(env: &Rc<Environment>, expr: &Value, top_level: bool) -> Result<Value, EvalError> {
    let expr = crate::thunk::resolve_thunks(expr.clone());
    match &expr {
        Value::Nil
        | Value::Int(_)
        | Value::Bool(_)
        | Value::Str(_)
        | Value::Object(_)
        | Value::Builtin(_) => Ok(expr),
        Value::Symbol(name) => env
            .lookup(name)
            .ok_or_else(|| EvalError::name(format!("name {name} is not defined"))),
        Value::Thunk(_) => unreachable!("resolved above"),
        Value::Cons(cell) => {
            let head = eval(env, &cell.head, false)?;
            match crate::macros::resolve(env, head, cell.tail.clone())? {
                RewriteOutcome::Value(v) => Ok(v),
                RewriteOutcome::Dispatch { head, args } => dispatch(env, head, args, top_level, env.repl_mode()),
                RewriteOutcome::TailCall { param_spec, body, args } => {
                    let evaluated_args = eval_list(env, &args)?;
                    Ok(Value::Thunk(Rc::new(ThunkCell {
                        env: env.clone(),
                        param_spec,
                        body,
                        args: evaluated_args,
                        is_macro_call: false,
                        resolved: RefCell::new(None),
                    })))
                }
            }
        }
    }
}

/// Dispatches a call to a builtin whose call-position value has already
/// been resolved. Function-convention builtins get pre-evaluated,
/// arity-checked arguments; macro-convention builtins receive the raw
/// syntax and check their own arity.
///
/// `top_level`/`repl_mode` describe the call site actually reaching this
/// dispatch — which may differ from the original head before macro/`if`/
/// `eval` rewriting, and is never top-level once routed through a tail
/// call's `Thunk`, even if the outermost form was. This is the single
/// place `top_level_only`/`repl_only` are enforced, so a rewrite or a
/// tail call can't smuggle a restricted builtin past the check.
pub fn dispatch(env: &Rc<Environment>, head: Value, raw_args: Value, top_level: bool, repl_mode: bool) -> Result<Value, EvalError> {
    let builtin = match &head {
        Value::Builtin(b) => b.clone(),
        other => return Err(EvalError::type_error(format!("{} is not callable", other.type_name()))),
    };
    if builtin.top_level_only && !top_level {
        return Err(EvalError::shape(format!(
            "{} can only be used at the top level",
            builtin.name
        )));
    }
    if builtin.repl_only && !repl_mode {
        return Err(EvalError::shape(format!(
            "{} can only be used in the REPL",
            builtin.name
        )));
    }
    match builtin.dispatch {
        BuiltinDispatch::Function(f) => {
            let args = eval_list_to_vec(env, &raw_args)?;
            check_arity(&builtin.name, builtin.min_arity, builtin.max_arity, args.len())?;
            f(&args)
        }
        BuiltinDispatch::Macro(m) => m(env, raw_args),
    }
}

fn check_arity(name: &str, min: usize, max: Option<usize>, actual: usize) -> Result<(), EvalError> {
    if actual < min {
        return Err(match max {
            Some(max) if max == min => EvalError::arity_exact(name, min, actual),
            _ => EvalError::arity_at_least(name, min, actual),
        });
    }
    if let Some(max) = max {
        if actual > max {
            return Err(if max == min {
                EvalError::arity_exact(name, min, actual)
            } else {
                EvalError::arity_at_most(name, max, actual)
            });
        }
    }
    Ok(())
}

/// Evaluates each element of a raw argument list, in order, returning
/// a proper list of the results.
pub fn eval_list(env: &Rc<Environment>, list: &Value) -> Result<Value, EvalError> {
    Ok(Value::list_from(eval_list_to_vec(env, list)?))
}

fn eval_list_to_vec(env: &Rc<Environment>, list: &Value) -> Result<Vec<Value>, EvalError> {
    let mut out = Vec::new();
    for item in cons_iter(list.clone()) {
        // Forced here, not left as a possibly-unresolved Thunk: a
        // tail-called function result is only known to be e.g. an Int
        // or a Cons once stepped. `cons`'s own tail argument is exempt
        // from this (it takes its arguments raw; see `builtin_cons`),
        // which is what keeps a recursive call in tail position able
        // to build an infinite list one cell at a time.
        out.push(crate::thunk::resolve_thunks(eval(env, &item, false)?));
    }
    Ok(out)
}

/// Top-level entry point used by the script driver and REPL: evaluates
/// one already-parsed top-level form, forcing any resulting thunk chain
/// to completion.
pub fn eval_top_level(env: &Rc<Environment>, expr: &Value) -> Result<Value, EvalError> {
    let result = eval(env, expr, true)?;
    Ok(crate::thunk::resolve_thunks(result))
}
