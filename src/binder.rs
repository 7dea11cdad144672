// ABOUTME: Parameter binder — positional, optional-with-default, and rest-style binding
// Shared by user-function calls (via Thunk) and user-macro expansion (via the rewriter).

use crate::env::{Environment, Frame};
use crate::error::EvalError;
use crate::value::{cons_iter, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Which calling convention produced the arguments, and therefore how
/// they should be bound and how errors should be worded.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ProcKind {
    Function,
    Macro,
}

impl ProcKind {
    fn word(self) -> &'static str {
        match self {
            ProcKind::Function => "function",
            ProcKind::Macro => "macro",
        }
    }
}

pub enum Args {
    /// Function call: arguments already evaluated, in order.
    Evaluated(Vec<Value>),
    /// Macro call: the raw, unevaluated cons list forming the call's tail.
    Raw(Value),
}

/// Binds `param_spec` against `args` into `target`.
///
/// For function calls, `target` should already be pushed as the
/// environment's top local frame, so that default expressions
/// evaluated partway through binding can see earlier-bound parameters
/// (the spec: "evaluated in the *current* environment... after
/// required parameters are bound"). For macro calls, `target` is a
/// bare substitution map that is never pushed onto the environment;
/// default expressions for optional macro parameters are evaluated
/// against whatever environment is ambient at the macro-expansion
/// site, matching the modeled interpreter's own behavior.
pub fn bind_params(
    env: &Rc<Environment>,
    param_spec: Value,
    args: Args,
    kind: ProcKind,
    target: &Frame,
) -> Result<(), EvalError> {
    let param_spec = crate::thunk::resolve_thunks(param_spec);
    match param_spec {
        Value::Symbol(name) => {
            bind_rest_name(env, &name, args, kind, target);
            Ok(())
        }
        Value::Nil | Value::Cons(_) => bind_entries(env, param_spec, args, kind, target),
        other => Err(EvalError::shape(format!(
            "parameters must either be name or list of names, not {}",
            other.type_name()
        ))),
    }
}

fn bind_rest_name(
    env: &Rc<Environment>,
    name: &str,
    args: Args,
    kind: ProcKind,
    target: &Frame,
) {
    if env.is_global(name) {
        eprintln!("Warning: {} parameter name shadows global name {name}", kind.word());
    }
    let bound = match (kind, args) {
        (ProcKind::Function, Args::Evaluated(values)) => Value::list_from(values),
        (ProcKind::Macro, Args::Raw(raw)) => {
            // Wrap in a quote form so that substituting this name into
            // the macro body and evaluating it yields the raw argument
            // list verbatim, rather than attempting to call it.
            Value::cons(
                Value::symbol("q"),
                Value::cons(raw, Value::Nil),
            )
        }
        _ => unreachable!("Args variant must match ProcKind"),
    };
    target.borrow_mut().insert(name.to_string(), bound);
}

fn bind_entries(
    env: &Rc<Environment>,
    param_list: Value,
    args: Args,
    kind: ProcKind,
    target: &Frame,
) -> Result<(), EvalError> {
    let mut required_count = 0usize;
    let mut optional_count = 0usize;
    let mut arg_count = 0usize;
    let mut seen_optional = false;

    let mut names = cons_iter(param_list);
    let mut raw_args_iter;
    let mut eval_args_iter;
    let mut use_raw = false;
    match &args {
        Args::Raw(_) => use_raw = true,
        Args::Evaluated(_) => {}
    }
    match args {
        Args::Raw(raw) => {
            raw_args_iter = cons_iter(raw);
            eval_args_iter = Vec::new().into_iter();
        }
        Args::Evaluated(values) => {
            eval_args_iter = values.into_iter();
            raw_args_iter = cons_iter(Value::Nil);
        }
    }

    loop {
        let name_entry = names.next();
        let arg_entry = if use_raw { raw_args_iter.next() } else { eval_args_iter.next() };
        if name_entry.is_none() && arg_entry.is_none() {
            break;
        }
        match name_entry {
            None => {
                // Ran out of parameter names; this argument is extra.
                arg_count += 1;
            }
            Some(name_val) => {
                let name_val = crate::thunk::resolve_thunks(name_val);
                match &name_val {
                    Value::Cons(_) => {
                        // (name default) pair.
                        let parts: Vec<Value> = cons_iter(name_val.clone()).collect();
                        if parts.len() != 2 {
                            return Err(EvalError::shape(if parts.len() > 2 {
                                "too many elements in parameter default value specification list".to_string()
                            } else {
                                format!(
                                    "missing default value for {}",
                                    crate::printer::repr(&parts.get(0).cloned().unwrap_or(Value::Nil))
                                )
                            }));
                        }
                        let name = match &parts[0] {
                            Value::Symbol(s) | Value::Str(s) => s.clone(),
                            other => {
                                return Err(EvalError::shape(format!(
                                    "parameter list must contain names, not {}",
                                    other.type_name()
                                )))
                            }
                        };
                        if env.is_global(&name) {
                            eprintln!("Warning: {} parameter name shadows global name {name}", kind.word());
                        }
                        match arg_entry {
                            Some(arg) => {
                                target.borrow_mut().insert(name.to_string(), arg);
                                arg_count += 1;
                            }
                            None => {
                                let default_expr = parts[1].clone();
                                // Mirrors `eval`'s own contract: any error besides
                                // `quit` is already reported and downgraded to nil
                                // by the time this returns, so binding proceeds.
                                let value = crate::eval::eval(env, &default_expr, false)?;
                                target.borrow_mut().insert(name.to_string(), value);
                            }
                        }
                        optional_count += 1;
                        seen_optional = true;
                    }
                    Value::Symbol(s) => {
                        if seen_optional {
                            return Err(EvalError::shape(format!(
                                "required parameter {s} must come before optional parameters"
                            )));
                        }
                        if env.is_global(s) {
                            eprintln!("Warning: {} parameter name shadows global name {s}", kind.word());
                        }
                        match arg_entry {
                            Some(arg) => {
                                target.borrow_mut().insert(s.to_string(), arg);
                                required_count += 1;
                                arg_count += 1;
                            }
                            None => {
                                required_count += 1;
                            }
                        }
                    }
                    Value::Nil => {
                        return Err(EvalError::shape(
                            "parameter list must contain names, not ()".to_string(),
                        ));
                    }
                    other => {
                        return Err(EvalError::shape(format!(
                            "parameter list must contain names, not {}",
                            other.type_name()
                        )));
                    }
                }
            }
        }
    }

    let min_count = required_count;
    let max_count = required_count + optional_count;
    if arg_count < min_count {
        return Err(EvalError::arity_at_least(kind.word(), min_count, arg_count));
    }
    if arg_count > max_count {
        return Err(EvalError::arity_at_most(kind.word(), max_count, arg_count));
    }
    Ok(())
}

/// Walks `expression`, replacing any `Symbol` that appears as a key in
/// `bindings` with its bound value; leaves all other atoms and
/// non-bound symbols untouched; recurses into lists.
pub fn substitute(bindings: &HashMap<String, Value>, expression: Value) -> Value {
    match expression {
        Value::Cons(cell) => Value::cons(
            substitute(bindings, cell.head.clone()),
            substitute(bindings, cell.tail.clone()),
        ),
        Value::Symbol(ref s) => bindings.get(s.as_ref()).cloned().unwrap_or(expression),
        other => other,
    }
}
