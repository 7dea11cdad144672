//! Built-in operators, organized by category.
//!
//! Each category module exposes `register(env)`, which installs its
//! bindings and documentation entries. [`register_all`] wires every
//! category into a fresh environment at startup.

use crate::env::Environment;
use crate::value::{Builtin, BuiltinDispatch, Value};
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
#[path = "strings.rs"]
pub mod textops;
pub mod types;
pub mod lists;
pub mod object;
pub mod special;

/// Installs a function-convention builtin (arguments pre-evaluated).
pub(crate) fn define_function(
    env: &Rc<Environment>,
    name: &'static str,
    dispatch: BuiltinDispatch,
    min_arity: usize,
    max_arity: Option<usize>,
) {
    env.define_builtin(
        name,
        Value::Builtin(Rc::new(Builtin {
            name,
            dispatch,
            min_arity,
            max_arity,
            top_level_only: false,
            repl_only: false,
        })),
    );
}

/// Installs a macro-convention builtin (raw, unevaluated arguments),
/// with explicit top-level/REPL-only flags.
#[allow(clippy::too_many_arguments)]
pub(crate) fn define_macro(
    env: &Rc<Environment>,
    name: &'static str,
    dispatch: BuiltinDispatch,
    min_arity: usize,
    max_arity: Option<usize>,
    top_level_only: bool,
    repl_only: bool,
) {
    env.define_builtin(
        name,
        Value::Builtin(Rc::new(Builtin {
            name,
            dispatch,
            min_arity,
            max_arity,
            top_level_only,
            repl_only,
        })),
    );
}

fn with_builtin(env: &Rc<Environment>, name: &str, f: impl FnOnce(&mut Builtin)) {
    if let Some(Value::Builtin(b)) = env.lookup(name) {
        let mut copy = (*b).clone();
        f(&mut copy);
        env.define_builtin(name, Value::Builtin(Rc::new(copy)));
    }
}

pub(crate) fn set_top_level_only(env: &Rc<Environment>, name: &str) {
    with_builtin(env, name, |b| b.top_level_only = true);
}

pub(crate) fn set_repl_only(env: &Rc<Environment>, name: &str) {
    with_builtin(env, name, |b| b.repl_only = true);
}

/// Registers every builtin category into `env`.
pub fn register_all(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    types::register(env);
    textops::register(env);
    lists::register(env);
    object::register(env);
    special::register(env);
}
