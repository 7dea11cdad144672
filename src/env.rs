// ABOUTME: Environment — global frame, one-deep local frame stack, and module registry

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

pub type Frame = Rc<RefCell<HashMap<String, Value>>>;

pub fn new_frame() -> Frame {
    Rc::new(RefCell::new(HashMap::new()))
}

/// Owns the global frame, the stack of local frames pushed while a
/// user-call Thunk resolves, and the module loader's bookkeeping.
///
/// Only the topmost local frame is ever consulted — there is no
/// lexical parent chain. Each user call gets a fresh local frame that
/// lives only for the duration of that call's resolution.
pub struct Environment {
    global: RefCell<HashMap<String, Value>>,
    locals: RefCell<Vec<Frame>>,
    loaded_modules: RefCell<HashSet<PathBuf>>,
    module_path_stack: RefCell<Vec<PathBuf>>,
    repl_mode: std::cell::Cell<bool>,
}

impl Environment {
    pub fn new(initial_module_dir: PathBuf) -> Rc<Environment> {
        Rc::new(Environment {
            global: RefCell::new(HashMap::new()),
            locals: RefCell::new(Vec::new()),
            loaded_modules: RefCell::new(HashSet::new()),
            module_path_stack: RefCell::new(vec![initial_module_dir]),
            repl_mode: std::cell::Cell::new(false),
        })
    }

    pub fn set_repl_mode(&self, on: bool) {
        self.repl_mode.set(on);
    }

    pub fn repl_mode(&self) -> bool {
        self.repl_mode.get()
    }

    /// `def`: error on redefinition, otherwise binds globally.
    pub fn define_global(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut global = self.global.borrow_mut();
        if global.contains_key(name) {
            return Err(EvalError::name(format!("name {name} already in use")));
        }
        global.insert(name.to_string(), value);
        Ok(())
    }

    /// Used only at startup to install builtins; redefinition is not
    /// an error here since builtins are registered once, before any
    /// user code runs.
    pub fn define_builtin(&self, name: &str, value: Value) {
        self.global.borrow_mut().insert(name.to_string(), value);
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.global.borrow().contains_key(name)
    }

    /// Looks up `name`: topmost local frame first, then global.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(top) = self.locals.borrow().last() {
            if let Some(v) = top.borrow().get(name) {
                return Some(v.clone());
            }
        }
        self.global.borrow().get(name).cloned()
    }

    pub fn push_local(&self, frame: Frame) {
        self.locals.borrow_mut().push(frame);
    }

    pub fn pop_local(&self) {
        self.locals.borrow_mut().pop();
    }

    /// The quiet mode is active whenever a module load is in progress
    /// (the loader pushes its directory before executing module text).
    pub fn quiet(&self) -> bool {
        self.module_path_stack.borrow().len() > 1
    }

    pub fn current_module_dir(&self) -> PathBuf {
        self.module_path_stack
            .borrow()
            .last()
            .cloned()
            .expect("module path stack is never empty")
    }

    pub fn push_module_dir(&self, dir: PathBuf) {
        self.module_path_stack.borrow_mut().push(dir);
    }

    pub fn pop_module_dir(&self) {
        self.module_path_stack.borrow_mut().pop();
    }

    pub fn is_module_loaded(&self, path: &PathBuf) -> bool {
        self.loaded_modules.borrow().contains(path)
    }

    pub fn register_module(&self, path: PathBuf) {
        self.loaded_modules.borrow_mut().insert(path);
    }

    /// Used by `restart`: wipes every global binding, including builtins.
    /// The caller is responsible for re-registering builtins afterward.
    pub fn clear_global(&self) {
        self.global.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Rc<Environment> {
        Environment::new(PathBuf::from("."))
    }

    #[test]
    fn define_then_lookup_global() {
        let e = env();
        e.define_global("x", Value::Int(1)).unwrap();
        assert_eq!(e.lookup("x"), Some(Value::Int(1)));
    }

    #[test]
    fn redefining_a_global_is_an_error() {
        let e = env();
        e.define_global("x", Value::Int(1)).unwrap();
        assert!(e.define_global("x", Value::Int(2)).is_err());
        assert_eq!(e.lookup("x"), Some(Value::Int(1)));
    }

    #[test]
    fn local_frame_shadows_global_but_only_top_of_stack() {
        let e = env();
        e.define_global("x", Value::Int(1)).unwrap();
        let outer = new_frame();
        outer.borrow_mut().insert("x".to_string(), Value::Int(2));
        e.push_local(outer);
        let inner = new_frame();
        inner.borrow_mut().insert("y".to_string(), Value::Int(3));
        e.push_local(inner);
        // Only the top frame (with y, not x) and global are consulted.
        assert_eq!(e.lookup("y"), Some(Value::Int(3)));
        assert_eq!(e.lookup("x"), Some(Value::Int(1)));
        e.pop_local();
        assert_eq!(e.lookup("x"), Some(Value::Int(2)));
        e.pop_local();
        assert_eq!(e.lookup("x"), Some(Value::Int(1)));
    }

    #[test]
    fn quiet_tracks_module_depth() {
        let e = env();
        assert!(!e.quiet());
        e.push_module_dir(PathBuf::from("./sub"));
        assert!(e.quiet());
        e.pop_module_dir();
        assert!(!e.quiet());
    }
}
