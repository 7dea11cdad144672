// ABOUTME: Module loader — resolves `.asl` paths relative to the loading
// module's directory, skips modules already loaded, and executes each
// top-level form of a freshly loaded module through the evaluator.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn resolve_path(env: &Rc<Environment>, requested: &str) -> PathBuf {
    let mut path = PathBuf::from(requested);
    if path.extension().is_none() {
        path.set_extension("asl");
    }
    if path.is_relative() {
        env.current_module_dir().join(path)
    } else {
        path
    }
}

/// Implements `load`: a no-op (with a message, unless quiet) if the
/// module was already loaded; otherwise reads, parses, and executes it.
pub fn load(env: &Rc<Environment>, requested: &str) -> Result<Value, EvalError> {
    let path = resolve_path(env, requested);
    let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());

    if env.is_module_loaded(&canonical) {
        if !env.quiet() {
            println!("Already loaded `{requested}`");
        }
        return Ok(Value::Nil);
    }

    let source = std::fs::read_to_string(&path)
        .map_err(|e| EvalError::resource(format!("could not load {}: {e}", path.display())))?;

    let forms = crate::parser::parse_program(&source)?;

    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    env.push_module_dir(dir);
    env.register_module(canonical);
    for form in forms {
        crate::eval::eval_top_level(env, &form)?;
    }
    env.pop_module_dir();

    if !env.quiet() {
        println!("Loaded `{requested}`");
    }
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loading_missing_module_is_a_resource_error() {
        let env = Environment::new(PathBuf::from("."));
        let err = load(&env, "/no/such/module").unwrap_err();
        assert!(matches!(err, EvalError::Resource(_)));
    }

    #[test]
    fn loading_twice_is_a_no_op_the_second_time() {
        let dir = std::env::temp_dir().join(format!("aslisp-loader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("mod.asl");
        std::fs::File::create(&file).unwrap().write_all(b"(def loaded-marker 1)").unwrap();

        let env = Environment::new(dir);
        crate::builtins::register_all(&env);
        load(&env, "mod.asl").unwrap();
        // Second load should not error (already-loaded no-op), even
        // though re-`def`ining `loaded-marker` would be.
        load(&env, "mod.asl").unwrap();
    }
}
