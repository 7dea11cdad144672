// ABOUTME: Event/action queue plumbing for `start!`-primed programs — a
// FIFO of event objects dispatched to handlers looked up by name in the
// global frame, with side effects performed through a small table of
// named actions.

use crate::env::Environment;
use crate::value::{cons_iter, Value};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

fn object<const N: usize>(fields: [(&'static str, Value); N]) -> Value {
    let map: HashMap<String, Value> = fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    Value::Object(Rc::new(map))
}

/// Wraps an already-computed value so it appears literally in a call
/// form instead of being re-evaluated as code when that position runs.
fn literal(v: Value) -> Value {
    Value::list_from([Value::symbol("q"), v])
}

pub struct EventQueue {
    pending: VecDeque<Value>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { pending: VecDeque::new() }
    }

    pub fn push(&mut self, event: Value) {
        self.pending.push_back(event);
    }

    /// Runs the queue to completion: pops one event at a time, looks up
    /// its handler by name, invokes it with the event object as its
    /// single argument, and performs the action(s) it returns.
    pub fn run(&mut self, env: &Rc<Environment>) {
        while let Some(event) = self.pending.pop_front() {
            let name = match &event {
                Value::Object(map) => match map.get("name").and_then(|v| v.text().map(|s| s.to_string())) {
                    Some(n) => n,
                    None => continue,
                },
                _ => continue,
            };
            let Some(handler) = env.lookup(&name) else { continue };
            let call = Value::list_from([literal(handler), literal(event)]);
            let result = match crate::eval::eval_top_level(env, &call) {
                Ok(v) => v,
                Err(_) => return, // UserQuit: end the session cleanly.
            };
            self.perform(result);
        }
    }

    /// A single action object, or a list of them.
    fn perform(&mut self, action: Value) {
        let resolved = crate::thunk::resolve_thunks(action);
        match &resolved {
            Value::Nil | Value::Cons(_) => {
                for item in cons_iter(resolved) {
                    self.perform(item);
                }
            }
            Value::Object(map) => self.perform_one(&map.clone()),
            _ => {}
        }
    }

    fn perform_one(&mut self, action: &HashMap<String, Value>) {
        let Some(name) = action.get("name").and_then(|v| v.text().map(|s| s.to_string())) else { return };
        match name.as_str() {
            "print!" => {
                if let Some(v) = action.get("value") {
                    println!("{}", crate::printer::display(v));
                }
            }
            "write!" => {
                if let Some(v) = action.get("value") {
                    print!("{}", crate::printer::display(v));
                    let _ = std::io::stdout().flush();
                }
            }
            "print-error!" => {
                if let Some(v) = action.get("value") {
                    eprintln!("{}", crate::printer::display(v));
                }
            }
            "write-error!" => {
                if let Some(v) = action.get("value") {
                    eprint!("{}", crate::printer::display(v));
                    let _ = std::io::stderr().flush();
                }
            }
            "ask-line!" => {
                if let Some(prompt) = action.get("prompt") {
                    print!("{}", crate::printer::display(prompt));
                    let _ = std::io::stdout().flush();
                }
                let mut line = String::new();
                let typed = match std::io::stdin().read_line(&mut line) {
                    Ok(0) => Value::Nil,
                    Ok(_) => Value::string(line.trim_end_matches('\n').to_string()),
                    Err(_) => Value::Nil,
                };
                self.pending.push_back(object([
                    ("type", Value::string("Event")),
                    ("name", Value::string("receive-line!")),
                    ("line", typed),
                ]));
            }
            "exit!" => {
                let code = match action.get("exit-code") {
                    Some(Value::Int(n)) => *n as i32,
                    _ => 0,
                };
                std::process::exit(code);
            }
            other => crate::diagnostics::warn(&format!("unknown action {other}")),
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the event loop primed with a single `start!` event, matching
/// the top-level driver's event-based execution mode.
pub fn run_event_loop(env: &Rc<Environment>) {
    let mut queue = EventQueue::new();
    queue.push(object([("type", Value::string("Event")), ("name", Value::string("start!"))]));
    queue.run(env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unknown_event_name_is_skipped_without_panic() {
        let env = Environment::new(PathBuf::from("."));
        let mut q = EventQueue::new();
        q.push(object([("type", Value::string("Event")), ("name", Value::string("nonexistent!"))]));
        q.run(&env);
    }

    #[test]
    fn event_without_a_handler_is_skipped() {
        let env = Environment::new(PathBuf::from("."));
        let mut q = EventQueue::new();
        q.push(object([("type", Value::string("Event")), ("name", Value::string("start!"))]));
        q.run(&env);
    }

    #[test]
    fn print_action_is_performed() {
        let env = Environment::new(PathBuf::from("."));
        let mut q = EventQueue::new();
        q.perform(object([("name", Value::string("print!")), ("value", Value::string("hi"))]));
        let _ = &env;
    }
}
