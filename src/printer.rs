// ABOUTME: Printed representations backing the `repr`, `debug`, and the
// REPL's own result printing.

use crate::value::{cons_iter, Value};
use std::fmt::Write;

/// The canonical, re-readable form: strings are quoted, symbols and
/// numbers print bare, lists print as `(a b c)`.
pub fn repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(&mut out, value, false);
    out
}

/// The human-facing form used by `print!`: strings and symbols print
/// their raw text, unquoted; everything else matches `repr`.
pub fn display(value: &Value) -> String {
    let mut out = String::new();
    write_repr(&mut out, value, true);
    out
}

/// A string gets the backtick-delimited alternate form when a plain
/// `"..."` literal would need escapes: a literal quote or backslash,
/// or a control character with no escape in the string grammar.
fn needs_backtick_form(s: &str) -> bool {
    s.chars()
        .any(|c| c == '"' || c == '\\' || (c.is_control() && c != '\n' && c != '\t'))
}

fn push_backtick_quoted(out: &mut String, s: &str) {
    out.push('`');
    for c in s.chars() {
        if c == '`' {
            out.push_str("``");
        } else {
            out.push(c);
        }
    }
    out.push('`');
}

fn write_repr(out: &mut String, value: &Value, raw_strings: bool) {
    let value = crate::thunk::resolve_thunks(value.clone());
    match &value {
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Nil => out.push_str("()"),
        Value::Str(s) => {
            if raw_strings {
                out.push_str(s);
            } else if needs_backtick_form(s) {
                push_backtick_quoted(out, s);
            } else {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
        }
        Value::Symbol(s) => out.push_str(s),
        Value::Cons(cell) => {
            out.push('(');
            write_repr(out, &cell.head, raw_strings);
            let mut tail = crate::thunk::resolve_thunks(cell.tail.clone());
            loop {
                match tail {
                    Value::Nil => break,
                    Value::Cons(next) => {
                        out.push(' ');
                        write_repr(out, &next.head, raw_strings);
                        tail = crate::thunk::resolve_thunks(next.tail.clone());
                    }
                    other => {
                        out.push_str(" . ");
                        write_repr(out, &other, raw_strings);
                        break;
                    }
                }
            }
            out.push(')');
        }
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{key}: ");
                write_repr(out, &map[*key], raw_strings);
            }
            out.push('}');
        }
        Value::Builtin(b) => {
            let _ = write!(out, "<builtin {}>", b.name);
        }
        Value::Thunk(_) => unreachable!("resolved above"),
    }
}

pub fn list_to_vec(value: &Value) -> Vec<Value> {
    cons_iter(value.clone()).collect()
}
