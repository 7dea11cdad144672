// ABOUTME: Prints evaluation diagnostics to stderr without unwinding the
// evaluator — errors (besides `quit`) surface as `nil` at the point they
// occurred, after a message is printed here.

use crate::error::EvalError;

pub fn report(err: &EvalError) {
    eprintln!("Error: {err}");
}

/// Non-fatal diagnostic — used where the spec calls for a warning
/// rather than aborting the call (e.g. an out-of-range codepoint
/// passed to `str`).
pub fn warn(message: &str) {
    eprintln!("Warning: {message}");
}
