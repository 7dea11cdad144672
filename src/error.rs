// ABOUTME: Error classification for evaluation failures, per the error handling design
// Every kind but UserQuit reports a diagnostic and yields nil; UserQuit is the one sentinel
// that is allowed to unwind to the driver.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Parser-level warning: unterminated string, unmatched close paren.
    /// The parser repairs best-effort and continues.
    #[error("{0}")]
    Parse(String),

    /// A list wasn't shaped like a callable, or a parameter entry was
    /// ill-formed (e.g. a default-value list with the wrong arity).
    #[error("{0}")]
    Shape(String),

    /// Wrong operand kind to a primitive, or comparing incompatible kinds.
    #[error("{0}")]
    Type(String),

    /// Arity violation. `subject` is either a builtin's display name or
    /// the bare word "function"/"macro" (when the binder itself is
    /// complaining, before any particular builtin is known). `expected`
    /// is a human-readable range such as "at least 1" or "2".
    #[error("{subject} takes {expected} argument{plural}, got {actual}")]
    Arity {
        subject: String,
        expected: String,
        actual: usize,
        plural: &'static str,
    },

    /// Unbound symbol, or redefinition of an already-`def`ined name.
    #[error("{0}")]
    Name(String),

    /// Module not found or unreadable; `load` becomes a no-op.
    #[error("{0}")]
    Resource(String),

    /// Native stack depth exceeded during non-tail recursion.
    #[error("stack depth exceeded evaluating {0}; this language only guarantees O(1) \
             stack growth for calls in tail position")]
    HostExhaustion(String),

    /// Raised only by `quit`; the one error that is allowed to unwind
    /// to the driver instead of surfacing as `nil`.
    #[error("quit")]
    UserQuit,
}

impl EvalError {
    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::Type(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        EvalError::Shape(message.into())
    }

    pub fn name(message: impl Into<String>) -> Self {
        EvalError::Name(message.into())
    }

    pub fn resource(message: impl Into<String>) -> Self {
        EvalError::Resource(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        EvalError::Parse(message.into())
    }

    pub fn arity_at_least(subject: impl Into<String>, min: usize, actual: usize) -> Self {
        EvalError::Arity {
            subject: subject.into(),
            expected: format!("at least {min}"),
            actual,
            plural: if min == 1 { "" } else { "s" },
        }
    }

    pub fn arity_at_most(subject: impl Into<String>, max: usize, actual: usize) -> Self {
        EvalError::Arity {
            subject: subject.into(),
            expected: format!("at most {max}"),
            actual,
            plural: if max == 1 { "" } else { "s" },
        }
    }

    pub fn arity_exact(subject: impl Into<String>, exact: usize, actual: usize) -> Self {
        EvalError::Arity {
            subject: subject.into(),
            expected: exact.to_string(),
            actual,
            plural: if exact == 1 { "" } else { "s" },
        }
    }

    /// Is this the sentinel that should unwind instead of reporting?
    pub fn is_quit(&self) -> bool {
        matches!(self, EvalError::UserQuit)
    }
}
