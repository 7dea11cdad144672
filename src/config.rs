// ABOUTME: Version info and REPL welcome text.

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "aslisp";
pub const WELCOME_SUBTITLE: &str = "a homoiconic, thunk-evaluated Lisp";

pub const HELP_TEXT: &str = r#"
Available commands:
  (quit)               - Exit the REPL
  (help)               - Show this help message
  (help name)          - Show documentation for one builtin
  (restart)            - Clear all global bindings and reload builtins

Type any expression to evaluate it. Use Ctrl-D or (quit) to exit.
"#;

pub const BUILTINS_SUMMARY: &str = r#"
Special Forms:  def q if eval load help restart quit
Arithmetic:     add sub mul div mod
Comparison:     less? equal?
Lists:          cons head tail
Objects:        object has-property? get-property copy
Text:           str repr debug bool chars
Types:          type

Type (help) for more information.
"#;
