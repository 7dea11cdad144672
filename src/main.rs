use aslisp::config::{self, BUILTINS_SUMMARY, HELP_TEXT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use aslisp::env::Environment;
use aslisp::highlighter::LispHelper;
use aslisp::{builtins, events, eval, parser, printer};
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::rc::Rc;

/// A homoiconic, thunk-evaluated Lisp interpreter.
#[derive(ClapParser, Debug)]
#[command(name = "aslisp")]
#[command(version = config::VERSION)]
#[command(about = "A homoiconic Lisp with tail-call-safe thunks and lazy list tails")]
struct CliArgs {
    /// Script file to execute. Starts the REPL if omitted.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    if let Some(script_path) = args.script {
        let dir = script_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let env = Environment::new(dir);
        builtins::register_all(&env);
        run_script(&script_path, &env)?;
        return Ok(());
    }

    run_repl()
}

fn run_script(path: &PathBuf, env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {e}", path.display()))?;
    let forms = parser::parse_program(&source).map_err(|e| format!("parse error: {e}"))?;
    for form in forms {
        if eval::eval_top_level(env, &form).is_err() {
            // UserQuit: end the script cleanly.
            return Ok(());
        }
    }
    // Definitions have run; hand control to any `start!` handler.
    events::run_event_loop(env);
    Ok(())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let env = Environment::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    env.set_repl_mode(true);
    builtins::register_all(&env);

    let repl_config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(repl_config)
        .map_err(|e| format!("failed to initialize REPL: {e}"))?;
    rl.set_helper(Some(LispHelper::new()));

    let history_file = ".aslisp_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    loop {
        let mut buffer = String::new();
        let mut prompt = "aslisp> ";
        let expr = loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if buffer.is_empty() && line.trim().is_empty() {
                        break None;
                    }
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);
                    if parser::is_complete(&buffer) {
                        break Some(buffer.clone());
                    }
                    prompt = "      ... ";
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    buffer.clear();
                    prompt = "aslisp> ";
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("\nGoodbye!");
                    let _ = rl.save_history(history_file);
                    return Ok(());
                }
                Err(e) => return Err(Box::new(e)),
            }
        };

        let Some(source) = expr else { continue };
        match source.trim() {
            "(quit)" | "(exit)" => {
                println!("Goodbye!");
                break;
            }
            "(help)" => {
                println!("{HELP_TEXT}\n{BUILTINS_SUMMARY}");
                continue;
            }
            _ => {}
        }

        match parser::parse_one(&source) {
            Ok((form, _)) => match eval::eval_top_level(&env, &form) {
                Ok(result) => println!("=> {}", printer::repr(&result)),
                Err(_) => {
                    println!("Goodbye!");
                    break;
                }
            },
            Err(e) => eprintln!("Parse error: {e}"),
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
