use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use lson::{parse_all, to_json_string};
use lson_runtime::{DEFAULT_MAX_DEPTH, EvalOptions, RequestError, Session, render_error};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, fmt};

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".lson_history";

/// LSON - a Lisp whose programs are JSON
#[derive(Parser, Debug)]
#[command(name = "lson")]
#[command(about = "Evaluate LSON expressions", long_about = None)]
struct Args {
    /// File holding a stream of JSON expressions to evaluate in order
    file: Option<PathBuf>,

    /// Evaluate a single expression and print the result
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// Maximum evaluation nesting before failing
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Do not load or save REPL history
    #[arg(long)]
    no_history: bool,
}

fn init_logging() {
    // LSON_LOG controls the filter; default to warnings only
    let filter = EnvFilter::try_from_env("LSON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn repl(mut session: Session, use_history: bool) -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error: cannot start line editor: {e}");
            return ExitCode::FAILURE;
        }
    };

    let history = use_history
        .then(dirs::home_dir)
        .flatten()
        .map(|home| home.join(HISTORY_FILE));
    if let Some(path) = &history {
        if let Err(e) = editor.load_history(path) {
            tracing::debug!(error = %e, path = %path.display(), "no history loaded");
        }
    }

    println!("LSON");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = editor.add_history_entry(line) {
                    tracing::debug!(error = %e, "history entry dropped");
                }
                match session.eval_line(line) {
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("{}", render_error(&e)),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            tracing::warn!(error = %e, path = %path.display(), "failed to save history");
        }
    }
    ExitCode::SUCCESS
}

fn run_file(session: &mut Session, path: &Path) -> Result<Option<String>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {e}", path.display()))?;

    let mut last_result = None;
    for exp in parse_all(&contents) {
        let exp = exp.map_err(|e| render_error(&RequestError::from(e)))?;
        let value = session
            .eval_value(&exp)
            .map_err(|e| render_error(&e))?;
        last_result = Some(value);
    }

    last_result
        .map(|value| to_json_string(&value).map_err(|e| render_error(&RequestError::from(e))))
        .transpose()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let options = EvalOptions {
        max_depth: args.max_depth,
    };
    let mut session = match Session::new(options) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", render_error(&RequestError::from(e)));
            return ExitCode::FAILURE;
        }
    };

    if let Some(expr) = &args.eval {
        return match session.eval_line(expr) {
            Ok(result) => {
                println!("{result}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", render_error(&e));
                ExitCode::FAILURE
            }
        };
    }

    if let Some(path) = &args.file {
        return match run_file(&mut session, path) {
            Ok(result) => {
                if let Some(result) = result {
                    println!("{result}");
                }
                ExitCode::SUCCESS
            }
            Err(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        };
    }

    repl(session, !args.no_history)
}
