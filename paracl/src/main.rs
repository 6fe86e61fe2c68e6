//! ParaCL interpreter CLI

use clap::Parser;
use paracl::error::{CompileError, report_error};
use paracl::interp::{Config, DEFAULT_MAX_CALL_DEPTH};
use paracl::{Ast, NodeId, RunError};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "paracl", version, about = "ParaCL interpreter")]
struct Cli {
    /// Program file; read from standard input when omitted
    file: Option<PathBuf>,

    /// Tokenize and dump tokens (debug)
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Parse and dump the AST as JSON (debug)
    #[arg(long)]
    ast: bool,

    /// Start the interactive REPL
    #[arg(long, conflicts_with_all = ["tokens", "ast", "file"])]
    repl: bool,

    /// Unbound identifiers evaluate to `undefined` instead of failing
    #[arg(long)]
    lenient: bool,

    /// Maximum call depth
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    paracl::logging::init_tracing();
    let cli = Cli::parse();

    let config = Config::default()
        .lenient(cli.lenient)
        .max_call_depth(cli.max_depth);

    if cli.repl {
        return match paracl::repl::Repl::new(config).and_then(|mut repl| repl.run()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let filename = cli
        .file
        .as_deref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    let source = match read_program(cli.file.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            report_error(&filename, "", &e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.tokens {
        tokenize_source(&source)
    } else if cli.ast {
        parse_source(&source)
    } else {
        run_source(&source, config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // The program unit is aborted, the process still exits normally
        Err(RunError::Runtime(e)) => {
            paracl::interp::report_runtime_error(&filename, &source, &e);
            ExitCode::SUCCESS
        }
        Err(RunError::Compile(e)) => {
            report_error(&filename, &source, &e);
            ExitCode::FAILURE
        }
    }
}

fn read_program(path: Option<&Path>) -> Result<String, CompileError> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CompileError::io_error(format!("{}: {e}", path.display()))),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn tokenize_source(source: &str) -> Result<(), RunError> {
    let tokens = paracl::lexer::tokenize(source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }
    Ok(())
}

#[derive(Serialize)]
struct AstDump<'a> {
    root: NodeId,
    ast: &'a Ast,
}

fn parse_source(source: &str) -> Result<(), RunError> {
    let mut ast = Ast::new();
    let root = paracl::parser::parse_source(&mut ast, source)?;

    let dump = AstDump { root, ast: &ast };
    let text = serde_json::to_string_pretty(&dump)
        .map_err(|e| CompileError::io_error(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run_source(source: &str, config: Config) -> Result<(), RunError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    paracl::run_source(source, stdin.lock(), stdout.lock(), config)?;
    Ok(())
}
