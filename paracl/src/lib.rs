//! ParaCL interpreter library
//!
//! A tree-walking interpreter for a small imperative language with integer
//! and float arithmetic, block scoping, `while`/`if` and first-class
//! functions that see only their own frame plus the global one.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod repl;

pub use ast::{Ast, NodeId, Span};
pub use error::{CompileError, Result};
pub use interp::{Config, InterpResult, Interpreter, RuntimeError, Value};

use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Failure of a complete run: either the program was rejected or it failed
/// while running
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl RunError {
    /// Render as an ariadne diagnostic against `source`
    pub fn render(&self, filename: &str, source: &str, color: bool) -> String {
        match self {
            RunError::Compile(err) => err.render(filename, source, color),
            RunError::Runtime(err) => err.render(filename, source, color),
        }
    }
}

/// Parse and run `source`, reading `?` from `input` and printing to `output`
pub fn run_source<R: BufRead, W: Write>(
    source: &str,
    input: R,
    output: W,
    config: Config,
) -> std::result::Result<Value, RunError> {
    let mut ast = Ast::new();
    let root = parser::parse_source(&mut ast, source)?;
    let mut interp = Interpreter::with_config(input, output, config);
    Ok(interp.execute(&ast, root)?)
}

/// Run an already parsed program against standard input and output
pub fn execute(ast: &Ast, root: NodeId) -> InterpResult<Value> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut interp = Interpreter::new(stdin.lock(), stdout.lock());
    interp.execute(ast, root)
}
