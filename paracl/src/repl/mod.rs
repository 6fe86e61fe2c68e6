//! REPL (Read-Eval-Print Loop) for ParaCL

use crate::ast::Ast;
use crate::interp::{Config, Interpreter, Value};
use crate::parser::parse_source;
use crate::RunError;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::{self, BufRead, Read, Stdout, Write};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".paracl_history";
const SOURCE_NAME: &str = "<repl>";

/// Programs entered one after another, sharing one arena and one global frame
pub struct Session<R, W> {
    ast: Ast,
    interpreter: Interpreter<R, W>,
    /// Every line entered so far; node spans index into this text
    transcript: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Session {
            ast: Ast::new(),
            interpreter: Interpreter::with_config(input, output, config),
            transcript: String::new(),
        }
    }

    /// Parse `source` into the session arena and run it
    pub fn eval(&mut self, source: &str) -> Result<Value, RunError> {
        let offset = self.transcript.len();
        self.transcript.push_str(source);
        self.transcript.push('\n');

        let first = self.ast.len();
        let root = parse_source(&mut self.ast, source).map_err(|err| err.offset(offset))?;
        self.ast.shift_spans(first, offset);
        Ok(self.interpreter.execute(&self.ast, root)?)
    }

    /// Render an error returned by [`Session::eval`].
    ///
    /// A function defined on an earlier line can fail when a later line calls
    /// it, so errors are rendered against the whole transcript.
    pub fn render(&self, err: &RunError, color: bool) -> String {
        err.render(SOURCE_NAME, &self.transcript, color)
    }

    /// Forget all variables and functions
    pub fn reset(&mut self) {
        self.interpreter.reset();
        self.ast = Ast::new();
        self.transcript.clear();
    }

    pub fn interpreter(&self) -> &Interpreter<R, W> {
        &self.interpreter
    }
}

/// Line-buffered input that borrows its source only while a line is read.
///
/// The editor reads commands from the same standard input between `?`
/// reads, so the stdin lock must not be held across `readline`.
pub struct LineInput<F> {
    read_line: F,
    line: Vec<u8>,
    pos: usize,
}

impl<F: FnMut(&mut Vec<u8>) -> io::Result<usize>> LineInput<F> {
    /// `read_line` appends one line to the buffer and returns its length,
    /// 0 at end of input
    pub fn new(read_line: F) -> Self {
        LineInput {
            read_line,
            line: Vec::new(),
            pos: 0,
        }
    }
}

impl<F: FnMut(&mut Vec<u8>) -> io::Result<usize>> Read for LineInput<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let mut available = self.fill_buf()?;
            available.read(buf)?
        };
        self.consume(n);
        Ok(n)
    }
}

impl<F: FnMut(&mut Vec<u8>) -> io::Result<usize>> BufRead for LineInput<F> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.line.len() {
            self.line.clear();
            self.pos = 0;
            (self.read_line)(&mut self.line)?;
        }
        Ok(&self.line[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.line.len());
    }
}

type StdinLine = fn(&mut Vec<u8>) -> io::Result<usize>;

fn read_stdin_line(buf: &mut Vec<u8>) -> io::Result<usize> {
    io::stdin().lock().read_until(b'\n', buf)
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session<LineInput<StdinLine>, Stdout>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new(config: Config) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let input = LineInput::new(read_stdin_line as StdinLine);
        let session = Session::new(input, io::stdout(), config);

        // Try to find history file in home directory
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            session,
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("ParaCL REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    if let Err(err) = self.session.eval(line) {
                        eprint!("{}", self.session.render(&err, true));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :). Returns true to exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":reset" => {
                self.session.reset();
                println!("All variables and functions cleared.");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }
}

fn print_help() {
    println!("ParaCL REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :reset          Clear all variables and functions");
    println!();
    println!("You can enter:");
    println!("  - Assignments: x = 2 * 21;");
    println!("  - Output: print x;");
    println!("  - Functions: sq = func(n) : sq {{ return n * n; }};");
    println!("  - Control flow: while (x > 0) {{ print x; x = x - 1; }}");
    println!("  - Input: y = ?;");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
