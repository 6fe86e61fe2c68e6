//! Tree-walking evaluator
//!
//! Every node evaluates to a [`Flow`]: either a normal value, or a value
//! travelling up from a `return` statement towards the nearest call.

use super::config::{Config, UnboundPolicy};
use super::error::{InterpResult, RuntimeError};
use super::ops;
use super::scope::{Frame, ScopeStack};
use super::value::{FunctionRef, Value};
use crate::ast::{Ast, NodeId, NodeKind};
use std::collections::{HashSet, VecDeque};
use std::io::{BufRead, Write};

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Result of evaluating a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    /// Evaluation completed with a value
    Normal(Value),
    /// A `return` is unwinding towards the enclosing call
    Return(Value),
}

impl Flow {
    pub fn value(self) -> Value {
        match self {
            Flow::Normal(v) | Flow::Return(v) => v,
        }
    }
}

/// Unwrap a normal value, propagating a `Return` flow to the caller
macro_rules! value {
    ($flow:expr) => {
        match $flow? {
            Flow::Normal(v) => v,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    };
}

/// The interpreter
pub struct Interpreter<R, W> {
    scopes: ScopeStack,
    config: Config,
    /// Named function literals already bound into the global frame
    bound: HashSet<NodeId>,
    input: R,
    output: W,
    /// Unread tokens of the last input line
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    /// Create an interpreter reading `?` from `input` and printing to `output`
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, Config::default())
    }

    pub fn with_config(input: R, output: W, config: Config) -> Self {
        Interpreter {
            scopes: ScopeStack::new(),
            config,
            bound: HashSet::new(),
            input,
            output,
            pending: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Forget all globals and function bindings
    pub fn reset(&mut self) {
        self.scopes.reset();
        self.bound.clear();
        self.pending.clear();
    }

    /// Run a program rooted at `root` in the global frame.
    ///
    /// Globals survive between calls, so several programs parsed into the same
    /// arena can be run one after another. The call stack is unwound first,
    /// which leaves the interpreter usable after an error.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root))]
    pub fn execute(&mut self, ast: &Ast, root: NodeId) -> InterpResult<Value> {
        self.scopes.unwind();
        let result = match ast.kind(root) {
            NodeKind::Scope { blocks } => self.eval(ast, *blocks),
            _ => self.eval(ast, root),
        };
        self.scopes.unwind();
        let flushed = self.flush();
        let value = result?.value();
        flushed?;
        tracing::debug!(globals = self.scopes.globals().len(), "program finished");
        Ok(value)
    }

    /// Evaluate a node with automatic stack growth
    pub fn eval(&mut self, ast: &Ast, id: NodeId) -> InterpResult<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(ast, id))
            .map_err(|err| locate(ast, id, err))
    }

    fn eval_inner(&mut self, ast: &Ast, id: NodeId) -> InterpResult<Flow> {
        tracing::trace!(node = %id, kind = ast.kind(id).name(), "eval");
        let value = match ast.kind(id) {
            NodeKind::Int(n) => Value::Int(*n),
            NodeKind::Float(x) => Value::Float(*x),
            NodeKind::Id(name) => self.lookup(name)?,
            NodeKind::Qmark => Value::Int(self.read_int()?),

            NodeKind::Assign { name, value } => {
                let v = value!(self.eval(ast, *value));
                self.scopes.assign(name, v);
                v
            }

            NodeKind::Apply { callee, args } => return self.eval_apply(ast, *callee, *args),

            NodeKind::BinOp { op, lhs, rhs } => {
                let left = value!(self.eval(ast, *lhs));
                let right = value!(self.eval(ast, *rhs));
                ops::binary(*op, left, right)?
            }

            NodeKind::UnOp { op, operand } => {
                let v = value!(self.eval(ast, *operand));
                ops::unary(*op, v)?
            }

            NodeKind::Func { body, params, name } => {
                let func = Value::Function(FunctionRef {
                    body: *body,
                    params: *params,
                });
                if let Some(name) = name {
                    if self.bound.insert(id) {
                        tracing::debug!(%name, node = %id, "binding function");
                        self.scopes.define_global(name.clone(), func);
                    }
                }
                func
            }

            NodeKind::Scope { blocks } => {
                self.scopes.push_frame();
                tracing::trace!(frames = self.scopes.depth(), "push frame");
                let result = self.eval(ast, *blocks);
                self.scopes.pop_frame();
                tracing::trace!(frames = self.scopes.depth(), "pop frame");
                return result;
            }

            NodeKind::BlockList(items) => {
                let mut last = Value::Undefined;
                for &item in items {
                    last = value!(self.eval(ast, item));
                }
                last
            }

            NodeKind::While { cond, body } => {
                let mut last = Value::Undefined;
                loop {
                    let c = value!(self.eval(ast, *cond));
                    if !c.is_truthy()? {
                        break;
                    }
                    last = value!(self.eval(ast, *body));
                }
                last
            }

            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let c = value!(self.eval(ast, *cond));
                if c.is_truthy()? {
                    return self.eval(ast, *then_branch);
                }
                match else_branch {
                    Some(branch) => return self.eval(ast, *branch),
                    None => Value::Undefined,
                }
            }

            NodeKind::Return(operand) => {
                let v = value!(self.eval(ast, *operand));
                if self.scopes.call_depth() == 0 {
                    return Err(RuntimeError::return_outside_function());
                }
                return Ok(Flow::Return(v));
            }

            NodeKind::Print(operand) => {
                let v = value!(self.eval(ast, *operand));
                self.print(v)?;
                v
            }

            NodeKind::ExprList(_) | NodeKind::DeclList(_) | NodeKind::Empty => Value::Undefined,
        };
        Ok(Flow::Normal(value))
    }

    fn lookup(&self, name: &str) -> InterpResult<Value> {
        match self.scopes.resolve(name) {
            Some(v) => Ok(v),
            None => match self.config.unbound {
                UnboundPolicy::Error => Err(RuntimeError::unbound_identifier(name)),
                UnboundPolicy::Undefined => Ok(Value::Undefined),
            },
        }
    }

    fn eval_apply(&mut self, ast: &Ast, callee: NodeId, args: NodeId) -> InterpResult<Flow> {
        let func = value!(self.eval(ast, callee)).as_function()?;

        let arg_ids: &[NodeId] = match ast.kind(args) {
            NodeKind::ExprList(items) => items,
            _ => &[],
        };
        let mut values = Vec::with_capacity(arg_ids.len());
        for &arg in arg_ids {
            values.push(value!(self.eval(ast, arg)));
        }

        let params: &[String] = match ast.kind(func.params) {
            NodeKind::DeclList(names) => names,
            _ => &[],
        };
        if params.len() != values.len() {
            return Err(RuntimeError::arity_mismatch(
                function_name(ast, func, callee),
                params.len(),
                values.len(),
            ));
        }

        let frame: Frame = params.iter().cloned().zip(values).collect();
        self.call_function(ast, func, frame).map(Flow::Normal)
    }

    /// Run a function body in a fresh activation
    fn call_function(&mut self, ast: &Ast, func: FunctionRef, frame: Frame) -> InterpResult<Value> {
        let depth = self.scopes.call_depth();
        if depth >= self.config.max_call_depth {
            return Err(RuntimeError::stack_overflow(self.config.max_call_depth));
        }

        tracing::debug!(depth = depth + 1, body = %func.body, "enter call");
        self.scopes.enter_call(frame);
        let result = self.eval(ast, func.body);
        self.scopes.leave_call();
        tracing::debug!(depth, "leave call");

        result.map(Flow::value)
    }

    fn print(&mut self, v: Value) -> InterpResult<()> {
        // Only numbers are printable
        v.as_float()?;
        writeln!(self.output, "{v}").map_err(|e| RuntimeError::io_error(&e.to_string()))
    }

    /// Read one whitespace-delimited integer from the input
    fn read_int(&mut self) -> InterpResult<i64> {
        self.flush()?;
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token.parse().map_err(|_| {
                    RuntimeError::invalid_input(&format!("expected an integer, got {token:?}"))
                });
            }
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| RuntimeError::io_error(&e.to_string()))?;
            if read == 0 {
                return Err(RuntimeError::invalid_input("unexpected end of input"));
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn flush(&mut self) -> InterpResult<()> {
        self.output
            .flush()
            .map_err(|e| RuntimeError::io_error(&e.to_string()))
    }
}

/// Attach the location of `id` to an error that has none yet
fn locate(ast: &Ast, id: NodeId, err: RuntimeError) -> RuntimeError {
    if err.span.is_some() {
        return err;
    }
    err.at(ast.span(id))
        .in_function(ast.enclosing_function_name(id))
}

/// Name used for a function in diagnostics
fn function_name<'a>(ast: &'a Ast, func: FunctionRef, callee: NodeId) -> &'a str {
    let declared = ast.parent(func.body).and_then(|node| match ast.kind(node) {
        NodeKind::Func {
            name: Some(name), ..
        } => Some(name.as_str()),
        _ => None,
    });
    match (declared, ast.kind(callee)) {
        (Some(name), _) => name,
        (None, NodeKind::Id(name)) => name,
        (None, _) => "<anonymous>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::interp::ErrorKind;
    use crate::parser::parse_source;

    fn run_with(source: &str, input: &str, config: Config) -> (InterpResult<Value>, String) {
        let mut ast = Ast::new();
        let root = parse_source(&mut ast, source).unwrap();
        let mut interp = Interpreter::with_config(input.as_bytes(), Vec::new(), config);
        let result = interp.execute(&ast, root);
        (result, String::from_utf8(interp.into_output()).unwrap())
    }

    fn run(source: &str) -> (InterpResult<Value>, String) {
        run_with(source, "", Config::default())
    }

    fn output(source: &str) -> String {
        let (result, out) = run(source);
        result.unwrap();
        out
    }

    fn error(source: &str) -> RuntimeError {
        run(source).0.unwrap_err()
    }

    #[test]
    fn test_print_arithmetic() {
        assert_eq!(output("print 1 + 2 * 3;"), "7\n");
        assert_eq!(output("print (1 + 2) * 3;"), "9\n");
        assert_eq!(output("print -7 / 2;"), "-3\n");
    }

    #[test]
    fn test_execute_returns_last_value() {
        let (result, _) = run("x = 4; x * 2;");
        assert_eq!(result.unwrap(), Value::Int(8));
        let (result, _) = run("");
        assert_eq!(result.unwrap(), Value::Undefined);
    }

    #[test]
    fn test_float_output() {
        assert_eq!(output("print 1 + 0.5;"), "1.5\n");
        assert_eq!(output("print 1.0 / 0;"), "inf\n");
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(output("i = 0; while (i < 3) { print i; i = i + 1; }"), "0\n1\n2\n");
    }

    #[test]
    fn test_if_else() {
        assert_eq!(output("if (0) print 1; else print 2;"), "2\n");
        assert_eq!(output("if (1) print 1; else print 2;"), "1\n");
        assert_eq!(output("if (0) print 1;"), "");
    }

    #[test]
    fn test_block_local_is_dropped() {
        let err = error("{ y = 1; } print y;");
        assert_eq!(err.kind, ErrorKind::UnboundIdentifier);
    }

    #[test]
    fn test_block_assigns_outer_variable() {
        assert_eq!(output("x = 1; { x = 2; } print x;"), "2\n");
    }

    #[test]
    fn test_function_call() {
        let src = "add = func(a, b) { return a + b; }; print add(2, 3);";
        assert_eq!(output(src), "5\n");
    }

    #[test]
    fn test_function_without_return_yields_last_value() {
        assert_eq!(output("f = func(x) { x * 10; }; print f(4);"), "40\n");
    }

    #[test]
    fn test_return_exits_loop() {
        let src = "f = func(n) { i = 0; while (1) { if (i == n) return i; i = i + 1; } };
                   print f(5);";
        assert_eq!(output(src), "5\n");
    }

    #[test]
    fn test_named_function_recursion() {
        let src = "fact = func(n) : fact { if (n <= 1) return 1; return n * fact(n - 1); };
                   print fact(5);";
        assert_eq!(output(src), "120\n");
    }

    #[test]
    fn test_named_function_binds_globally_from_call() {
        let src = "mk = func() { g = func() : g { return 7; }; return 0; };
                   mk(); print g();";
        assert_eq!(output(src), "7\n");
    }

    #[test]
    fn test_function_cannot_see_caller_locals() {
        let src = "f = func() { return hidden; }; { hidden = 1; print f(); }";
        let err = error(src);
        assert_eq!(err.kind, ErrorKind::UnboundIdentifier);
    }

    #[test]
    fn test_parameters_do_not_leak() {
        let src = "f = func(x) { x = x + 1; return x; }; x = 10; print f(1); print x;";
        assert_eq!(output(src), "2\n10\n");
    }

    #[test]
    fn test_arity_mismatch_skips_body() {
        let src = "f = func(a, b) { print 99; return a; }; f(1);";
        let (result, out) = run(src);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert!(err.message.contains("function f expects 2 argument(s), got 1"));
        assert_eq!(out, "");
    }

    #[test]
    fn test_too_many_arguments_skips_body() {
        let (result, out) = run("f = func(a, b) { print 99; return a; }; f(1, 2, 3);");
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert!(err.message.contains("expects 2 argument(s), got 3"));
        assert_eq!(out, "");
    }

    #[test]
    fn test_calling_a_number() {
        let err = error("x = 1; x(2);");
        assert_eq!(err.kind, ErrorKind::IncorrectType);
    }

    #[test]
    fn test_return_outside_function() {
        let src = "x = 1;\nreturn x;";
        let err = error(src);
        assert_eq!(err.kind, ErrorKind::ReturnOutsideFunction);
        assert_eq!(err.span, Some(Span::new(7, 16)));
    }

    #[test]
    fn test_error_names_enclosing_function() {
        let src = "bad = func() : bad { return 1 / 0; }; bad();";
        let err = error(src);
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.function.as_deref(), Some("bad"));
        assert_eq!(err.span, Some(Span::new(28, 33)));
    }

    #[test]
    fn test_lenient_unbound_is_undefined() {
        let config = Config::default().lenient(true);
        let (result, _) = run_with("y = nope;", "", config);
        assert_eq!(result.unwrap(), Value::Undefined);

        let (result, _) = run_with("print nope + 1;", "", config);
        assert_eq!(result.unwrap_err().kind, ErrorKind::UndefinedValue);
    }

    #[test]
    fn test_read_input() {
        let src = "a = ?; b = ?; print a + b;";
        let (result, out) = run_with(src, "3\n  4\n", Config::default());
        result.unwrap();
        assert_eq!(out, "7\n");

        let (result, out) = run_with("print ? * ?;", "6 7", Config::default());
        result.unwrap();
        assert_eq!(out, "42\n");
    }

    #[test]
    fn test_read_invalid_input() {
        let (result, _) = run_with("x = ?;", "abc\n", Config::default());
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidInput);
        let (result, _) = run_with("x = ?;", "", Config::default());
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_call_depth_limit() {
        let config = Config::default().max_call_depth(50);
        let src = "f = func(n) : f { return f(n + 1); }; f(0);";
        let (result, _) = run_with(src, "", config);
        assert_eq!(result.unwrap_err().kind, ErrorKind::StackOverflow);
    }

    #[test]
    fn test_print_function_is_error() {
        let err = error("f = func() { return 1; }; print f;");
        assert_eq!(err.kind, ErrorKind::IncorrectType);
    }

    #[test]
    fn test_interpreter_reusable_after_error() {
        let mut ast = Ast::new();
        let mut interp = Interpreter::new(&b""[..], Vec::new());

        let first = parse_source(&mut ast, "x = 5; f = func() { return 1 / 0; }; f();").unwrap();
        assert!(interp.execute(&ast, first).is_err());
        assert_eq!(interp.scopes().call_depth(), 0);

        let second = parse_source(&mut ast, "print x;").unwrap();
        interp.execute(&ast, second).unwrap();
        assert_eq!(interp.output(), b"5\n");
    }

    #[test]
    fn test_reset_forgets_functions() {
        let mut ast = Ast::new();
        let mut interp = Interpreter::new(&b""[..], Vec::new());
        let root = parse_source(&mut ast, "g = func() : g { return 1; };").unwrap();
        interp.execute(&ast, root).unwrap();
        assert!(interp.scopes().contains("g"));

        interp.reset();
        assert!(!interp.scopes().contains("g"));
        interp.execute(&ast, root).unwrap();
        assert!(interp.scopes().contains("g"));
    }
}
