//! Runtime errors for the interpreter

use crate::ast::Span;
use crate::error::render_diagnostic;
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Location of the expression that failed
    pub span: Option<Span>,
    /// Nearest enclosing named function of the failing expression
    pub function: Option<String>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value coerced to a variant it does not hold
    IncorrectType,
    /// Coercion attempted on `undefined`
    UndefinedValue,
    /// Argument count differs from parameter count
    ArityMismatch,
    /// `return` evaluated with no active call
    ReturnOutsideFunction,
    /// Reference to a name no visible frame binds
    UnboundIdentifier,
    /// Integer division by zero
    DivisionByZero,
    /// `?` could not read an integer
    InvalidInput,
    /// Call depth limit exceeded
    StackOverflow,
    /// Reading program input or writing program output failed
    Io,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
            function: None,
        }
    }

    pub fn incorrect_type(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::IncorrectType,
            format!("incorrect type: expected {expected}, got {got}"),
        )
    }

    pub fn undefined_value(expected: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedValue,
            format!("undefined value used where {expected} was expected"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn return_outside_function() -> Self {
        Self::new(
            ErrorKind::ReturnOutsideFunction,
            "return outside of a function".to_string(),
        )
    }

    pub fn unbound_identifier(name: &str) -> Self {
        Self::new(
            ErrorKind::UnboundIdentifier,
            format!("unbound identifier: {name}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn invalid_input(msg: &str) -> Self {
        Self::new(ErrorKind::InvalidInput, format!("invalid input: {msg}"))
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {limit}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {msg}"))
    }

    /// Attach a location unless a more precise one is already present
    pub fn at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Attach the enclosing function name unless already present
    pub fn in_function(mut self, name: Option<&str>) -> Self {
        if self.function.is_none() {
            self.function = name.map(str::to_string);
        }
        self
    }

    /// Render this error as an ariadne diagnostic against `source`
    pub fn render(&self, filename: &str, source: &str, color: bool) -> String {
        let message = match &self.function {
            Some(func) => format!("{} (in function {func})", self.message),
            None => self.message.clone(),
        };
        render_diagnostic(filename, source, "Runtime error", &message, self.span, color)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)?;
        if let Some(func) = &self.function {
            write!(f, " (in function {func})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;

/// Report a runtime error with ariadne on stderr
pub fn report_runtime_error(filename: &str, source: &str, error: &RuntimeError) {
    eprint!("{}", error.render(filename, source, true));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incorrect_type() {
        let err = RuntimeError::incorrect_type("int", "function");
        assert_eq!(err.kind, ErrorKind::IncorrectType);
        assert_eq!(err.message, "incorrect type: expected int, got function");
    }

    #[test]
    fn test_arity_mismatch_message_format() {
        let err = RuntimeError::arity_mismatch("add", 2, 1);
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert_eq!(err.message, "function add expects 2 argument(s), got 1");
    }

    #[test]
    fn test_unbound_identifier() {
        let err = RuntimeError::unbound_identifier("foo");
        assert_eq!(err.kind, ErrorKind::UnboundIdentifier);
        assert!(err.message.contains("foo"));
    }

    #[test]
    fn test_display() {
        let err = RuntimeError::division_by_zero();
        assert_eq!(err.to_string(), "Runtime error: division by zero");
    }

    #[test]
    fn test_display_with_function() {
        let err = RuntimeError::return_outside_function().in_function(Some("f"));
        assert_eq!(
            err.to_string(),
            "Runtime error: return outside of a function (in function f)"
        );
    }

    #[test]
    fn test_at_keeps_innermost_span() {
        let err = RuntimeError::division_by_zero()
            .at(Span::new(4, 9))
            .at(Span::new(0, 20));
        assert_eq!(err.span, Some(Span::new(4, 9)));
    }

    #[test]
    fn test_in_function_keeps_innermost_name() {
        let err = RuntimeError::division_by_zero()
            .in_function(Some("inner"))
            .in_function(Some("outer"));
        assert_eq!(err.function.as_deref(), Some("inner"));
    }

    #[test]
    fn test_render_points_at_span() {
        let source = "x = 1 / 0;";
        let err = RuntimeError::division_by_zero().at(Span::new(4, 9));
        let out = err.render("test.cl", source, false);
        assert!(out.contains("Runtime error"));
        assert!(out.contains("division by zero"));
        assert!(out.contains("test.cl:1:5"));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = RuntimeError::stack_overflow(10);
        let std_err: &dyn std::error::Error = &err;
        assert!(std_err.source().is_none());
    }
}
