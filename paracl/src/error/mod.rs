//! Error types and reporting

use crate::ast::Span;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Front-end error: reading, lexing or parsing a program
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } | Self::Parser { message, .. } | Self::Io { message } => {
                message
            }
        }
    }

    /// The same error with its span moved `delta` bytes later
    pub fn offset(self, delta: usize) -> Self {
        match self {
            Self::Lexer { message, span } => Self::Lexer {
                message,
                span: span.offset(delta),
            },
            Self::Parser { message, span } => Self::Parser {
                message,
                span: span.offset(delta),
            },
            io @ Self::Io { .. } => io,
        }
    }

    /// Render this error as an ariadne diagnostic against `source`
    pub fn render(&self, filename: &str, source: &str, color: bool) -> String {
        let headline = format!("{} error", self.kind_name());
        render_diagnostic(
            filename,
            source,
            &headline,
            self.message(),
            self.span(),
            color,
        )
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lexer",
            Self::Parser { .. } => "Parser",
            Self::Io { .. } => "IO",
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Render a diagnostic for `source` to a string.
///
/// With a span the offending range is labelled; otherwise only the headline
/// is printed. Spans are byte offsets, as produced by the lexer.
pub fn render_diagnostic(
    filename: &str,
    source: &str,
    headline: &str,
    message: &str,
    span: Option<Span>,
    color: bool,
) -> String {
    let range = span.map_or(0..0, |s| s.start..s.end);
    let mut builder = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_config(
            Config::default()
                .with_color(color)
                .with_index_type(IndexType::Byte),
        );

    match span {
        Some(_) => {
            builder = builder.with_message(headline).with_label(
                Label::new((filename, range))
                    .with_message(message)
                    .with_color(Color::Red),
            );
        }
        None => {
            builder = builder.with_message(format!("{headline}: {message}"));
        }
    }

    let mut out = Vec::new();
    if builder
        .finish()
        .write((filename, Source::from(source)), &mut out)
        .is_err()
    {
        return format!("{headline}: {message}\n");
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Report a front-end error with ariadne on stderr
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    eprint!("{}", error.render(filename, source, true));
}
