//! Parser implementation using lalrpop
//!
//! The grammar only ever builds nodes through the `Ast::make_*` factories, so
//! several programs can be parsed into the same arena (the REPL relies on it).

use crate::ast::{Ast, NodeId, Span};
use crate::error::{CompileError, Result};
use crate::lexer::{Token, tokenize};


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

/// Parse tokens into `ast`, returning the root scope
pub fn parse(ast: &mut Ast, tokens: Vec<(Token, Span)>) -> Result<NodeId> {
    let end = tokens.last().map_or(0, |(_, span)| span.end);
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    grammar::ProgramParser::new()
        .parse(ast, token_iter)
        .map_err(|e| match e {
            lalrpop_util::ParseError::InvalidToken { location } => {
                CompileError::parser("invalid token", Span::new(location, location + 1))
            }
            lalrpop_util::ParseError::UnrecognizedEof { expected, .. } => CompileError::parser(
                format!("unexpected end of input{}", expected_hint(&expected)),
                Span::new(end, end),
            ),
            lalrpop_util::ParseError::UnrecognizedToken { token, expected } => {
                CompileError::parser(
                    format!("unexpected `{}`{}", token.1, expected_hint(&expected)),
                    Span::new(token.0, token.2),
                )
            }
            lalrpop_util::ParseError::ExtraToken { token } => CompileError::parser(
                format!("extra token `{}`", token.1),
                Span::new(token.0, token.2),
            ),
            lalrpop_util::ParseError::User { error } => error,
        })
}

/// Tokenize and parse `source` into `ast`
pub fn parse_source(ast: &mut Ast, source: &str) -> Result<NodeId> {
    let tokens = tokenize(source)?;
    parse(ast, tokens)
}

fn expected_hint(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected one of {}", expected.join(", "))
    }
}
