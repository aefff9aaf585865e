//! Lexer, error-tolerant parser, and diagnostics for BrightScript source.
//!
//! Source text is scanned into location-annotated tokens, and tokens are
//! parsed into a typed AST. Neither stage stops at the first problem:
//! both return their best-effort output together with every diagnostic
//! they collected, each carrying the exact span it applies to.
//!
//! # Quick start
//!
//! ## Parse a program and inspect diagnostics
//!
//! ```
//! use brs_parser::{Statement, parse_source};
//!
//! let output = parse_source("while true\n  print \"hi\"\n  exit while\nend while\n");
//! assert!(output.diagnostics.is_empty());
//! assert!(matches!(output.statements[0], Statement::While(_)));
//! ```
//!
//! ## Keep going past syntax errors
//!
//! ```
//! use brs_parser::parse_source;
//!
//! let output = parse_source("else = true\nx = 1\n");
//! assert_eq!(output.diagnostics.len(), 1);
//! assert_eq!(output.statements.len(), 1);
//! ```
//!
//! ## Strict parsing
//!
//! ```
//! use brs_parser::{Error, parse_str};
//!
//! assert!(parse_str("x = 1 + 2").is_ok());
//! assert!(matches!(parse_str("x = \"open"), Err(Error::Lex(_))));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod cursor;
pub mod diagnostic;
pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Block, Expression, Identifier, Statement};
pub use cursor::{Mark, TokenCursor};
pub use diagnostic::{Diagnostic, Severity};
pub use keywords::{Classification, classify, lookup};
pub use lexer::{LexErrorKind, ScanOutput, scan};
pub use parser::{ParseErrorKind, ParseOutput, parse};
pub use token::{Literal, Position, Span, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer diagnostic.
    #[error("{0}")]
    Lex(Diagnostic),
    /// A parser diagnostic.
    #[error("{0}")]
    Parse(Diagnostic),
}

/// Scan and parse source text in one step.
///
/// Lexical diagnostics come first in the returned list, followed by
/// syntax diagnostics.
#[must_use]
pub fn parse_source(input: &str) -> ParseOutput {
    let scanned = scan(input);
    let mut parsed = parse(&scanned.tokens);
    let mut diagnostics = scanned.diagnostics;
    diagnostics.append(&mut parsed.diagnostics);
    ParseOutput {
        statements: parsed.statements,
        diagnostics,
    }
}

/// Scan and parse source text, failing on the first diagnostic.
pub fn parse_str(input: &str) -> Result<Vec<Statement>, Error> {
    let scanned = scan(input);
    if let Some(diagnostic) = scanned.diagnostics.into_iter().next() {
        return Err(Error::Lex(diagnostic));
    }
    let parsed = parse(&scanned.tokens);
    if let Some(diagnostic) = parsed.diagnostics.into_iter().next() {
        return Err(Error::Parse(diagnostic));
    }
    Ok(parsed.statements)
}
