#![allow(dead_code)]

use brs_parser::{
    Diagnostic, ParseOutput, Position, Span, Statement, Token, TokenKind, parse_source,
};

/// Build a caller-constructed token on line 1, as a test harness would
/// without going through the lexer.
pub fn token(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text, Span::default())
}

pub fn identifier(name: &str) -> Token {
    token(TokenKind::Identifier, name)
}

pub fn eof() -> Token {
    token(TokenKind::Eof, "")
}

pub fn span(start: (usize, usize), end: (usize, usize)) -> Span {
    Span::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
}

/// Parse source text and fail with every diagnostic if there are any.
pub fn parse_clean(input: &str) -> Vec<Statement> {
    let output = parse_source(input);
    assert_no_diagnostics(input, &output);
    output.statements
}

pub fn assert_no_diagnostics(input: &str, output: &ParseOutput) {
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics for:\n{input}\n--- diagnostics ---\n{}",
        render(&output.diagnostics)
    );
}

pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
