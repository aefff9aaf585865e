//! Error-tolerant recursive-descent parser.
//!
//! Productions return `Result<_, Bail>`. A production that hits a syntax
//! error records a diagnostic first and then returns `Err(Bail)`, so `?`
//! unwinds to the nearest statement loop, which synchronizes to the next
//! statement boundary and keeps going. Parsing therefore always yields the
//! statements it could build plus every diagnostic it collected.

mod expression;
mod statement;

use std::fmt;

use tracing::{debug, trace};

use crate::ast::{Block, Identifier, Statement};
use crate::cursor::{Mark, TokenCursor};
use crate::diagnostic::Diagnostic;
use crate::keywords;
use crate::token::{Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Token that cannot start or continue the current production.
    UnexpectedToken { found: String },
    /// A specific token was required.
    ExpectedToken {
        expected: &'static str,
        found: String,
    },
    /// A name was required.
    ExpectedIdentifier { found: String },
    /// Reserved word used where a variable name is required.
    ReservedIdentifier { name: String },
    /// Statement followed by something other than a separator.
    ExpectedStatementEnd { found: String },
    /// Block construct without its closing keyword.
    UnterminatedBlock {
        opener: &'static str,
        expected: &'static str,
    },
    /// Bracket never closed before the statement ran out.
    UnclosedDelimiter {
        open: &'static str,
        close: &'static str,
    },
    /// Expression in statement position that is not a call.
    ExpectedStatement,
    /// Left side of an assignment that cannot be assigned to.
    InvalidAssignmentTarget,
    /// Unknown name after `as`.
    InvalidType { found: String },
    /// Named function declared inside another function body.
    NestedFunction { name: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found } => {
                write!(f, "found unexpected token '{found}'")
            }
            Self::ExpectedToken { expected, found } => {
                write!(f, "expected {expected}, got '{found}'")
            }
            Self::ExpectedIdentifier { found } => {
                write!(f, "expected identifier, got '{found}'")
            }
            Self::ReservedIdentifier { name } => {
                write!(f, "cannot use reserved word '{name}' as an identifier")
            }
            Self::ExpectedStatementEnd { found } => {
                write!(f, "expected newline or ':' after statement, got '{found}'")
            }
            Self::UnterminatedBlock { opener, expected } => {
                write!(f, "'{opener}' block must be terminated with '{expected}'")
            }
            Self::UnclosedDelimiter { open, close } => {
                write!(f, "'{open}' is never closed, expected '{close}'")
            }
            Self::ExpectedStatement => {
                write!(
                    f,
                    "expected statement or function call, but received an expression"
                )
            }
            Self::InvalidAssignmentTarget => {
                write!(f, "invalid assignment target")
            }
            Self::InvalidType { found } => {
                write!(f, "'{found}' is not a valid type")
            }
            Self::NestedFunction { name } => {
                write!(
                    f,
                    "named function '{name}' cannot be declared inside another function"
                )
            }
        }
    }
}

/// Statements and syntax diagnostics for one token sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutput {
    pub statements: Vec<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a token sequence into statements.
///
/// The sequence does not need to come from the lexer; a missing trailing
/// `Eof` is tolerated. Never fails: syntax errors become diagnostics and
/// the statements that could be built are still returned.
#[must_use]
pub fn parse(tokens: &[Token]) -> ParseOutput {
    let mut parser = Parser::new(tokens);
    let statements = parser.parse_program();
    debug!(
        statements = statements.len(),
        diagnostics = parser.diagnostics.len(),
        "parsed program"
    );
    ParseOutput {
        statements,
        diagnostics: parser.diagnostics,
    }
}

/// Returned by a production after its diagnostic has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bail;

type PResult<T> = Result<T, Bail>;

/// Result of checking a token against local-variable legality.
enum LocalName {
    Allowed,
    Reserved,
    NotAName,
}

struct Parser {
    cursor: TokenCursor,
    diagnostics: Vec<Diagnostic>,
    /// Closing keywords of every open block, innermost last.
    terminators: Vec<&'static [TokenKind]>,
    /// Number of enclosing function bodies.
    function_depth: usize,
}

impl Parser {
    fn new(tokens: &[Token]) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            diagnostics: Vec::new(),
            terminators: Vec::new(),
            function_depth: 0,
        }
    }

    fn parse_program(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.cursor.is_at_end() {
                break;
            }
            if let Some(statement) = self.statement_or_recover() {
                statements.push(statement);
            }
        }
        statements
    }

    /// Parse statements until a closing keyword of this or any enclosing
    /// block, or end of input. The closing keyword is left for the caller.
    fn block(&mut self, terminators: &'static [TokenKind]) -> Block {
        self.terminators.push(terminators);
        let start = self.cursor.peek().span;
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.cursor.is_at_end() || self.at_block_end() {
                break;
            }
            if let Some(statement) = self.statement_or_recover() {
                statements.push(statement);
            }
        }
        self.terminators.pop();

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => Span::between(first.span(), last.span()),
            _ => Span::empty(start.start),
        };
        Block { statements, span }
    }

    /// Parse one statement and its terminator, synchronizing on failure.
    fn statement_or_recover(&mut self) -> Option<Statement> {
        let start = self.cursor.check_point();
        match self.statement() {
            Ok(statement) => {
                if !matches!(statement, Statement::Label(_)) {
                    self.finish_statement();
                }
                Some(statement)
            }
            Err(Bail) => {
                self.synchronize(start);
                None
            }
        }
    }

    /// Consume the separator after a statement. Comments and closing
    /// keywords end a statement too but are left in place.
    fn finish_statement(&mut self) {
        match self.kind() {
            TokenKind::Newline | TokenKind::Colon => {
                self.cursor.advance();
            }
            TokenKind::Eof | TokenKind::Comment => {}
            _ if self.at_block_end() => {}
            _ => {
                let start = self.cursor.check_point();
                let token = self.cursor.peek().clone();
                self.report(
                    ParseErrorKind::ExpectedStatementEnd {
                        found: describe(&token),
                    },
                    token.span,
                );
                self.synchronize(start);
            }
        }
    }

    /// Skip to the next statement boundary. Always makes progress when
    /// nothing was consumed since `start`.
    fn synchronize(&mut self, start: Mark) {
        let from = self.cursor.peek().span.start;
        if self.cursor.check_point() == start && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        let mut skipped = 0_usize;
        loop {
            match self.kind() {
                TokenKind::Newline | TokenKind::Colon => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof | TokenKind::Comment => break,
                _ if self.at_block_end() => break,
                _ => {
                    self.cursor.advance();
                    skipped += 1;
                }
            }
        }
        trace!(
            line = from.line,
            column = from.column,
            skipped,
            "synchronized after syntax error"
        );
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.kind(),
            TokenKind::Newline | TokenKind::Colon | TokenKind::Comment
        ) {
            self.cursor.advance();
        }
    }

    fn skip_newlines_and_comments(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.kind(), TokenKind::Newline | TokenKind::Comment) {
            self.cursor.advance();
            skipped = true;
        }
        skipped
    }

    /// Whether the current token closes an open block. A closing keyword
    /// followed by an assignment operator is being used as a variable.
    fn at_block_end(&self) -> bool {
        let kind = self.kind();
        self.terminators.iter().any(|set| set.contains(&kind))
            && !self.cursor.peek_at(1).kind.is_assignment_operator()
    }

    /// Consume the closing keyword of a block, or report the block as
    /// unterminated at its opening keyword. Returns the span that ends
    /// the construct either way.
    fn close_block(
        &mut self,
        closer: TokenKind,
        opener: &Token,
        opener_text: &'static str,
        expected: &'static str,
    ) -> Span {
        if self.check(closer) {
            return self.cursor.advance().span;
        }
        self.report(
            ParseErrorKind::UnterminatedBlock {
                opener: opener_text,
                expected,
            },
            opener.span,
        );
        self.cursor.previous().span
    }

    fn kind(&self) -> TokenKind {
        self.cursor.peek().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.cursor.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<Token> {
        if self.check(kind) {
            return Ok(self.cursor.advance());
        }
        let token = self.cursor.peek().clone();
        self.fail(
            ParseErrorKind::ExpectedToken {
                expected,
                found: describe(&token),
            },
            token.span,
        )
    }

    /// Require that the statement header ends here.
    fn expect_line_end(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::Newline | TokenKind::Colon | TokenKind::Comment | TokenKind::Eof => Ok(()),
            _ => {
                let token = self.cursor.peek().clone();
                self.fail(
                    ParseErrorKind::ExpectedStatementEnd {
                        found: describe(&token),
                    },
                    token.span,
                )
            }
        }
    }

    fn report(&mut self, kind: ParseErrorKind, span: Span) {
        self.diagnostics.push(Diagnostic::error(kind, span));
    }

    fn fail<T>(&mut self, kind: ParseErrorKind, span: Span) -> PResult<T> {
        self.report(kind, span);
        Err(Bail)
    }

    fn local_name(token: &Token) -> LocalName {
        match token.kind {
            TokenKind::Identifier if token.is_reserved => LocalName::Reserved,
            TokenKind::Identifier => LocalName::Allowed,
            kind if keywords::is_allowed_local_identifier(kind) => LocalName::Allowed,
            kind if keywords::is_disallowed_local_identifier(kind) => LocalName::Reserved,
            _ => LocalName::NotAName,
        }
    }

    /// Consume a name in local-variable position.
    fn local_identifier(&mut self) -> PResult<Identifier> {
        let token = self.cursor.peek().clone();
        match Self::local_name(&token) {
            LocalName::Allowed => {
                self.cursor.advance();
                Ok(Identifier::from_token(&token))
            }
            LocalName::Reserved => self.fail(
                ParseErrorKind::ReservedIdentifier { name: token.text },
                token.span,
            ),
            LocalName::NotAName => self.fail(
                ParseErrorKind::ExpectedIdentifier {
                    found: describe(&token),
                },
                token.span,
            ),
        }
    }
}

/// Human-readable rendering of a token for messages.
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Eof => "end of file".to_string(),
        _ => token.text.clone(),
    }
}
