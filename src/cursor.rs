//! Token stream cursor with checkpoint/restore.

use crate::token::{Position, Span, Token, TokenKind};

/// Saved read position, produced by [`TokenCursor::check_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

/// Sequential read-only view over an owned token buffer.
///
/// The buffer always ends with an `Eof` token: one is appended when the
/// input lacks it, so peeking past the end keeps returning `Eof`.
/// Restoring a mark only moves the read index; tokens are never mutated.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    #[must_use]
    pub fn new(tokens: &[Token]) -> Self {
        let mut tokens = tokens.to_vec();
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let at = tokens.last().map_or(Position::new(1, 0), |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, "", Span::empty(at)));
        }
        Self { tokens, pos: 0 }
    }

    /// The current token.
    #[must_use]
    pub fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// The token `offset` places ahead, clamped to `Eof`.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    /// The most recently consumed token, or the current one at the start.
    #[must_use]
    pub fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Consume and return the current token. At `Eof` the cursor stays
    /// put and keeps returning `Eof`.
    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    #[must_use]
    pub const fn check_point(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn restore(&mut self, mark: Mark) {
        debug_assert!(mark.0 < self.tokens.len(), "mark outside token buffer");
        self.pos = mark.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, Span::default())
    }

    #[test]
    fn appends_missing_eof() {
        let cursor = TokenCursor::new(&[ident("a")]);
        assert_eq!(cursor.peek_at(1).kind, TokenKind::Eof);
        assert_eq!(cursor.peek_at(10).kind, TokenKind::Eof);
    }

    #[test]
    fn empty_input_is_just_eof() {
        let mut cursor = TokenCursor::new(&[]);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.advance().kind, TokenKind::Eof);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn restore_moves_back() {
        let mut cursor = TokenCursor::new(&[ident("a"), ident("b")]);
        let mark = cursor.check_point();
        assert_eq!(cursor.advance().text, "a");
        assert_eq!(cursor.advance().text, "b");
        assert_eq!(cursor.previous().text, "b");
        cursor.restore(mark);
        assert_eq!(cursor.peek().text, "a");
    }
}
