use std::fmt;

use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::keywords;
use crate::token::{Literal, Position, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// String literal not closed before the end of its line.
    UnterminatedString,
    /// Numeric literal that cannot be represented.
    InvalidNumber(String),
    /// `&h` with no hex digits after it.
    InvalidHexLiteral(String),
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal at end of line")
            }
            Self::InvalidNumber(text) => {
                write!(f, "invalid numeric literal: {text}")
            }
            Self::InvalidHexLiteral(text) => {
                write!(f, "invalid hex literal: {text}")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch}")
            }
        }
    }
}

/// Tokens and lexical diagnostics for one source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan source text into tokens.
///
/// Never fails: malformed literals produce a diagnostic and a best-effort
/// token, unknown characters produce a diagnostic and are skipped. The
/// token list always ends with an `Eof` token.
#[must_use]
pub fn scan(input: &str) -> ScanOutput {
    let output = Lexer::new(input).scan();
    debug!(
        tokens = output.tokens.len(),
        diagnostics = output.diagnostics.len(),
        "scanned source"
    );
    output
}

/// First words of the spellings that may continue with a second word.
const TWO_WORD_PREFIXES: &[&str] = &["end", "exit", "else", "for"];

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    col: usize,
}

struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    /// Open `{` count, for telling a `rem` key from a `rem` comment.
    brace_depth: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        let start = if source.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self {
            source,
            input: source.as_bytes(),
            pos: start,
            line: 1,
            col: 0,
            brace_depth: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn scan(mut self) -> ScanOutput {
        while let Some(ch) = self.peek() {
            match ch {
                b'\n' | b'\r' => self.read_newline(),
                b' ' | b'\t' => {
                    self.advance();
                }
                b'\'' => {
                    let mark = self.mark();
                    self.read_comment(mark);
                }
                b'"' => self.read_string(),
                b'0'..=b'9' => self.read_number(),
                b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.read_number();
                }
                b'&' if matches!(self.peek_at(1), Some(b'h' | b'H')) => self.read_hex(),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.read_word(),
                _ => self.read_operator(),
            }
        }

        let here = self.position();
        self.tokens
            .push(Token::new(TokenKind::Eof, "", Span::empty(here)));

        ScanOutput {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    const fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.col,
        }
    }

    const fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    const fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.col = mark.col;
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Step over one byte. Newlines are handled by `read_newline`, so
    /// only columns move here; UTF-8 continuation bytes share the column
    /// of their lead byte.
    fn advance(&mut self) {
        if let Some(byte) = self.peek() {
            if byte & 0xC0 != 0x80 {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn previous_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }

    fn push(&mut self, kind: TokenKind, start: Mark, literal: Option<Literal>) {
        let text = &self.source[start.pos..self.pos];
        let span = Span::new(Position::new(start.line, start.col), self.position());
        let mut token = Token::new(kind, text, span);
        token.literal = literal;
        self.tokens.push(token);
    }

    fn error(&mut self, kind: LexErrorKind, start: Mark) {
        let span = Span::new(Position::new(start.line, start.col), self.position());
        self.diagnostics.push(Diagnostic::error(kind, span));
    }

    fn read_newline(&mut self) {
        let start = self.mark();
        if self.peek() == Some(b'\r') {
            self.advance();
            if self.peek() == Some(b'\n') {
                self.advance();
            }
        } else {
            self.advance();
        }
        self.push(TokenKind::Newline, start, None);
        self.line += 1;
        self.col = 0;
    }

    /// Consume through end of line. `start` may lie before the current
    /// position when a `rem` keyword has already been read.
    fn read_comment(&mut self, start: Mark) {
        self.advance_while(|c| c != b'\n' && c != b'\r');
        self.push(TokenKind::Comment, start, None);
    }

    fn read_string(&mut self) {
        let start = self.mark();
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => {
                    self.error(LexErrorKind::UnterminatedString, start);
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    if self.peek() == Some(b'"') {
                        value.push('"');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {
                    let from = self.pos;
                    self.advance();
                    self.advance_while(|c| c & 0xC0 == 0x80);
                    value.push_str(&self.source[from..self.pos]);
                }
            }
        }

        self.push(TokenKind::StringLiteral, start, Some(Literal::String(value)));
    }

    fn read_number(&mut self) {
        let start = self.mark();
        let mut is_float = false;
        let mut is_double = false;

        self.advance_while(|c| c.is_ascii_digit());
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        if let Some(exp @ (b'e' | b'E' | b'd' | b'D')) = self.peek() {
            let signed = matches!(self.peek_at(1), Some(b'+' | b'-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                is_double = matches!(exp, b'd' | b'D');
                self.advance();
                if signed {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }

        let digits = self.source[start.pos..self.pos].replace(['d', 'D'], "e");
        let suffix = match self.peek() {
            Some(c @ (b'%' | b'!' | b'#' | b'&')) => {
                self.advance();
                Some(c)
            }
            _ => None,
        };

        let (kind, literal) = match suffix {
            Some(b'%') if !is_float => (
                TokenKind::IntegerLiteral,
                digits.parse().ok().map(Literal::Integer),
            ),
            Some(b'&') if !is_float => (
                TokenKind::LongIntegerLiteral,
                digits.parse().ok().map(Literal::LongInteger),
            ),
            Some(b'!') => (
                TokenKind::FloatLiteral,
                digits.parse().ok().map(Literal::Float),
            ),
            Some(b'#') => (
                TokenKind::DoubleLiteral,
                digits.parse().ok().map(Literal::Double),
            ),
            Some(_) => (TokenKind::IntegerLiteral, None),
            None if is_float => {
                if is_double || significant_digits(&digits) > 7 {
                    (
                        TokenKind::DoubleLiteral,
                        digits.parse().ok().map(Literal::Double),
                    )
                } else {
                    (
                        TokenKind::FloatLiteral,
                        digits.parse().ok().map(Literal::Float),
                    )
                }
            }
            None => digits.parse::<i32>().map_or_else(
                |_| {
                    (
                        TokenKind::LongIntegerLiteral,
                        digits.parse().ok().map(Literal::LongInteger),
                    )
                },
                |value| (TokenKind::IntegerLiteral, Some(Literal::Integer(value))),
            ),
        };

        if literal.is_none() {
            let text = self.source[start.pos..self.pos].to_string();
            self.error(LexErrorKind::InvalidNumber(text), start);
        }
        self.push(kind, start, literal.or_else(|| Some(zero_literal(kind))));
    }

    #[allow(clippy::cast_possible_wrap)]
    fn read_hex(&mut self) {
        let start = self.mark();
        self.advance(); // &
        self.advance(); // h
        let digits_start = self.pos;
        self.advance_while(|c| c.is_ascii_hexdigit());
        let digits = &self.source[digits_start..self.pos];

        let long = self.peek() == Some(b'&');
        if long {
            self.advance();
        }

        if digits.is_empty() {
            let text = self.source[start.pos..self.pos].to_string();
            self.error(LexErrorKind::InvalidHexLiteral(text), start);
            self.push(TokenKind::IntegerLiteral, start, Some(Literal::Integer(0)));
            return;
        }

        let (kind, literal) = if long {
            (
                TokenKind::LongIntegerLiteral,
                u64::from_str_radix(digits, 16)
                    .ok()
                    .map(|v| Literal::LongInteger(v as i64)),
            )
        } else {
            (
                TokenKind::IntegerLiteral,
                u32::from_str_radix(digits, 16)
                    .ok()
                    .map(|v| Literal::Integer(v as i32)),
            )
        };

        if literal.is_none() {
            let text = self.source[start.pos..self.pos].to_string();
            self.error(LexErrorKind::InvalidHexLiteral(text), start);
        }
        self.push(kind, start, literal.or_else(|| Some(zero_literal(kind))));
    }

    fn read_word(&mut self) {
        let start = self.mark();
        self.advance_while(is_identifier_byte);

        if matches!(self.peek(), Some(b'$' | b'%' | b'!' | b'#' | b'&')) {
            self.advance();
            self.push(TokenKind::Identifier, start, None);
            return;
        }

        let after_dot = self.previous_kind() == Some(TokenKind::Dot);
        let key_position = self.brace_depth > 0
            && matches!(
                self.previous_kind(),
                Some(TokenKind::LeftBrace | TokenKind::Comma | TokenKind::Colon)
            )
            && self.literal_closes_on_this_line();
        let word = &self.source[start.pos..self.pos];

        if !after_dot
            && TWO_WORD_PREFIXES
                .iter()
                .any(|prefix| prefix.eq_ignore_ascii_case(word))
            && matches!(self.peek(), Some(b' ' | b'\t'))
            && self.try_second_word(start)
        {
            return;
        }

        match keywords::lookup(word) {
            Some(TokenKind::Rem) if after_dot || key_position => {
                self.push(TokenKind::Identifier, start, None);
            }
            Some(TokenKind::Rem) => self.read_comment(start),
            Some(kind) => {
                let literal = match kind {
                    TokenKind::True => Some(Literal::Boolean(true)),
                    TokenKind::False => Some(Literal::Boolean(false)),
                    TokenKind::Invalid => Some(Literal::Invalid),
                    _ => None,
                };
                self.push(kind, start, literal);
            }
            None => self.push(TokenKind::Identifier, start, None),
        }
    }

    /// Whether the rest of the line closes the innermost open `{`.
    /// Braces inside strings and after a `'` comment do not count.
    fn literal_closes_on_this_line(&self) -> bool {
        let mut depth = 0_usize;
        let mut in_string = false;
        for &c in &self.input[self.pos..] {
            if in_string {
                match c {
                    b'\n' | b'\r' => return false,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                b'\n' | b'\r' | b'\'' => return false,
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' if depth == 0 => return true,
                b'}' => depth -= 1,
                _ => {}
            }
        }
        false
    }

    /// Try to extend the word starting at `start` into a two-word keyword
    /// such as `end while`. Restores the position if no keyword matches.
    fn try_second_word(&mut self, start: Mark) -> bool {
        let first_end = self.mark();
        self.advance_while(|c| c == b' ' || c == b'\t');
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.reset(first_end);
            return false;
        }
        self.advance_while(is_identifier_byte);

        let words = &self.source[start.pos..self.pos];
        match keywords::lookup(words) {
            Some(kind) if words.contains([' ', '\t']) => {
                self.push(kind, start, None);
                true
            }
            _ => {
                self.reset(first_end);
                false
            }
        }
    }

    fn read_operator(&mut self) {
        let start = self.mark();
        let Some(ch) = self.peek() else {
            return;
        };
        let next = self.peek_at(1);
        let third = self.peek_at(2);

        let (kind, len) = match (ch, next) {
            (b'(', _) => (TokenKind::LeftParen, 1),
            (b')', _) => (TokenKind::RightParen, 1),
            (b'[', _) => (TokenKind::LeftSquare, 1),
            (b']', _) => (TokenKind::RightSquare, 1),
            (b'{', _) => (TokenKind::LeftBrace, 1),
            (b'}', _) => (TokenKind::RightBrace, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b'?', _) => (TokenKind::Question, 1),
            (b'@', _) => (TokenKind::At, 1),
            (b'^', _) => (TokenKind::Caret, 1),
            (b'=', _) => (TokenKind::Equal, 1),
            (b'+', Some(b'+')) => (TokenKind::PlusPlus, 2),
            (b'+', Some(b'=')) => (TokenKind::PlusEqual, 2),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', Some(b'-')) => (TokenKind::MinusMinus, 2),
            (b'-', Some(b'=')) => (TokenKind::MinusEqual, 2),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', Some(b'=')) => (TokenKind::StarEqual, 2),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', Some(b'=')) => (TokenKind::SlashEqual, 2),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'\\', Some(b'=')) => (TokenKind::BackslashEqual, 2),
            (b'\\', _) => (TokenKind::Backslash, 1),
            (b'<', Some(b'<')) if third == Some(b'=') => (TokenKind::LeftShiftEqual, 3),
            (b'<', Some(b'<')) => (TokenKind::LeftShift, 2),
            (b'<', Some(b'=')) => (TokenKind::LessEqual, 2),
            (b'<', Some(b'>')) => (TokenKind::LessGreater, 2),
            (b'<', _) => (TokenKind::Less, 1),
            (b'>', Some(b'>')) if third == Some(b'=') => (TokenKind::RightShiftEqual, 3),
            (b'>', Some(b'>')) => (TokenKind::RightShift, 2),
            (b'>', Some(b'=')) => (TokenKind::GreaterEqual, 2),
            (b'>', _) => (TokenKind::Greater, 1),
            _ => {
                let unexpected = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                self.advance();
                self.advance_while(|c| c & 0xC0 == 0x80);
                self.error(LexErrorKind::UnexpectedCharacter(unexpected), start);
                return;
            }
        };

        match kind {
            TokenKind::LeftBrace => self.brace_depth += 1,
            TokenKind::RightBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        for _ in 0..len {
            self.advance();
        }
        self.push(kind, start, None);
    }
}

const fn is_identifier_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Placeholder value for a malformed literal of the given kind.
const fn zero_literal(kind: TokenKind) -> Literal {
    match kind {
        TokenKind::LongIntegerLiteral => Literal::LongInteger(0),
        TokenKind::FloatLiteral => Literal::Float(0.0),
        TokenKind::DoubleLiteral => Literal::Double(0.0),
        _ => Literal::Integer(0),
    }
}

fn significant_digits(number: &str) -> usize {
    let mantissa = number.split(['e', 'E']).next().unwrap_or(number);
    mantissa
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan(input).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::IntegerLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn spans_use_zero_based_columns() {
        let output = scan("while true\n");
        let tokens = &output.tokens;
        assert_eq!(tokens[0].span.start, Position::new(1, 0));
        assert_eq!(tokens[0].span.end, Position::new(1, 5));
        assert_eq!(tokens[1].span.start, Position::new(1, 6));
        assert_eq!(tokens[1].span.end, Position::new(1, 10));
        assert_eq!(tokens[2].kind, TokenKind::Newline);
        assert_eq!(tokens[2].span.start, Position::new(1, 10));
        assert_eq!(tokens[2].span.end, Position::new(1, 11));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
        assert_eq!(tokens[3].span.start, Position::new(2, 0));
    }

    #[test]
    fn two_word_keywords_merge() {
        let output = scan("end while");
        assert_eq!(output.tokens[0].kind, TokenKind::EndWhile);
        assert_eq!(output.tokens[0].text, "end while");
        assert_eq!(output.tokens[0].span.end.column, 9);
    }

    #[test]
    fn end_followed_by_other_word_does_not_merge() {
        assert_eq!(
            kinds("end foo"),
            vec![TokenKind::End, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn rem_starts_comment() {
        let output = scan("rem: 1\nx");
        assert_eq!(output.tokens[0].kind, TokenKind::Comment);
        assert_eq!(output.tokens[0].text, "rem: 1");
        assert_eq!(output.tokens[1].kind, TokenKind::Newline);
    }

    #[test]
    fn rem_after_dot_is_identifier() {
        let output = scan("person.rem = 4");
        assert_eq!(output.tokens[2].kind, TokenKind::Identifier);
        assert_eq!(output.tokens[2].text, "rem");
    }

    #[test]
    fn rem_in_key_position_is_identifier() {
        for source in ["{rem: 1}", "{name: \"bob\": rem: 2}", "{a: 1, rem: 2}"] {
            let output = scan(source);
            assert!(
                output.tokens.iter().all(|t| t.kind != TokenKind::Comment),
                "{source}"
            );
            assert!(output.tokens.iter().any(|t| t.text == "rem"), "{source}");
            assert_eq!(output.tokens[output.tokens.len() - 2].kind, TokenKind::RightBrace);
        }
    }

    #[test]
    fn rem_line_inside_braces_is_comment() {
        let output = scan("{\n  rem: 3: name: \"bob\"\n}");
        assert_eq!(output.tokens[2].kind, TokenKind::Comment);
        assert_eq!(output.tokens[2].text, "rem: 3: name: \"bob\"");
    }

    #[test]
    fn rem_after_colon_on_open_literal_line_is_comment() {
        let output = scan("{\n  name: \"bob\": rem: 2\n}");
        let comment = &output.tokens[6];
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(comment.text, "rem: 2");
    }

    #[test]
    fn braces_in_strings_do_not_close_the_literal() {
        let output = scan("{a: 1, rem \"}\"");
        assert_eq!(output.tokens[5].kind, TokenKind::Comment);
    }

    #[test]
    fn rem_after_closed_literal_is_comment() {
        let output = scan("x = {a: 1}: rem done");
        assert_eq!(output.tokens[8].kind, TokenKind::Comment);
    }

    #[test]
    fn oversized_integer_keeps_long_kind() {
        let output = scan("99999999999999999999");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.tokens[0].kind, TokenKind::LongIntegerLiteral);
        assert_eq!(output.tokens[0].literal, Some(Literal::LongInteger(0)));
    }

    #[test]
    fn string_keeps_raw_text() {
        let output = scan(r#""has-second-layer""#);
        let token = &output.tokens[0];
        assert_eq!(token.text, r#""has-second-layer""#);
        assert_eq!(
            token.literal,
            Some(Literal::String("has-second-layer".to_string()))
        );
    }

    #[test]
    fn unterminated_string_recovers() {
        let output = scan("x = \"abc\ny = 1");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].message,
            LexErrorKind::UnterminatedString.to_string()
        );
        assert!(output.tokens.iter().any(|t| t.text == "y"));
    }

    #[test]
    fn number_kinds() {
        assert_eq!(kinds("1.5")[0], TokenKind::FloatLiteral);
        assert_eq!(kinds("1.23456789")[0], TokenKind::DoubleLiteral);
        assert_eq!(kinds("3#")[0], TokenKind::DoubleLiteral);
        assert_eq!(kinds("3&")[0], TokenKind::LongIntegerLiteral);
        assert_eq!(kinds("3000000000")[0], TokenKind::LongIntegerLiteral);
        assert_eq!(kinds("&hFF")[0], TokenKind::IntegerLiteral);
    }

    #[test]
    fn hex_without_digits_is_reported() {
        let output = scan("x = &h");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.tokens[2].kind, TokenKind::IntegerLiteral);
    }

    #[test]
    fn unexpected_character_is_skipped() {
        let output = scan("x = 1 ~ 2");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].message,
            LexErrorKind::UnexpectedCharacter('~').to_string()
        );
        assert_eq!(output.tokens.len(), 5);
    }

    #[test]
    fn crlf_is_one_newline() {
        assert_eq!(
            kinds("a\r\nb"),
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn bom_stripping() {
        let output = scan("\u{FEFF}print");
        assert_eq!(output.tokens[0].kind, TokenKind::Print);
        assert_eq!(output.tokens[0].span.start.column, 0);
    }
}
