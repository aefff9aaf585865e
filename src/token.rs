use std::fmt;

/// A point in the source: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source extent of a token or node. `end` is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `at`.
    #[must_use]
    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Span running from the start of `first` to the end of `last`.
    ///
    /// Composite nodes are built this way from their first and last
    /// consumed tokens, never from a union of child spans.
    #[must_use]
    pub const fn between(first: Self, last: Self) -> Self {
        Self {
            start: first.start,
            end: last.end,
        }
    }

    /// Returns true if `other` lies fully inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Token kinds produced by the lexer.
///
/// Keyword kinds are listed with their canonical spelling; the lexer maps
/// spellings onto kinds through [`crate::keywords::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names.
    Identifier,
    StringLiteral,
    IntegerLiteral,
    LongIntegerLiteral,
    FloatLiteral,
    DoubleLiteral,

    // Punctuation.
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Question,
    At,

    // Operators.
    Caret,
    Minus,
    Plus,
    Star,
    Slash,
    Backslash,
    PlusPlus,
    MinusMinus,
    LeftShift,
    RightShift,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    BackslashEqual,
    LeftShiftEqual,
    RightShiftEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    LessGreater,

    // Keywords.
    And,
    As,
    Box,
    CreateObject,
    Dim,
    Else,
    ElseIf,
    End,
    EndFunction,
    EndFor,
    EndIf,
    EndSub,
    EndWhile,
    Eval,
    Exit,
    ExitFor,
    ExitWhile,
    False,
    For,
    ForEach,
    Function,
    GetGlobalAA,
    GetLastRunCompileError,
    GetLastRunRunTimeError,
    Goto,
    If,
    In,
    Invalid,
    Let,
    LineNum,
    Mod,
    Next,
    Not,
    ObjFun,
    Or,
    Pos,
    Print,
    Rem,
    Return,
    Run,
    Step,
    Stop,
    Sub,
    Tab,
    Then,
    To,
    True,
    Type,
    While,

    // Type names.
    Void,
    Boolean,
    Integer,
    LongInteger,
    Float,
    Double,
    String,
    Object,
    Interface,
    Dynamic,

    // Trivia that matters to the grammar.
    Comment,
    Newline,
    Eof,
}

impl TokenKind {
    /// Assignment operators accepted after an assignment target.
    #[must_use]
    pub const fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::PlusEqual
                | Self::MinusEqual
                | Self::StarEqual
                | Self::SlashEqual
                | Self::BackslashEqual
                | Self::LeftShiftEqual
                | Self::RightShiftEqual
        )
    }

    /// Kinds that end a statement without belonging to it.
    #[must_use]
    pub const fn is_statement_separator(self) -> bool {
        matches!(self, Self::Newline | Self::Colon | Self::Eof)
    }

    /// Keyword-shaped kinds: everything spelled with letters.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        crate::keywords::KEYWORD_KINDS.contains(&self)
    }
}

/// Parsed value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i32),
    LongInteger(i64),
    Float(f32),
    Double(f64),
    String(String),
    Boolean(bool),
    Invalid,
}

impl Literal {
    /// Derive a literal from a token's kind and raw text.
    ///
    /// Used when a caller-built token carries no parsed value.
    #[must_use]
    pub fn from_token_text(kind: TokenKind, text: &str) -> Option<Self> {
        let digits = text.trim_end_matches(['%', '!', '#', '&']);
        match kind {
            TokenKind::True => Some(Self::Boolean(true)),
            TokenKind::False => Some(Self::Boolean(false)),
            TokenKind::Invalid => Some(Self::Invalid),
            TokenKind::StringLiteral => {
                let inner = text
                    .strip_prefix('"')
                    .map_or(text, |rest| rest.strip_suffix('"').unwrap_or(rest));
                Some(Self::String(inner.replace("\"\"", "\"")))
            }
            TokenKind::IntegerLiteral => hex_digits(digits).map_or_else(
                || digits.parse().ok().map(Self::Integer),
                |hex| {
                    u32::from_str_radix(hex, 16)
                        .ok()
                        .map(|v| Self::Integer(i32::from_ne_bytes(v.to_ne_bytes())))
                },
            ),
            TokenKind::LongIntegerLiteral => hex_digits(digits).map_or_else(
                || digits.parse().ok().map(Self::LongInteger),
                |hex| {
                    u64::from_str_radix(hex, 16)
                        .ok()
                        .map(|v| Self::LongInteger(i64::from_ne_bytes(v.to_ne_bytes())))
                },
            ),
            TokenKind::FloatLiteral => digits.parse().ok().map(Self::Float),
            TokenKind::DoubleLiteral => digits.parse().ok().map(Self::Double),
            _ => None,
        }
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("&h").or_else(|| text.strip_prefix("&H"))
}

/// A single token with its kind, raw text, and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub literal: Option<Literal>,
    pub span: Span,
    pub is_reserved: bool,
}

impl Token {
    /// Build a token with no literal value, reserved-ness taken from the
    /// classification table.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let is_reserved = crate::keywords::is_reserved_spelling(kind, &text);
        Self {
            kind,
            text,
            literal: None,
            span,
            is_reserved,
        }
    }

    #[must_use]
    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    /// The parsed literal, falling back to the raw text when absent.
    #[must_use]
    pub fn literal_value(&self) -> Option<Literal> {
        self.literal
            .clone()
            .or_else(|| Literal::from_token_text(self.kind, &self.text))
    }
}
