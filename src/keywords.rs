//! Keyword classification table.
//!
//! Keywords overload heavily: the same spelling can be a statement
//! keyword, a builtin function, a legal local variable, and an object
//! property name depending on where it appears. The table below is the
//! single source of truth for those decisions; the lexer consults it to
//! pick token kinds and the parser consults it whenever a keyword-shaped
//! token lands in an identifier position.

use crate::token::TokenKind;

/// Spelling (lowercase, single space between words) to token kind.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("as", TokenKind::As),
    ("box", TokenKind::Box),
    ("createobject", TokenKind::CreateObject),
    ("dim", TokenKind::Dim),
    ("else", TokenKind::Else),
    ("elseif", TokenKind::ElseIf),
    ("else if", TokenKind::ElseIf),
    ("end", TokenKind::End),
    ("endfunction", TokenKind::EndFunction),
    ("end function", TokenKind::EndFunction),
    ("endfor", TokenKind::EndFor),
    ("end for", TokenKind::EndFor),
    ("endif", TokenKind::EndIf),
    ("end if", TokenKind::EndIf),
    ("endsub", TokenKind::EndSub),
    ("end sub", TokenKind::EndSub),
    ("endwhile", TokenKind::EndWhile),
    ("end while", TokenKind::EndWhile),
    ("eval", TokenKind::Eval),
    ("exit", TokenKind::Exit),
    ("exitfor", TokenKind::ExitFor),
    ("exit for", TokenKind::ExitFor),
    ("exitwhile", TokenKind::ExitWhile),
    ("exit while", TokenKind::ExitWhile),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("foreach", TokenKind::ForEach),
    ("for each", TokenKind::ForEach),
    ("function", TokenKind::Function),
    ("getglobalaa", TokenKind::GetGlobalAA),
    ("getlastruncompileerror", TokenKind::GetLastRunCompileError),
    ("getlastrunruntimeerror", TokenKind::GetLastRunRunTimeError),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("in", TokenKind::In),
    ("invalid", TokenKind::Invalid),
    ("let", TokenKind::Let),
    ("line_num", TokenKind::LineNum),
    ("mod", TokenKind::Mod),
    ("next", TokenKind::Next),
    ("not", TokenKind::Not),
    ("objfun", TokenKind::ObjFun),
    ("or", TokenKind::Or),
    ("pos", TokenKind::Pos),
    ("print", TokenKind::Print),
    ("rem", TokenKind::Rem),
    ("return", TokenKind::Return),
    ("run", TokenKind::Run),
    ("step", TokenKind::Step),
    ("stop", TokenKind::Stop),
    ("sub", TokenKind::Sub),
    ("tab", TokenKind::Tab),
    ("then", TokenKind::Then),
    ("to", TokenKind::To),
    ("true", TokenKind::True),
    ("type", TokenKind::Type),
    ("while", TokenKind::While),
    ("void", TokenKind::Void),
    ("boolean", TokenKind::Boolean),
    ("integer", TokenKind::Integer),
    ("longinteger", TokenKind::LongInteger),
    ("float", TokenKind::Float),
    ("double", TokenKind::Double),
    ("string", TokenKind::String),
    ("object", TokenKind::Object),
    ("interface", TokenKind::Interface),
    ("dynamic", TokenKind::Dynamic),
];

/// Reserved spellings that have no token kind of their own. They lex as
/// identifiers flagged `is_reserved`.
pub const RESERVED_IDENTIFIERS: &[&str] = &["each"];

/// Every keyword-shaped token kind, in declaration order.
pub const KEYWORD_KINDS: &[TokenKind] = &[
    TokenKind::And,
    TokenKind::As,
    TokenKind::Box,
    TokenKind::CreateObject,
    TokenKind::Dim,
    TokenKind::Else,
    TokenKind::ElseIf,
    TokenKind::End,
    TokenKind::EndFunction,
    TokenKind::EndFor,
    TokenKind::EndIf,
    TokenKind::EndSub,
    TokenKind::EndWhile,
    TokenKind::Eval,
    TokenKind::Exit,
    TokenKind::ExitFor,
    TokenKind::ExitWhile,
    TokenKind::False,
    TokenKind::For,
    TokenKind::ForEach,
    TokenKind::Function,
    TokenKind::GetGlobalAA,
    TokenKind::GetLastRunCompileError,
    TokenKind::GetLastRunRunTimeError,
    TokenKind::Goto,
    TokenKind::If,
    TokenKind::In,
    TokenKind::Invalid,
    TokenKind::Let,
    TokenKind::LineNum,
    TokenKind::Mod,
    TokenKind::Next,
    TokenKind::Not,
    TokenKind::ObjFun,
    TokenKind::Or,
    TokenKind::Pos,
    TokenKind::Print,
    TokenKind::Rem,
    TokenKind::Return,
    TokenKind::Run,
    TokenKind::Step,
    TokenKind::Stop,
    TokenKind::Sub,
    TokenKind::Tab,
    TokenKind::Then,
    TokenKind::To,
    TokenKind::True,
    TokenKind::Type,
    TokenKind::While,
    TokenKind::Void,
    TokenKind::Boolean,
    TokenKind::Integer,
    TokenKind::LongInteger,
    TokenKind::Float,
    TokenKind::Double,
    TokenKind::String,
    TokenKind::Object,
    TokenKind::Interface,
    TokenKind::Dynamic,
];

/// Keywords that can never name a variable, in any position.
pub const ALWAYS_RESERVED: &[TokenKind] = &[
    TokenKind::And,
    TokenKind::As,
    TokenKind::Dim,
    TokenKind::Else,
    TokenKind::ElseIf,
    TokenKind::End,
    TokenKind::EndFunction,
    TokenKind::EndIf,
    TokenKind::EndSub,
    TokenKind::EndWhile,
    TokenKind::Exit,
    TokenKind::ExitWhile,
    TokenKind::False,
    TokenKind::For,
    TokenKind::Function,
    TokenKind::Goto,
    TokenKind::If,
    TokenKind::In,
    TokenKind::Invalid,
    TokenKind::Let,
    TokenKind::Mod,
    TokenKind::Next,
    TokenKind::Not,
    TokenKind::Or,
    TokenKind::Print,
    TokenKind::Rem,
    TokenKind::Return,
    TokenKind::Step,
    TokenKind::Stop,
    TokenKind::Sub,
    TokenKind::Then,
    TokenKind::To,
    TokenKind::True,
    TokenKind::While,
];

/// Builtin function names. Callable in expressions, never assignable.
pub const BUILTIN_FUNCTIONS: &[TokenKind] = &[
    TokenKind::Box,
    TokenKind::CreateObject,
    TokenKind::Eval,
    TokenKind::GetGlobalAA,
    TokenKind::GetLastRunCompileError,
    TokenKind::GetLastRunRunTimeError,
    TokenKind::LineNum,
    TokenKind::ObjFun,
    TokenKind::Pos,
    TokenKind::Run,
    TokenKind::Tab,
    TokenKind::Type,
];

/// Keyword kinds the grammar accepts as plain local variable names.
///
/// A kind may only live here while no statement production starts with it
/// in a position where an assignment could also start.
pub const ALLOWED_LOCAL_IDENTIFIERS: &[TokenKind] = &[
    TokenKind::EndFor,
    TokenKind::ExitFor,
    TokenKind::ForEach,
    TokenKind::Void,
    TokenKind::Boolean,
    TokenKind::Integer,
    TokenKind::LongInteger,
    TokenKind::Float,
    TokenKind::Double,
    TokenKind::String,
    TokenKind::Object,
    TokenKind::Interface,
    TokenKind::Dynamic,
];

/// Membership of a spelling or kind in the classification sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub kind: Option<TokenKind>,
    pub always_reserved: bool,
    pub disallowed_local: bool,
    pub allowed_local: bool,
    pub allowed_property: bool,
}

/// Look up the token kind for a keyword spelling, case-insensitively.
///
/// Multi-word spellings may separate their words with any run of spaces
/// or tabs.
#[must_use]
pub fn lookup(spelling: &str) -> Option<TokenKind> {
    let normalized = spelling
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == normalized)
        .map(|(_, kind)| *kind)
}

/// Classify a spelling against every membership set.
#[must_use]
pub fn classify(spelling: &str) -> Classification {
    match lookup(spelling) {
        Some(kind) => classify_kind(kind),
        None if is_reserved_identifier(spelling) => Classification {
            kind: None,
            always_reserved: true,
            disallowed_local: true,
            allowed_local: false,
            allowed_property: true,
        },
        None => Classification::default(),
    }
}

/// Classify a token kind against every membership set.
#[must_use]
pub fn classify_kind(kind: TokenKind) -> Classification {
    Classification {
        kind: Some(kind),
        always_reserved: is_always_reserved(kind),
        disallowed_local: is_disallowed_local_identifier(kind),
        allowed_local: is_allowed_local_identifier(kind),
        allowed_property: is_allowed_property_name(kind),
    }
}

#[must_use]
pub fn is_always_reserved(kind: TokenKind) -> bool {
    ALWAYS_RESERVED.contains(&kind)
}

#[must_use]
pub fn is_builtin_function(kind: TokenKind) -> bool {
    BUILTIN_FUNCTIONS.contains(&kind)
}

#[must_use]
pub fn is_disallowed_local_identifier(kind: TokenKind) -> bool {
    is_always_reserved(kind) || is_builtin_function(kind)
}

#[must_use]
pub fn is_allowed_local_identifier(kind: TokenKind) -> bool {
    ALLOWED_LOCAL_IDENTIFIERS.contains(&kind)
}

/// Property position is never ambiguous with a keyword use, so every
/// keyword-shaped kind is accepted there, alongside plain identifiers.
#[must_use]
pub fn is_allowed_property_name(kind: TokenKind) -> bool {
    kind == TokenKind::Identifier || KEYWORD_KINDS.contains(&kind)
}

#[must_use]
pub fn is_reserved_identifier(spelling: &str) -> bool {
    RESERVED_IDENTIFIERS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(spelling))
}

/// Whether a token of `kind` spelled `text` is a reserved word.
#[must_use]
pub fn is_reserved_spelling(kind: TokenKind, text: &str) -> bool {
    match kind {
        TokenKind::Identifier => is_reserved_identifier(text),
        _ => is_disallowed_local_identifier(kind),
    }
}

/// Canonical lowercase spelling of a keyword kind.
#[must_use]
pub fn spelling_of(kind: TokenKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(word, _)| *word)
}
