//! Lexer edge cases and error tests.

use brs_parser::{LexErrorKind, Literal, Position, TokenKind, scan};

fn kinds(input: &str) -> Vec<TokenKind> {
    scan(input).tokens.iter().map(|t| t.kind).collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    let output = scan("");
    assert_eq!(output.tokens.len(), 1);
    assert_eq!(output.tokens[0].kind, TokenKind::Eof);
    assert_eq!(output.tokens[0].span.start, Position::new(1, 0));
}

#[test]
fn lex_crlf_is_one_newline() {
    let output = scan("a\r\nb");
    assert_eq!(
        kinds("a\r\nb"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
    assert_eq!(output.tokens[2].span.start, Position::new(2, 0));
}

#[test]
fn lex_keywords_are_case_insensitive() {
    assert_eq!(
        kinds("WHILE True\nEnd While"),
        vec![
            TokenKind::While,
            TokenKind::True,
            TokenKind::Newline,
            TokenKind::EndWhile,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_two_word_keywords_keep_source_text() {
    let output = scan("else   if x\nexit\twhile\nfor each i in a");
    assert_eq!(output.tokens[0].kind, TokenKind::ElseIf);
    assert_eq!(output.tokens[0].text, "else   if");
    assert_eq!(output.tokens[3].kind, TokenKind::ExitWhile);
    assert_eq!(output.tokens[3].text, "exit\twhile");
    assert_eq!(output.tokens[5].kind, TokenKind::ForEach);
}

#[test]
fn lex_single_word_spellings() {
    assert_eq!(
        kinds("endif endsub endfunction exitfor"),
        vec![
            TokenKind::EndIf,
            TokenKind::EndSub,
            TokenKind::EndFunction,
            TokenKind::ExitFor,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_no_merge_after_dot() {
    assert_eq!(
        kinds("a.end if"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::End,
            TokenKind::If,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_type_designator_is_never_a_keyword() {
    let output = scan("print$ name% rate! total# big&");
    assert!(
        output.tokens[..5]
            .iter()
            .all(|t| t.kind == TokenKind::Identifier)
    );
    assert_eq!(output.tokens[0].text, "print$");
}

// -----------------------------------------------------------
// Comments.
// -----------------------------------------------------------

#[test]
fn lex_apostrophe_comment() {
    let output = scan("x = 1 ' set x\ny = 2");
    let comment = &output.tokens[3];
    assert_eq!(comment.kind, TokenKind::Comment);
    assert_eq!(comment.text, "' set x");
    assert_eq!(output.tokens[4].kind, TokenKind::Newline);
}

#[test]
fn lex_rem_comment_runs_to_end_of_line() {
    let output = scan("REM person.rem = true\nx = 1");
    assert_eq!(output.tokens[0].kind, TokenKind::Comment);
    assert_eq!(output.tokens[0].text, "REM person.rem = true");
    assert_eq!(output.tokens[1].kind, TokenKind::Newline);
}

#[test]
fn lex_remark_is_an_identifier() {
    assert_eq!(scan("remark = 1").tokens[0].kind, TokenKind::Identifier);
}

// -----------------------------------------------------------
// Literals.
// -----------------------------------------------------------

#[test]
fn lex_string_with_escaped_quote() {
    let output = scan(r#"s = "say ""hi""""#);
    let string = &output.tokens[2];
    assert_eq!(string.kind, TokenKind::StringLiteral);
    assert_eq!(string.text, r#""say ""hi""""#);
    assert_eq!(string.literal, Some(Literal::String("say \"hi\"".into())));
    assert!(output.diagnostics.is_empty());
}

#[test]
fn lex_unterminated_string() {
    let output = scan("s = \"open\nx = 1");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics[0].message,
        LexErrorKind::UnterminatedString.to_string()
    );
    assert_eq!(output.tokens[2].kind, TokenKind::StringLiteral);
    assert_eq!(output.tokens[3].kind, TokenKind::Newline);
}

#[test]
fn lex_numeric_literal_kinds() {
    let output = scan("1 2.5 3# 4& 5! 6% 2147483648 1.23456789 1e3 2d2");
    let literals: Vec<_> = output
        .tokens
        .iter()
        .map(|t| t.literal.clone())
        .take(10)
        .collect();
    assert_eq!(
        literals,
        vec![
            Some(Literal::Integer(1)),
            Some(Literal::Float(2.5)),
            Some(Literal::Double(3.0)),
            Some(Literal::LongInteger(4)),
            Some(Literal::Float(5.0)),
            Some(Literal::Integer(6)),
            Some(Literal::LongInteger(2_147_483_648)),
            Some(Literal::Double(1.234_567_89)),
            Some(Literal::Float(1000.0)),
            Some(Literal::Double(200.0)),
        ]
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn lex_hex_literals() {
    let output = scan("&hFF &HFFFFFFFF &h10&");
    assert_eq!(output.tokens[0].literal, Some(Literal::Integer(255)));
    assert_eq!(output.tokens[1].literal, Some(Literal::Integer(-1)));
    assert_eq!(output.tokens[2].kind, TokenKind::LongIntegerLiteral);
    assert_eq!(output.tokens[2].literal, Some(Literal::LongInteger(16)));
}

#[test]
fn lex_boolean_and_invalid_literals() {
    let output = scan("true FALSE invalid");
    assert_eq!(output.tokens[0].literal, Some(Literal::Boolean(true)));
    assert_eq!(output.tokens[1].literal, Some(Literal::Boolean(false)));
    assert_eq!(output.tokens[2].literal, Some(Literal::Invalid));
}

// -----------------------------------------------------------
// Operators and errors.
// -----------------------------------------------------------

#[test]
fn lex_compound_operators() {
    assert_eq!(
        kinds("+= -= *= /= \\= <<= >>= ++ -- <> <= >= << >>"),
        vec![
            TokenKind::PlusEqual,
            TokenKind::MinusEqual,
            TokenKind::StarEqual,
            TokenKind::SlashEqual,
            TokenKind::BackslashEqual,
            TokenKind::LeftShiftEqual,
            TokenKind::RightShiftEqual,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::LessGreater,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::LeftShift,
            TokenKind::RightShift,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_unexpected_character_is_skipped() {
    let output = scan("x = 1 ~ 2");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics[0].message,
        LexErrorKind::UnexpectedCharacter('~').to_string()
    );
    assert_eq!(
        output.diagnostics[0].span.start,
        Position::new(1, 6)
    );
    assert_eq!(output.tokens.len(), 5);
}

#[test]
fn lex_multibyte_characters_take_one_column() {
    let output = scan("s = \"héllo\" : x = 1");
    assert_eq!(output.tokens[2].span.end.column, 11);
    assert_eq!(output.tokens[3].span.start.column, 12);
}
