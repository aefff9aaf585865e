//! Keyword classification matrix.
//!
//! Every keyword spelling is tried in each identifier-shaped position:
//! object-literal key, property assignment, property read, and local
//! assignment. Property positions must always parse; local assignment
//! must follow the local-identifier sets.

mod common;

use brs_parser::ast::{AaElement, Expression, Statement};
use brs_parser::keywords::{
    ALLOWED_LOCAL_IDENTIFIERS, ALWAYS_RESERVED, BUILTIN_FUNCTIONS, KEYWORD_KINDS, KEYWORDS,
    RESERVED_IDENTIFIERS, classify, classify_kind, is_allowed_property_name, lookup, spelling_of,
};
use brs_parser::{Classification, TokenKind, parse_source};
use common::{parse_clean, render};

/// Single-word spellings plus reserved identifiers: one entry per name
/// usable after `.` or as a bare key.
fn property_spellings() -> Vec<&'static str> {
    KEYWORDS
        .iter()
        .map(|(spelling, _)| *spelling)
        .filter(|spelling| !spelling.contains(' '))
        .chain(RESERVED_IDENTIFIERS.iter().copied())
        .collect()
}

#[test]
fn every_keyword_kind_has_a_single_word_spelling() {
    for kind in KEYWORD_KINDS {
        let spelling = spelling_of(*kind).unwrap_or_else(|| panic!("{kind:?} has no spelling"));
        assert!(!spelling.contains(' '), "{kind:?} spelled '{spelling}'");
        assert_eq!(lookup(spelling), Some(*kind));
        assert!(kind.is_keyword());
    }
}

#[test]
fn classification_sets_cover_every_keyword_once() {
    assert_eq!(
        ALWAYS_RESERVED.len() + BUILTIN_FUNCTIONS.len() + ALLOWED_LOCAL_IDENTIFIERS.len(),
        KEYWORD_KINDS.len()
    );
    for kind in KEYWORD_KINDS {
        let class = classify_kind(*kind);
        assert_ne!(class.allowed_local, class.disallowed_local, "{kind:?}");
        assert!(class.allowed_property, "{kind:?}");
    }
}

#[test]
fn identifiers_are_property_names_but_not_keywords() {
    assert!(is_allowed_property_name(TokenKind::Identifier));
    assert!(!TokenKind::Identifier.is_keyword());
    assert!(!is_allowed_property_name(TokenKind::StringLiteral));

    let each = classify("EACH");
    assert_eq!(each.kind, None);
    assert!(each.always_reserved);
    assert!(each.allowed_property);

    assert_eq!(classify("person"), Classification::default());
}

#[test]
fn keyword_as_object_literal_key() {
    for spelling in property_spellings() {
        let source = format!("x = {{\n    {spelling}: true\n}}\n");
        let statements = parse_clean(&source);
        let Statement::Assignment(assign) = &statements[0] else {
            panic!("expected assignment for '{spelling}'");
        };
        let Expression::AaLiteral(aa) = &assign.value else {
            panic!("expected object literal for '{spelling}'");
        };
        match &aa.elements[0] {
            AaElement::Member(member) => assert_eq!(member.key, spelling),
            // `rem` at the start of a literal line reads as a comment.
            AaElement::Comment(comment) => {
                assert_eq!(spelling, "rem");
                assert_eq!(comment.text, "rem: true");
            }
        }
    }
}

#[test]
fn keyword_as_inline_object_literal_key() {
    for spelling in property_spellings() {
        let source = format!("x = {{ a: 1, {spelling}: true }}\n");
        let statements = parse_clean(&source);
        let Statement::Assignment(assign) = &statements[0] else {
            panic!("expected assignment for '{spelling}'");
        };
        let Expression::AaLiteral(aa) = &assign.value else {
            panic!("expected object literal for '{spelling}'");
        };
        let keys: Vec<&str> = aa.members().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a", spelling], "{source}");
    }
}

#[test]
fn keyword_as_property_assignment() {
    for spelling in property_spellings() {
        let source = format!("obj.{spelling} = false\n");
        let statements = parse_clean(&source);
        let Statement::DottedSet(set) = &statements[0] else {
            panic!("expected dotted set for '{spelling}'");
        };
        assert_eq!(set.name.name, spelling);
    }
}

#[test]
fn keyword_as_property_read() {
    for spelling in property_spellings() {
        let source = format!("theValue = obj.{spelling}\n");
        let statements = parse_clean(&source);
        let Statement::Assignment(assign) = &statements[0] else {
            panic!("expected assignment for '{spelling}'");
        };
        assert!(
            matches!(&assign.value, Expression::DottedGet(get) if get.name.name == spelling),
            "{source}"
        );
    }
}

#[test]
fn keyword_as_local_assignment() {
    for (spelling, kind) in KEYWORDS {
        // The rest of a `rem` line is a comment, never an assignment.
        if *kind == TokenKind::Rem {
            continue;
        }
        let source = format!("{spelling} = 1\n");
        let output = parse_source(&source);
        let class = classify(spelling);
        if class.allowed_local {
            assert!(
                output.diagnostics.is_empty(),
                "'{spelling}' rejected:\n{}",
                render(&output.diagnostics)
            );
            assert!(matches!(output.statements[0], Statement::Assignment(_)));
        } else {
            assert!(
                !output.diagnostics.is_empty(),
                "'{spelling}' accepted as a local variable"
            );
            assert_eq!(
                output.diagnostics[0].span.start.column, 0,
                "error for '{spelling}' should start at the name"
            );
        }
    }
}
