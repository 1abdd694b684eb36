#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source, FileId(0)).unwrap().iter().map(|t| t.kind).collect()
}

fn texts(source: &str) -> Vec<String> {
    lex(source, FileId(0))
        .unwrap()
        .iter()
        .map(|t| t.text.clone())
        .collect()
}

#[test]
fn test_lex_declaration() {
    assert_eq!(
        kinds("static integer x = 42;"),
        vec![
            TokenKind::Static,
            TokenKind::IntegerType,
            TokenKind::Word,
            TokenKind::Eq,
            TokenKind::Int,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_lex_syntax_rule() {
    assert_eq!(
        kinds("syntax [a:integer] plus [b:integer] { return a + b; }"),
        vec![
            TokenKind::Syntax,
            TokenKind::LBracket,
            TokenKind::Word,
            TokenKind::Colon,
            TokenKind::IntegerType,
            TokenKind::RBracket,
            TokenKind::Word,
            TokenKind::LBracket,
            TokenKind::Word,
            TokenKind::Colon,
            TokenKind::IntegerType,
            TokenKind::RBracket,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::Word,
            TokenKind::Plus,
            TokenKind::Word,
            TokenKind::Semicolon,
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn test_lex_operators_longest() {
    assert_eq!(
        kinds("<<= >> -> ... && || != =="),
        vec![
            TokenKind::Shl,
            TokenKind::Eq,
            TokenKind::Shr,
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::NotEq,
            TokenKind::EqEq,
        ]
    );
}

#[test]
fn test_lex_numbers_normalized() {
    assert_eq!(texts("0x1F 7 1.5f 2.25 1.0e3"), vec!["31", "7", "1.5", "2.25", "1.0e3"]);
    assert_eq!(
        kinds("1.5f 2.25"),
        vec![TokenKind::Float, TokenKind::Double]
    );
}

#[test]
fn test_lex_string_escapes() {
    let tokens = lex(r#""a\tb\n" '\''"#, FileId(0)).unwrap();
    assert_eq!(tokens[0].text, "a\tb\n");
    assert_eq!(tokens[1].kind, TokenKind::Char);
    assert_eq!(tokens[1].text, "'");
}

#[test]
fn test_lex_skips_comments() {
    assert_eq!(
        kinds("a // line\n /* block\n * still */ b"),
        vec![TokenKind::Word, TokenKind::Word]
    );
}

#[test]
fn test_lex_block_comment_with_stars() {
    assert_eq!(
        kinds("a /** doc\n * more ** text\n **/ b /* x */ c"),
        vec![TokenKind::Word, TokenKind::Word, TokenKind::Word]
    );
    assert_eq!(kinds("a/* x */*b"), vec![TokenKind::Word, TokenKind::Star, TokenKind::Word]);
}

#[test]
fn test_lex_rejects_non_ascii_character() {
    let err = lex("'é'", FileId(0)).unwrap_err();
    assert!(matches!(err, LexError::InvalidCharacter { .. }));
}

#[test]
fn test_lex_unterminated_block_comment() {
    let err = lex("a /* never closed", FileId(0)).unwrap_err();
    assert!(matches!(err, LexError::UnterminatedComment { .. }));
    assert_eq!(err.to_diagnostic().kind, kiln_diagnostic::ErrorKind::InvalidToken);
}

#[test]
fn test_lex_anonymous_and_keyword_prefix() {
    assert_eq!(texts("$tmp integers up"), vec!["$tmp", "integers", "up"]);
    assert_eq!(
        kinds("$tmp integers up"),
        vec![TokenKind::Word, TokenKind::Word, TokenKind::Up]
    );
}

#[test]
fn test_lex_spans() {
    let tokens = lex("ab  cd", FileId(3)).unwrap();
    assert_eq!(tokens[1].span, Span::new(FileId(3), 4, 6));
}

#[test]
fn test_lex_errors() {
    assert!(matches!(lex("a @ b", FileId(0)), Err(LexError::Unrecognized { .. })));
    assert!(matches!(
        lex(r#""\q""#, FileId(0)),
        Err(LexError::InvalidEscape { escape: 'q', .. })
    ));
    assert!(matches!(
        lex("99999999999999999999999", FileId(0)),
        Err(LexError::IntegerOverflow { .. })
    ));
}

#[test]
fn test_error_diagnostic() {
    let err = lex("#", FileId(0)).unwrap_err();
    let diag = err.to_diagnostic();
    assert_eq!(diag.kind, kiln_diagnostic::ErrorKind::InvalidToken);
    assert!(diag.fatal);
    assert_eq!(diag.span, Span::new(FileId(0), 0, 1));
}
