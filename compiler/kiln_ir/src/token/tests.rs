use super::*;
use crate::FileId;
use pretty_assertions::assert_eq;

fn sp(start: u32, end: u32) -> Span {
    Span::new(FileId(0), start, end)
}

#[test]
fn test_fixed_text_for_payload_kinds_is_none() {
    for kind in [
        TokenKind::Word,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Double,
        TokenKind::Char,
        TokenKind::Str,
    ] {
        assert_eq!(kind.fixed_text(), None, "{kind:?}");
    }
}

#[test]
fn test_fixed_token_uses_spelling() {
    let tok = Token::fixed(TokenKind::Arrow, sp(0, 2));
    assert_eq!(tok.text, "->");
    let kw = Token::fixed(TokenKind::IntegerType, sp(0, 7));
    assert_eq!(kw.text, "integer");
}

#[test]
fn test_same_as_ignores_location() {
    let a = Token::new(TokenKind::Word, "plus", sp(0, 4));
    let b = Token::new(TokenKind::Word, "plus", sp(40, 44));
    let c = Token::new(TokenKind::Word, "minus", sp(0, 5));
    let d = Token::new(TokenKind::Str, "plus", sp(0, 6));
    assert!(a.same_as(&b));
    assert!(!a.same_as(&c));
    assert!(!a.same_as(&d));
}

#[test]
fn test_display() {
    assert_eq!(Token::new(TokenKind::Str, "a\"b", sp(0, 5)).to_string(), "\"a\\\"b\"");
    assert_eq!(Token::new(TokenKind::Char, "\n", sp(0, 4)).to_string(), "'\\n'");
    assert_eq!(Token::new(TokenKind::Float, "1.5", sp(0, 4)).to_string(), "1.5f");
    assert_eq!(Token::fixed(TokenKind::Shl, sp(0, 2)).to_string(), "<<");
}

#[test]
fn test_describe() {
    assert_eq!(TokenKind::Word.describe(), "an identifier");
    assert_eq!(TokenKind::Semicolon.describe(), "`;`");
    assert_eq!(TokenKind::Eof.describe(), "end of input");
}

#[test]
fn test_classification() {
    assert!(TokenKind::AnyType.is_builtin_type());
    assert!(!TokenKind::Word.is_builtin_type());
    assert!(TokenKind::Char.is_literal());
    assert!(!TokenKind::Null.is_literal());
}

#[test]
fn test_token_list() {
    let mut list = TokenList::new();
    assert!(list.is_empty());
    list.push(Token::new(TokenKind::Int, "3", sp(0, 1)));
    list.push(Token::fixed(TokenKind::Semicolon, sp(1, 2)));
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].kind, TokenKind::Semicolon);
    assert_eq!(list.get(2), None);
    let kinds: Vec<_> = list.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TokenKind::Int, TokenKind::Semicolon]);
}
