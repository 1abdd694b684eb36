#![allow(clippy::unwrap_used)]

use kiln_ir::{FileId, Span, Token, TokenKind};
use pretty_assertions::assert_eq;

use super::*;

fn word(text: &str, at: u32) -> Token {
    Token::new(TokenKind::Word, text, Span::new(FileId(0), at, at + 1))
}

fn punct(kind: TokenKind, at: u32) -> Token {
    Token::fixed(kind, Span::new(FileId(0), at, at + 1))
}

fn texts(cursor: &mut TokenCursor) -> Vec<String> {
    let mut out = Vec::new();
    while cursor.current_kind() != TokenKind::Eof {
        out.push(cursor.advance().text);
    }
    out
}

#[test]
fn test_peek_is_clamped_past_end() {
    let cursor = TokenCursor::new(vec![word("a", 0), word("b", 2)], 4);
    assert_eq!(cursor.peek(1).text, "b");
    assert_eq!(cursor.peek(2).kind, TokenKind::Eof);
    assert_eq!(cursor.peek(usize::MAX).kind, TokenKind::Eof);
}

#[test]
fn test_advance_and_retreat() {
    let mut cursor = TokenCursor::new(vec![word("a", 0), word("b", 2)], 4);
    assert_eq!(cursor.advance().text, "a");
    assert!(cursor.retreat());
    assert!(!cursor.retreat());
    assert_eq!(texts(&mut cursor), vec!["a", "b"]);
    assert!(cursor.at_end());
    // Advancing at the end stays put.
    assert_eq!(cursor.advance().kind, TokenKind::Eof);
}

#[test]
fn test_save_and_restore() {
    let mut cursor = TokenCursor::new(vec![word("a", 0), word("b", 2), word("c", 4)], 4);
    cursor.advance();
    let snapshot = cursor.save();
    cursor.advance();
    cursor.advance();
    assert_eq!(cursor.consumed_since(&snapshot), Some(2));
    cursor.restore(snapshot);
    assert_eq!(cursor.current().text, "b");
}

#[test]
fn test_enter_and_leave_restore_outer_position() {
    let mut cursor = TokenCursor::new(vec![word("a", 0), word("b", 2)], 4);
    cursor.advance();
    let body = DeferredRange::from_tokens(vec![word("x", 10), word("y", 12)]);
    cursor.enter(body, StateKind::Expansion).unwrap();
    assert_eq!(cursor.depth(), 1);
    assert_eq!(texts(&mut cursor), vec!["x", "y"]);
    // Expansion states are not left implicitly.
    assert_eq!(cursor.current_kind(), TokenKind::Eof);
    assert_eq!(cursor.leave(), Some(StateKind::Expansion));
    assert_eq!(cursor.current().text, "b");
}

#[test]
fn test_splice_pops_when_exhausted() {
    let mut cursor = TokenCursor::new(vec![word("a", 0), word("b", 2)], 4);
    cursor.advance();
    let splice = DeferredRange::from_tokens(vec![word("s", 20)]);
    cursor.enter(splice, StateKind::Splice).unwrap();
    assert_eq!(texts(&mut cursor), vec!["s", "b"]);
    assert_eq!(cursor.depth(), 0);
}

#[test]
fn test_empty_splice_is_skipped_immediately() {
    let mut cursor = TokenCursor::new(vec![word("a", 0)], 4);
    cursor
        .enter(DeferredRange::from_tokens(Vec::new()), StateKind::Splice)
        .unwrap();
    assert_eq!(cursor.depth(), 0);
    assert_eq!(cursor.current().text, "a");
}

#[test]
fn test_depth_bound_is_an_error() {
    let mut cursor = TokenCursor::new(vec![word("a", 0)], 2);
    let range = || DeferredRange::from_tokens(vec![word("x", 0)]);
    cursor.enter(range(), StateKind::Deferred).unwrap();
    cursor.enter(range(), StateKind::Deferred).unwrap();
    assert_eq!(
        cursor.enter(range(), StateKind::Deferred),
        Err(CursorDepthError { limit: 2 })
    );
}

#[test]
fn test_leave_to_unwinds_nested_splices() {
    let mut cursor = TokenCursor::new(vec![word("a", 0)], 8);
    let depth = cursor.depth();
    cursor
        .enter(DeferredRange::from_tokens(vec![word("x", 0)]), StateKind::Deferred)
        .unwrap();
    cursor
        .enter(DeferredRange::from_tokens(vec![word("s", 0)]), StateKind::Splice)
        .unwrap();
    cursor.leave_to(depth);
    assert_eq!(cursor.depth(), 0);
    assert_eq!(cursor.current().text, "a");
}

#[test]
fn test_capture_braced_skips_nested_blocks() {
    let tokens = vec![
        punct(TokenKind::LBrace, 0),
        word("a", 1),
        punct(TokenKind::LBrace, 2),
        punct(TokenKind::RBrace, 3),
        punct(TokenKind::RBrace, 4),
        word("after", 5),
    ];
    let mut cursor = TokenCursor::new(tokens, 4);
    let range = cursor.capture_braced().unwrap();
    assert_eq!(range.len(), 3);
    assert_eq!(range.tokens()[0].text, "a");
    assert_eq!(cursor.current().text, "after");
}

#[test]
fn test_capture_braced_requires_closing_brace() {
    let mut cursor = TokenCursor::new(vec![punct(TokenKind::LBrace, 0), word("a", 1)], 4);
    assert!(cursor.capture_braced().is_none());
    assert_eq!(cursor.current_kind(), TokenKind::LBrace);
}

#[test]
fn test_range_bounds_are_clamped() {
    let tokens: Rc<[Token]> = vec![word("a", 0)].into();
    let range = DeferredRange::new(tokens, 3, 9);
    assert!(range.is_empty());
    assert_eq!(range.span(), Span::DUMMY);
}
