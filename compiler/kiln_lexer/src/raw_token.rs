//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! literal decoding and conversion to `kiln_ir::TokenKind`.

use logos::Logos;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", skip_block_comment)]
    BlockComment,

    // Keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("static")]
    Static,
    #[token("const")]
    Const,
    #[token("syntax")]
    Syntax,
    #[token("typedata")]
    Typedata,
    #[token("comp")]
    Comp,
    #[token("optional")]
    Optional,
    #[token("up")]
    Up,
    #[token("null")]
    Null,
    #[token("quote")]
    Quote,
    #[token("function")]
    Function,

    // Builtin types
    #[token("integer")]
    IntegerType,
    #[token("float")]
    FloatType,
    #[token("double")]
    DoubleType,
    #[token("character")]
    CharacterType,
    #[token("word")]
    WordType,
    #[token("void")]
    VoidType,
    #[token("any")]
    AnyType,
    #[token("type")]
    TypeType,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,

    // Operators
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    // Literals
    #[regex(r"0x[0-9a-fA-F]+")]
    HexInt,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?f")]
    Float,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Double,

    // String literal (no unescaped newlines allowed)
    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    String,

    // Char literal (no unescaped newlines allowed)
    #[regex(r"'([^'\\\n\r]|\\.)'")]
    Char,

    // Identifier, `$` prefix marks an anonymous name
    #[regex(r"\$?[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
}

/// Consume a block comment body through the closing `*/`. Block comments
/// do not nest; an unterminated one is a lex error.
fn skip_block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}
