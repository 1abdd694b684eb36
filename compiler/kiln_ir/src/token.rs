//! Token definitions shared by the lexer, the parser and macro values.
//!
//! Tokens own their text: macro expansion may splice synthesized tokens
//! into the stream, and those never borrow from a source buffer.

use std::fmt;
use std::ops::Index;

use crate::Span;

/// Token kind tag.
///
/// Payload-carrying kinds (`Word`, literals) keep their text in
/// [`Token::text`]; every other kind has a fixed spelling given by
/// [`TokenKind::fixed_text`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // === Payload kinds ===
    /// Identifier.
    Word,
    /// Integer literal (decimal or `0x` hex).
    Int,
    /// Single precision literal (`1.5f`).
    Float,
    /// Double precision literal (`1.5`).
    Double,
    /// Character literal, text holds the decoded character.
    Char,
    /// String literal, text holds the decoded contents.
    Str,

    // === Keywords ===
    If,
    Else,
    While,
    Return,
    Break,
    Continue,
    Static,
    Const,
    Syntax,
    Typedata,
    Comp,
    Optional,
    Up,
    Null,
    Quote,
    Function,

    // === Builtin type keywords ===
    IntegerType,
    FloatType,
    DoubleType,
    CharacterType,
    WordType,
    VoidType,
    AnyType,
    TypeType,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Arrow,
    Ellipsis,
    Question,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Bang,
    Tilde,
    Shl,
    Shr,

    /// End of the active token buffer (never produced by the lexer).
    Eof,
}

impl TokenKind {
    /// The fixed spelling of keyword and punctuation kinds.
    ///
    /// Returns `None` for payload kinds whose text varies.
    pub fn fixed_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Word
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Char
            | TokenKind::Str => return None,
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Static => "static",
            TokenKind::Const => "const",
            TokenKind::Syntax => "syntax",
            TokenKind::Typedata => "typedata",
            TokenKind::Comp => "comp",
            TokenKind::Optional => "optional",
            TokenKind::Up => "up",
            TokenKind::Null => "null",
            TokenKind::Quote => "quote",
            TokenKind::Function => "function",
            TokenKind::IntegerType => "integer",
            TokenKind::FloatType => "float",
            TokenKind::DoubleType => "double",
            TokenKind::CharacterType => "character",
            TokenKind::WordType => "word",
            TokenKind::VoidType => "void",
            TokenKind::AnyType => "any",
            TokenKind::TypeType => "type",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::Ellipsis => "...",
            TokenKind::Question => "?",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Eof => "<end of input>",
        };
        Some(text)
    }

    /// Check if this kind names a builtin type.
    #[inline]
    pub fn is_builtin_type(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerType
                | TokenKind::FloatType
                | TokenKind::DoubleType
                | TokenKind::CharacterType
                | TokenKind::WordType
                | TokenKind::VoidType
                | TokenKind::AnyType
                | TokenKind::TypeType
        )
    }

    /// Check if this kind is a literal.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Char
                | TokenKind::Str
        )
    }

    /// Human-readable description for "expected X" messages.
    pub fn describe(self) -> String {
        match self {
            TokenKind::Word => "an identifier".to_string(),
            TokenKind::Int => "an integer literal".to_string(),
            TokenKind::Float | TokenKind::Double => "a floating point literal".to_string(),
            TokenKind::Char => "a character literal".to_string(),
            TokenKind::Str => "a string literal".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.fixed_text().unwrap_or("?")),
        }
    }
}

/// A token: kind, text payload and location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Create a token with an explicit text payload.
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Create a keyword/punctuation token using its fixed spelling.
    pub fn fixed(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            text: kind.fixed_text().unwrap_or_default().to_string(),
            span,
        }
    }

    /// End-of-buffer marker at the given location.
    pub fn eof(span: Span) -> Self {
        Token::fixed(TokenKind::Eof, span)
    }

    /// Token identity used by syntax rule matching: same kind and text,
    /// location ignored.
    #[inline]
    pub fn same_as(&self, other: &Token) -> bool {
        self.kind == other.kind && self.text == other.text
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_word(&self, text: &str) -> bool {
        self.kind == TokenKind::Word && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Str => write!(f, "{:?}", self.text),
            TokenKind::Char => write!(f, "'{}'", self.text.escape_default()),
            TokenKind::Float => write!(f, "{}f", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

/// Flat token sequence produced by the tokenizer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl From<Vec<Token>> for TokenList {
    fn from(tokens: Vec<Token>) -> Self {
        TokenList { tokens }
    }
}

impl Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests;
