//! Kiln Lexer - tokenizer built on logos.
//!
//! Produces the flat token sequence the parser consumes. Literal text is
//! normalized here so the parser never re-inspects source spelling:
//! integers become decimal text, float literals lose their `f` suffix,
//! and string/character literals hold their decoded contents.

mod error;
mod escape;
mod raw_token;

use kiln_ir::{FileId, Span, Token, TokenKind, TokenList};
use logos::Logos;

pub use error::LexError;

use escape::unescape;
use raw_token::RawToken;

/// Lex source code into a `TokenList`.
///
/// Comments and whitespace are dropped. No end-of-input token is
/// appended; the cursor synthesizes one.
pub fn lex(source: &str, file: FileId) -> Result<TokenList, LexError> {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(file, logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => {}
            Ok(raw) => result.push(convert_token(raw, slice, span)?),
            Err(()) if slice.starts_with("/*") => {
                return Err(LexError::UnterminatedComment { span })
            }
            Err(()) => {
                return Err(LexError::Unrecognized {
                    text: slice.to_string(),
                    span,
                })
            }
        }
    }

    Ok(result)
}

/// Convert a raw token, decoding literal payloads.
fn convert_token(raw: RawToken, slice: &str, span: Span) -> Result<Token, LexError> {
    let kind = match raw {
        // Literals
        RawToken::Int => return decimal_int(slice, 10, slice, span),
        RawToken::HexInt => return decimal_int(&slice[2..], 16, slice, span),
        RawToken::Float => {
            let digits = &slice[..slice.len() - 1];
            return Ok(Token::new(TokenKind::Float, digits, span));
        }
        RawToken::Double => return Ok(Token::new(TokenKind::Double, slice, span)),
        RawToken::String => {
            let body = &slice[1..slice.len() - 1];
            let text = unescape(body).map_err(|escape| LexError::InvalidEscape { escape, span })?;
            return Ok(Token::new(TokenKind::Str, text, span));
        }
        RawToken::Char => {
            let body = &slice[1..slice.len() - 1];
            let text = unescape(body).map_err(|escape| LexError::InvalidEscape { escape, span })?;
            if text.len() != 1 || !text.is_ascii() {
                return Err(LexError::InvalidCharacter { span });
            }
            return Ok(Token::new(TokenKind::Char, text, span));
        }
        RawToken::Word => return Ok(Token::new(TokenKind::Word, slice, span)),

        // Keywords
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Static => TokenKind::Static,
        RawToken::Const => TokenKind::Const,
        RawToken::Syntax => TokenKind::Syntax,
        RawToken::Typedata => TokenKind::Typedata,
        RawToken::Comp => TokenKind::Comp,
        RawToken::Optional => TokenKind::Optional,
        RawToken::Up => TokenKind::Up,
        RawToken::Null => TokenKind::Null,
        RawToken::Quote => TokenKind::Quote,
        RawToken::Function => TokenKind::Function,

        // Builtin types
        RawToken::IntegerType => TokenKind::IntegerType,
        RawToken::FloatType => TokenKind::FloatType,
        RawToken::DoubleType => TokenKind::DoubleType,
        RawToken::CharacterType => TokenKind::CharacterType,
        RawToken::WordType => TokenKind::WordType,
        RawToken::VoidType => TokenKind::VoidType,
        RawToken::AnyType => TokenKind::AnyType,
        RawToken::TypeType => TokenKind::TypeType,

        // Punctuation
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Question => TokenKind::Question,

        // Operators
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,

        // Trivia is filtered by the caller
        RawToken::LineComment | RawToken::BlockComment => {
            return Err(LexError::Unrecognized {
                text: slice.to_string(),
                span,
            })
        }
    };
    Ok(Token::fixed(kind, span))
}

/// Parse an integer literal and store it as decimal text.
///
/// Values up to `u64::MAX` are accepted; the parser reinterprets the bits
/// as a signed 64-bit integer.
fn decimal_int(digits: &str, radix: u32, slice: &str, span: Span) -> Result<Token, LexError> {
    let value = u64::from_str_radix(digits, radix).map_err(|_| LexError::IntegerOverflow {
        text: slice.to_string(),
        span,
    })?;
    Ok(Token::new(TokenKind::Int, value.to_string(), span))
}

#[cfg(test)]
mod tests;
