//! Kiln IR - shared front-end vocabulary
//!
//! This crate contains the data every other front-end crate speaks:
//! - Spans and the source map used to resolve them to `file:line:col`
//! - Tokens and `TokenList` for tokenizer output
//! - Names (identifiers, possibly anonymous)

mod name;
mod span;
mod token;
mod traits;

pub use name::{Name, ANONYMOUS_SIGIL};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use token::{Token, TokenKind, TokenList};
pub use traits::Spanned;
