use kiln_diagnostic::{Diagnostic, ErrorKind};
use kiln_ir::Span;
use thiserror::Error;

/// Tokenizer failure. Lexing stops at the first one.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LexError {
    #[error("unrecognized input `{text}`")]
    Unrecognized { text: String, span: Span },

    #[error("invalid escape sequence `\\{escape}`")]
    InvalidEscape { escape: char, span: Span },

    #[error("integer literal `{text}` does not fit in 64 bits")]
    IntegerOverflow { text: String, span: Span },

    #[error("character literal must hold exactly one ASCII character")]
    InvalidCharacter { span: Span },

    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::Unrecognized { span, .. }
            | LexError::InvalidEscape { span, .. }
            | LexError::IntegerOverflow { span, .. }
            | LexError::InvalidCharacter { span }
            | LexError::UnterminatedComment { span } => *span,
        }
    }

    /// Convert into a fatal `InvalidToken` diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(ErrorKind::InvalidToken, self.span()).with_message(self.to_string())
    }
}
