//! Small capability traits.

use crate::{Name, Span, Token};

/// Types that carry a source location.
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Name {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
