//! Identifiers.
//!
//! A `Name` owns its text. Names spelled with a leading `$` are
//! anonymous: they stay distinct per declaration and are renamed to a
//! unique spelling when a module is handed to code generation.

use std::fmt;

use crate::{Span, Token, TokenKind};

/// Sigil marking an anonymous identifier.
pub const ANONYMOUS_SIGIL: char = '$';

/// Identifier text with its location.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Name {
    /// Spelling without the anonymity sigil.
    pub text: String,
    pub span: Span,
    pub anonymous: bool,
}

impl Name {
    /// Create a name, detecting the anonymity sigil.
    pub fn new(text: &str, span: Span) -> Self {
        match text.strip_prefix(ANONYMOUS_SIGIL) {
            Some(rest) => Name {
                text: rest.to_string(),
                span,
                anonymous: true,
            },
            None => Name {
                text: text.to_string(),
                span,
                anonymous: false,
            },
        }
    }

    /// Create a name from a word token. Returns `None` for other kinds.
    pub fn from_token(token: &Token) -> Option<Self> {
        (token.kind == TokenKind::Word).then(|| Name::new(&token.text, token.span))
    }

    /// Compare against another name ignoring location.
    #[inline]
    pub fn same_as(&self, other: &Name) -> bool {
        self.anonymous == other.anonymous && self.text == other.text
    }

    /// Compare against source spelling (including any sigil).
    pub fn matches(&self, spelled: &str) -> bool {
        match spelled.strip_prefix(ANONYMOUS_SIGIL) {
            Some(rest) => self.anonymous && self.text == rest,
            None => !self.anonymous && self.text == spelled,
        }
    }

    /// Spelling as written in source.
    pub fn spelling(&self) -> String {
        if self.anonymous {
            format!("{ANONYMOUS_SIGIL}{}", self.text)
        } else {
            self.text.clone()
        }
    }

    /// Replace an anonymous name by a concrete one unique to `id`.
    #[must_use]
    pub fn alpha_renamed(&self, id: usize) -> Name {
        if !self.anonymous {
            return self.clone();
        }
        Name {
            text: format!("{}__{id}", self.text),
            span: self.span,
            anonymous: false,
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.spelling())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.anonymous {
            f.write_str("$")?;
        }
        f.write_str(&self.text)
    }
}
