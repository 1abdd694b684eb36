//! Syntax rules: declaration, longest-match search and expansion.
//!
//! A rule is a sequence of pattern nodes plus a body token range. At an
//! expression position the parser collects candidates one unit at a
//! time (an expression, a bare token, a type or a raw token run, guided
//! by what the still-matching rules expect next) and keeps the longest
//! complete match. Expanding a rule binds its captures as variables of a
//! fresh body and parses the rule body inside that body.
//!
//! - `decl`: `syntax` declarations
//! - `matcher`: candidates and the longest-match search
//! - `expand`: capture binding and body expansion
//! - `insert`: the `get_statements` and `insert` built-ins

mod decl;
mod expand;
mod insert;
mod matcher;

use std::fmt;

use kiln_ir::{Name, Span, Token};
use kiln_types::Type;

use crate::symbols::{BodyId, RuleId};

pub(crate) use matcher::Candidate;

/// One element of a rule pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxNode {
    /// Matches a token with the same kind and text.
    Literal(Token),
    /// Binds an expression castable to `ty`.
    Capture { name: Name, ty: Type },
    /// Binds a type, written `[name : type<target>]`.
    TypeCapture { name: Name, target: Type },
    /// Binds the raw tokens up to `terminator`, which stays in the input.
    Variadic { name: Name, terminator: Token },
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxNode::Literal(token) => write!(f, "`{token}`"),
            SyntaxNode::Capture { name, ty } => write!(f, "[{name}: {ty}]"),
            SyntaxNode::TypeCapture { name, target } => write!(f, "[{name}: type<{target}>]"),
            SyntaxNode::Variadic { name, terminator } => write!(f, "[{name} ... {terminator}]"),
        }
    }
}

/// An active expansion.
#[derive(Clone, Debug)]
pub(crate) struct ExpansionFrame {
    pub rule: RuleId,
    /// Span of the matched input, labeled on errors raised inside.
    pub call_span: Span,
    /// Body of the call site.
    pub outer_body: Option<BodyId>,
}

/// Render nodes for diagnostics.
pub(crate) fn describe_nodes(nodes: &[SyntaxNode]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Render a rule pattern, e.g. ``[a: integer] `plus` [b: integer]``.
pub(crate) fn describe_pattern(nodes: &[SyntaxNode]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
