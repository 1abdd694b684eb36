//! Longest-match search over the visible rules.

use std::rc::Rc;

use kiln_diagnostic::{ErrorKind, Fatal};
use kiln_ir::{Span, Token, TokenKind};
use kiln_types::{Type, TypeFlags, TypeKind};
use tracing::trace;

use super::{describe_nodes, SyntaxNode};
use crate::ast::Expr;
use crate::snapshot::ParserSnapshot;
use crate::symbols::RuleId;
use crate::value::Value;
use crate::{PResult, Parser};

/// One matched unit of input.
#[derive(Clone, Debug)]
pub(crate) enum Candidate {
    /// A parsed expression. `single` holds the token when the expression
    /// was exactly one token, so literal nodes can still match it.
    Expr { expr: Expr, single: Option<Token> },
    Token(Token),
    /// Raw run collected for a variadic node.
    Tokens(Vec<Token>),
}

impl Candidate {
    pub(crate) fn span(&self) -> Span {
        match self {
            Candidate::Expr { expr, .. } => expr.span,
            Candidate::Token(token) => token.span,
            Candidate::Tokens(tokens) => match (tokens.first(), tokens.last()) {
                (Some(first), Some(last)) => first.span.merge(last.span),
                _ => Span::DUMMY,
            },
        }
    }
}

pub(crate) enum MatchOutcome {
    Matched(RuleId),
    /// `prefix` candidates matched the start of some rule, which then
    /// wanted one of `expected`.
    NoMatch {
        prefix: usize,
        expected: Vec<SyntaxNode>,
    },
}

pub(crate) fn is_token_type(ty: &Type) -> bool {
    matches!(&ty.kind, TypeKind::Typedata(name) if name == kiln_types::TOKEN_TYPEDATA)
}

/// Whether a capture of type `ty` takes an expression of type `found`.
pub(crate) fn capture_accepts(ty: &Type, found: &Type) -> bool {
    kiln_types::is_castable(&ty.clone().with_flags(TypeFlags::PROTOTYPE_STATIC), found)
}

fn node_accepts(node: &SyntaxNode, candidate: &Candidate) -> bool {
    match (node, candidate) {
        (SyntaxNode::Literal(literal), Candidate::Token(token))
        | (
            SyntaxNode::Literal(literal),
            Candidate::Expr {
                single: Some(token),
                ..
            },
        ) => literal.same_as(token),
        (SyntaxNode::Capture { ty, .. }, Candidate::Expr { expr, single }) => {
            if is_token_type(ty) {
                return single.is_some();
            }
            capture_accepts(ty, &expr.ty)
                || (ty.is_word() && single.as_ref().is_some_and(|t| t.kind == TokenKind::Word))
        }
        (SyntaxNode::Capture { ty, .. }, Candidate::Token(token)) => {
            is_token_type(ty) || (ty.is_word() && token.kind == TokenKind::Word)
        }
        (SyntaxNode::TypeCapture { target, .. }, Candidate::Expr { expr, .. }) => {
            match expr.literal_value() {
                Some(Value::Type(ty)) => target.is_any() || kiln_types::equals(target, ty),
                _ => false,
            }
        }
        (SyntaxNode::Variadic { .. }, Candidate::Tokens(_)) => true,
        _ => false,
    }
}

impl Parser {
    /// An expression that may use syntax rules, with left-associative
    /// chaining: a committed expansion becomes the first candidate of the
    /// next search.
    pub(crate) fn parse_macro_expr(&mut self) -> PResult<Expr> {
        let first_token = self.current().clone();
        let (first, mut first_errors) = match self.speculate_unit()? {
            Ok(candidate) => (candidate, None),
            Err(diagnostics) => {
                if self.at_eof() {
                    return Err(self.reraise(diagnostics, first_token.span));
                }
                (Candidate::Token(self.advance()), Some(diagnostics))
            }
        };

        let mut candidates = vec![first];
        loop {
            match self.longest_match(&mut candidates)? {
                MatchOutcome::Matched(rule) => {
                    let matched = std::mem::take(&mut candidates);
                    let span = first_token.span.merge(self.previous_span());
                    let expr = self.expand_rule(rule, matched, span)?;
                    candidates.push(Candidate::Expr { expr, single: None });
                    first_errors = None;
                }
                MatchOutcome::NoMatch { prefix, expected } => {
                    if prefix >= 2 {
                        return Err(self.unknown_syntax(&expected, first_token.span));
                    }
                    return match candidates.pop() {
                        Some(Candidate::Expr { expr, .. }) => Ok(expr),
                        Some(other) => {
                            let span = other.span();
                            match first_errors {
                                Some(diagnostics) => Err(self.reraise(diagnostics, span)),
                                None => Err(self.unknown_syntax(&expected, span)),
                            }
                        }
                        None => Err(self.expected("an expression")),
                    };
                }
            }
        }
    }

    /// Expand a rule whose first node is a literal matching the current
    /// token. `None` (nothing consumed) when no rule starts that way.
    pub(crate) fn try_literal_rule(&mut self) -> PResult<Option<Expr>> {
        let token = self.current().clone();
        let starts_rule = self
            .tables
            .visible_rules(self.body)
            .into_iter()
            .any(|id| {
                matches!(
                    self.tables.rules.get(id).nodes.first(),
                    Some(SyntaxNode::Literal(literal)) if literal.same_as(&token)
                )
            });
        if !starts_rule {
            return Ok(None);
        }
        self.advance();
        let mut candidates = vec![Candidate::Token(token.clone())];
        match self.longest_match(&mut candidates)? {
            MatchOutcome::Matched(rule) => {
                let span = token.span.merge(self.previous_span());
                self.expand_rule(rule, candidates, span).map(Some)
            }
            MatchOutcome::NoMatch { expected, .. } => Err(self.unknown_syntax(&expected, token.span)),
        }
    }

    fn unknown_syntax(&mut self, expected: &[SyntaxNode], span: Span) -> Fatal {
        let message = if expected.is_empty() {
            "no syntax rule matches here".to_string()
        } else {
            format!(
                "no syntax rule matches here; expected {}",
                describe_nodes(expected)
            )
        };
        self.fail(ErrorKind::UnknownSyntax, span, message)
    }

    /// Try one operator-level expression.
    fn speculate_unit(&mut self) -> PResult<Result<Candidate, Vec<kiln_diagnostic::Diagnostic>>> {
        let first = self.current().clone();
        let before = self.cursor.save();
        let attempt = self.speculate(Self::parse_unit)?;
        Ok(attempt.map(|expr| {
            let single = (self.cursor.consumed_since(&before) == Some(1)).then_some(first);
            Candidate::Expr { expr, single }
        }))
    }

    /// Extend `candidates` one unit at a time while some rule still
    /// matches, and commit to the longest complete match. On success the
    /// parser sits after that match and `candidates` holds exactly its
    /// units; otherwise both are back where they started.
    pub(crate) fn longest_match(&mut self, candidates: &mut Vec<Candidate>) -> PResult<MatchOutcome> {
        let rules: Vec<(RuleId, Rc<[SyntaxNode]>)> = self
            .tables
            .visible_rules(self.body)
            .into_iter()
            .map(|id| (id, Rc::clone(&self.tables.rules.get(id).nodes)))
            .collect();
        let initial = candidates.len();
        let baseline = self.snapshot();
        let mut best: Option<(RuleId, usize, ParserSnapshot)> = None;
        let mut prefix = 0;
        let mut expected = Vec::new();

        loop {
            let n = candidates.len();
            let mut continuing = Vec::new();
            for (id, nodes) in &rules {
                if nodes.len() < n
                    || !nodes
                        .iter()
                        .zip(candidates.iter())
                        .all(|(node, candidate)| node_accepts(node, candidate))
                {
                    continue;
                }
                prefix = n;
                if nodes.len() == n {
                    // Most recent rule first: ties keep the first found.
                    if best.as_ref().map_or(true, |(_, len, _)| n > *len) {
                        best = Some((*id, n, self.snapshot()));
                    }
                } else {
                    continuing.push(nodes[n].clone());
                }
            }
            if continuing.is_empty() || self.at_eof() {
                if prefix == n && !continuing.is_empty() {
                    expected = continuing;
                }
                break;
            }
            let unit = self.next_unit(&continuing)?;
            expected = continuing;
            candidates.push(unit);
        }

        match best {
            Some((rule, len, snapshot)) => {
                self.rewind(snapshot);
                candidates.truncate(len);
                trace!(rule = rule.raw(), units = len, "syntax rule matched");
                Ok(MatchOutcome::Matched(rule))
            }
            None => {
                self.rewind(baseline);
                candidates.truncate(initial);
                Ok(MatchOutcome::NoMatch { prefix, expected })
            }
        }
    }

    /// Read the next unit, shaped by what the continuing rules expect.
    fn next_unit(&mut self, expected: &[SyntaxNode]) -> PResult<Candidate> {
        if let Some(terminator) = expected.iter().find_map(|node| match node {
            SyntaxNode::Variadic { terminator, .. } => Some(terminator.clone()),
            _ => None,
        }) {
            return Ok(Candidate::Tokens(self.collect_until(&terminator)));
        }
        if expected
            .iter()
            .all(|node| matches!(node, SyntaxNode::Literal(_)))
        {
            return Ok(Candidate::Token(self.advance()));
        }
        if expected
            .iter()
            .all(|node| matches!(node, SyntaxNode::Literal(_) | SyntaxNode::TypeCapture { .. }))
        {
            let start = self.current_span();
            if let Ok(ty) = self.speculate(Self::parse_type)? {
                let span = start.merge(self.previous_span());
                return Ok(Candidate::Expr {
                    expr: Expr::literal(Value::Type(ty), span),
                    single: None,
                });
            }
        }
        match self.speculate_unit()? {
            Ok(candidate) => Ok(candidate),
            Err(_) => Ok(Candidate::Token(self.advance())),
        }
    }

    /// Tokens up to `terminator` at nesting depth zero. The terminator
    /// and any unbalanced closing bracket stay in the input.
    fn collect_until(&mut self, terminator: &Token) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.current();
            if token.kind == TokenKind::Eof || (depth == 0 && token.same_as(terminator)) {
                return tokens;
            }
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return tokens;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            tokens.push(self.advance());
        }
    }
}
