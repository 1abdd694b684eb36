//! `syntax` declarations.

use kiln_diagnostic::ErrorKind;
use kiln_ir::TokenKind;
use kiln_types::TypeKind;
use tracing::debug;

use super::SyntaxNode;
use crate::ast::Stmt;
use crate::symbols::SyntaxRule;
use crate::{PResult, Parser};

impl Parser {
    /// `syntax node+ { body }`
    ///
    /// The rule is registered in the current body, so a rule declared
    /// inside a block or another rule's body goes away with it.
    pub(crate) fn parse_syntax_decl(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Syntax)?.span;
        let mut nodes = Vec::new();
        while !self.check(TokenKind::LBrace) {
            if self.at_eof() {
                return Err(self.expected("a syntax rule body"));
            }
            if !self.eat(TokenKind::LBracket) {
                nodes.push(SyntaxNode::Literal(self.advance()));
                continue;
            }
            let name = self.expect_word()?;
            if self.eat(TokenKind::Ellipsis) {
                if self.at_eof() {
                    return Err(self.expected("a terminator token"));
                }
                let terminator = self.advance();
                self.expect(TokenKind::RBracket)?;
                nodes.push(SyntaxNode::Variadic { name, terminator });
                continue;
            }
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            self.expect(TokenKind::RBracket)?;
            nodes.push(match ty.kind {
                TypeKind::ObjectType(target) => SyntaxNode::TypeCapture {
                    name,
                    target: *target,
                },
                _ => SyntaxNode::Capture { name, ty },
            });
        }
        let Some(body) = self.cursor.capture_braced() else {
            return Err(self.expected("`}`"));
        };
        let span = start.merge(self.previous_span());

        if !nodes.iter().any(|node| matches!(node, SyntaxNode::Literal(_))) {
            return Err(self.fail(
                ErrorKind::UnknownSyntax,
                span,
                "a syntax rule needs at least one literal token",
            ));
        }
        if matches!(nodes.first(), Some(SyntaxNode::Variadic { .. })) {
            return Err(self.fail(
                ErrorKind::UnknownSyntax,
                span,
                "a syntax rule cannot start with a token run",
            ));
        }

        let pattern = nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let rule = SyntaxRule {
            nodes: nodes.into(),
            body,
            span,
        };
        let id = self
            .tables
            .define_rule(rule, self.body)
            .map_err(|err| self.table_error(err, span))?;
        debug!(rule = id.raw(), %pattern, "registered syntax rule");
        Ok(self.empty(span))
    }
}
