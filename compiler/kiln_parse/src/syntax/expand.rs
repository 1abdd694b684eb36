//! Rule expansion.
//!
//! Each expansion gets a fresh body under the call site's body. Captures
//! are declared there as variables, so the rule body sees them by name
//! and sees the call site's own declarations through the parent chain.
//! Leaving the body masks the captures again.

use kiln_diagnostic::ErrorKind;
use kiln_ir::Span;
use kiln_types::{Type, TypeKind};
use tracing::{debug, trace};

use super::matcher::{capture_accepts, is_token_type};
use super::{Candidate, ExpansionFrame, SyntaxNode};
use crate::ast::{Expr, Stmt};
use crate::context::ParseContext;
use crate::cursor::StateKind;
use crate::grammar::push_stmt;
use crate::symbols::{Binding, BodyId, RuleId, Variable};
use crate::value::Value;
use crate::{PResult, Parser, StaticFlow};

impl Parser {
    /// Expand `rule` with the matched `candidates` and return the value
    /// of its body. Statements the body produces are queued in front of
    /// the statement holding the call.
    pub(crate) fn expand_rule(
        &mut self,
        rule_id: RuleId,
        candidates: Vec<Candidate>,
        span: Span,
    ) -> PResult<Expr> {
        if self.expansions.len() >= self.config.max_macro_depth {
            return Err(self.fail(
                ErrorKind::MaxMacroDepth,
                span,
                format!(
                    "syntax rules nest deeper than {} expansions",
                    self.config.max_macro_depth
                ),
            ));
        }
        let rule = self.tables.rules.get(rule_id).clone();
        let body = self.open_body(span)?;
        for (node, candidate) in rule.nodes.iter().zip(candidates) {
            self.bind_capture(node, candidate, body)?;
        }

        debug!(
            rule = rule_id.raw(),
            depth = self.expansions.len() + 1,
            "expanding syntax rule"
        );
        self.expansions.push(ExpansionFrame {
            rule: rule_id,
            call_span: span,
            outer_body: self.body,
        });
        let depth = match self.enter_state(rule.body.clone(), StateKind::Expansion, span) {
            Ok(depth) => depth,
            Err(fatal) => {
                self.expansions.pop();
                return Err(fatal);
            }
        };

        let ctx = self
            .context
            .with(ParseContext::IN_SYNTAX_BODY)
            .without(ParseContext::RUNTIME_BRANCH);
        let saved_flow = self.static_flow.take();
        let saved_value = self.expansion_value.take();
        let result = self.with_body(body, |p| p.with_context(ctx, Self::parse_expansion_body));
        let flow = std::mem::replace(&mut self.static_flow, saved_flow);
        let value = std::mem::replace(&mut self.expansion_value, saved_value);
        self.leave_to(depth);
        self.expansions.pop();

        let stmts = result?;
        if matches!(flow, Some(StaticFlow::Break | StaticFlow::Continue)) {
            // Steers the static loop around the call site.
            self.static_flow = flow;
        }
        trace!(
            rule = rule_id.raw(),
            statements = stmts.len(),
            "syntax rule expanded"
        );
        self.pending_stmts.extend(stmts);
        Ok(value.unwrap_or_else(|| Expr::nothing(span)))
    }

    /// Statements of the active expansion, until its tokens run out or a
    /// static `return`, `break` or `continue` ends it.
    fn parse_expansion_body(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.at_eof() && self.static_flow.is_none() {
            let mark = self.pending_stmts.len();
            let stmt = self.parse_statement()?;
            stmts.extend(self.pending_stmts.drain(mark..));
            push_stmt(&mut stmts, stmt);
        }
        Ok(stmts)
    }

    fn bind_capture(&mut self, node: &SyntaxNode, candidate: Candidate, body: BodyId) -> PResult<()> {
        let span = candidate.span();
        let (name, ty, binding) = match (node, candidate) {
            (SyntaxNode::Literal(_), _) => return Ok(()),
            (SyntaxNode::Capture { name, ty }, candidate) => {
                let (ty, binding) = self.capture_binding(ty, candidate, span)?;
                (name.clone(), ty, binding)
            }
            (SyntaxNode::TypeCapture { name, .. }, Candidate::Expr { expr, .. }) => {
                let Some(Value::Type(target)) = expr.literal_value() else {
                    return Err(self.fail(ErrorKind::IncorrectType, span, "expected a type"));
                };
                let ty = Type::object_type(target.clone()).with_static();
                (name.clone(), ty, Binding::Known(Value::Type(target.clone())))
            }
            (SyntaxNode::Variadic { name, .. }, Candidate::Tokens(tokens)) => {
                let value = Value::Array(tokens.into_iter().map(Value::Token).collect());
                (name.clone(), Type::token_array(), Binding::Known(value))
            }
            (node, _) => {
                return Err(self.fail(
                    ErrorKind::UnknownSyntax,
                    span,
                    format!("input does not fit {node}"),
                ))
            }
        };
        let variable = Variable {
            name,
            ty,
            binding,
            macro_bound: true,
        };
        self.tables
            .define_variable(variable, Some(body))
            .map_err(|err| self.table_error(err, span))?;
        Ok(())
    }

    /// Type and binding of an expression capture of type `ty`.
    fn capture_binding(
        &mut self,
        ty: &Type,
        candidate: Candidate,
        span: Span,
    ) -> PResult<(Type, Binding)> {
        let token_ty = || Type::typedata(kiln_types::TOKEN_TYPEDATA).with_static();
        match candidate {
            Candidate::Token(token) | Candidate::Expr { single: Some(token), .. }
                if is_token_type(ty) =>
            {
                Ok((token_ty(), Binding::Known(Value::Token(token))))
            }
            Candidate::Expr { expr, single } => {
                if capture_accepts(ty, &expr.ty) {
                    if let Some(value) = expr.literal_value() {
                        let Some(value) = value.convert(ty) else {
                            let message = format!("cannot convert `{value}` to `{ty}`");
                            return Err(self.fail(ErrorKind::IncorrectType, span, message));
                        };
                        let unsized_array =
                            matches!(&ty.kind, TypeKind::Array(array) if array.length.is_none());
                        let bound_ty = if ty.is_any() || unsized_array {
                            expr.ty.clone()
                        } else {
                            ty.clone().with_static()
                        };
                        return Ok((bound_ty, Binding::Known(value)));
                    }
                    return Ok((expr.ty.clone(), Binding::Expr(Box::new(expr))));
                }
                match single {
                    Some(token) if ty.is_word() => {
                        Ok((Type::word().with_static(), Binding::Known(Value::Word(token.text))))
                    }
                    _ => {
                        let message = format!("expected `{ty}`, found `{}`", expr.ty);
                        Err(self.fail(ErrorKind::IncorrectType, span, message))
                    }
                }
            }
            Candidate::Token(token) if ty.is_word() => {
                Ok((Type::word().with_static(), Binding::Known(Value::Word(token.text))))
            }
            Candidate::Token(token) => Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("expected `{ty}`, found `{token}`"),
            )),
            Candidate::Tokens(_) => Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("expected `{ty}`, found a token run"),
            )),
        }
    }
}
