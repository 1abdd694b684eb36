//! Statements and statement lists.

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Span, TokenKind};
use tracing::trace;

use super::push_stmt;
use crate::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::context::ParseContext;
use crate::stack::ensure_sufficient_stack;
use crate::symbols::{Binding, VarId};
use crate::{PResult, Parser, StaticFlow};

impl Parser {
    pub(crate) fn parse_top_level(&mut self, out: &mut Vec<Stmt>) -> PResult<()> {
        self.parse_list_into(None, out)
    }

    /// Parse statements up to `closing` (not consumed) or, when `None`, to
    /// the end of the active buffer.
    pub(crate) fn parse_item_list(&mut self, closing: Option<TokenKind>) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        self.parse_list_into(closing, &mut stmts)?;
        Ok(stmts)
    }

    fn parse_list_into(&mut self, closing: Option<TokenKind>, stmts: &mut Vec<Stmt>) -> PResult<()> {
        let splice_mark = self.pending_splices.len();
        loop {
            if self.static_flow.is_some() {
                self.skip_rest(closing);
                return Ok(());
            }
            if let Some(closing) = closing {
                if self.check(closing) {
                    return Ok(());
                }
                if self.at_eof() {
                    return Err(self.expected(&closing.describe()));
                }
            } else if self.at_eof() {
                return Ok(());
            }
            let pending_mark = self.pending_stmts.len();
            let stmt = self.parse_statement()?;
            stmts.extend(self.pending_stmts.drain(pending_mark..));
            push_stmt(stmts, stmt);
            self.activate_splices(splice_mark)?;
        }
    }

    pub(crate) fn parse_statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> PResult<Stmt> {
        match self.current_kind() {
            TokenKind::Syntax => self.parse_syntax_decl(),
            TokenKind::Typedata => self.parse_typedata_decl(),
            TokenKind::Comp => self.parse_comp_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Ok(self.empty(span))
            }
            _ if self.starts_declaration() => self.parse_declaration(),
            _ => self.parse_expr_statement(),
        }
    }

    /// Scope-less empty statement.
    pub(crate) fn empty(&self, span: Span) -> Stmt {
        Stmt::group(Vec::new(), span, self.body)
    }

    /// A statement in a position that takes exactly one (branch and loop
    /// bodies). Statements hoisted out of its expressions stay with it.
    fn parse_nested_statement(&mut self) -> PResult<Stmt> {
        let mark = self.pending_stmts.len();
        let stmt = self.parse_statement()?;
        if self.pending_stmts.len() == mark {
            return Ok(stmt);
        }
        let span = stmt.span;
        let mut stmts: Vec<Stmt> = self.pending_stmts.drain(mark..).collect();
        push_stmt(&mut stmts, stmt);
        Ok(Stmt::new(StmtKind::Block { body: None, stmts }, span, self.body))
    }

    fn parse_block(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let body = self.open_body(start)?;
        let stmts = self.with_body(body, |p| p.parse_item_list(Some(TokenKind::RBrace)))?;
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Stmt::new(
            StmtKind::Block {
                body: Some(body),
                stmts,
            },
            start.merge(end),
            self.body,
        ))
    }

    /// Parse `( expr )` as a condition.
    fn parse_condition(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        let cond = self.rvalue(cond);
        self.expect(TokenKind::RParen)?;
        if !(cond.ty.is_numeric() || cond.ty.is_pointer() || cond.ty.is_any()) {
            return Err(self.fail(
                ErrorKind::IncorrectType,
                cond.span,
                format!("condition must be numeric or a pointer, found `{}`", cond.ty),
            ));
        }
        Ok(cond)
    }

    fn static_truth(&mut self, cond: &Expr) -> PResult<Option<bool>> {
        let Some(value) = cond.literal_value() else {
            return Ok(None);
        };
        match value.truthy() {
            Some(truth) => Ok(Some(truth)),
            None => Err(self.fail(
                ErrorKind::IncorrectType,
                cond.span,
                format!("`{value}` has no truth value"),
            )),
        }
    }

    /// Context for the body of a runtime branch or loop.
    fn runtime_branch_context(&self) -> ParseContext {
        self.context
            .with(ParseContext::RUNTIME_BRANCH)
            .without(ParseContext::IN_STATIC_LOOP)
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::If)?.span;
        let cond = self.parse_condition()?;

        if let Some(truth) = self.static_truth(&cond)? {
            // Only the taken branch is parsed.
            let stmt = if truth {
                let stmt = self.parse_nested_statement()?;
                if self.eat(TokenKind::Else) {
                    self.skip_statement();
                }
                stmt
            } else {
                self.skip_statement();
                if self.eat(TokenKind::Else) {
                    self.parse_nested_statement()?
                } else {
                    self.empty(start)
                }
            };
            return Ok(stmt);
        }

        let ctx = self.runtime_branch_context();
        let then_branch = self.with_context(ctx, Self::parse_nested_statement)?;
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(
                self.with_context(ctx, Self::parse_nested_statement)?,
            ))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch: Box::new(then_branch),
                else_branch,
            },
            start.merge(self.previous_span()),
            self.body,
        ))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::While)?.span;
        let head = self.snapshot();
        let cond = self.parse_condition()?;

        if self.static_truth(&cond)?.is_some() {
            self.rewind(head);
            return self.unroll_while(start);
        }

        let ctx = self
            .runtime_branch_context()
            .with(ParseContext::IN_LOOP);
        let body = self.with_context(ctx, Self::parse_nested_statement)?;
        Ok(Stmt::new(
            StmtKind::While {
                cond,
                body: Box::new(body),
            },
            start.merge(self.previous_span()),
            self.body,
        ))
    }

    /// Unroll a loop whose condition folds, re-reading the condition and
    /// body from the same tokens on every iteration.
    fn unroll_while(&mut self, start: Span) -> PResult<Stmt> {
        let head = self.cursor.save();
        let ctx = self
            .context
            .with(ParseContext::IN_STATIC_LOOP)
            .without(ParseContext::IN_LOOP);
        let mut stmts = Vec::new();
        let mut iterations = 0usize;
        loop {
            self.cursor.restore(head.clone());
            let cond = self.parse_condition()?;
            let Some(truth) = self.static_truth(&cond)? else {
                return Err(self.fail(
                    ErrorKind::MustBeStatic,
                    cond.span,
                    "loop condition stopped being static while unrolling",
                ));
            };
            if !truth {
                self.skip_statement();
                break;
            }
            iterations += 1;
            if iterations > self.config.max_static_iterations {
                return Err(self.fail(
                    ErrorKind::RecursionLimit,
                    start,
                    format!(
                        "static loop exceeds {} iterations",
                        self.config.max_static_iterations
                    ),
                ));
            }
            let body = self.with_context(ctx, Self::parse_nested_statement)?;
            push_stmt(&mut stmts, body);
            match self.static_flow {
                Some(StaticFlow::Break) => {
                    self.static_flow = None;
                    break;
                }
                Some(StaticFlow::Continue) => self.static_flow = None,
                Some(StaticFlow::Return) => break,
                None => {}
            }
        }
        Ok(Stmt::group(stmts, start, self.body))
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expr()?;
            Some(self.rvalue(expr))
        };
        self.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());

        if self.context.in_syntax_body() && !self.context.in_runtime_branch() {
            self.expansion_value = Some(value.unwrap_or_else(|| Expr::nothing(span)));
            self.static_flow = Some(StaticFlow::Return);
            return Ok(self.empty(span));
        }
        let Some(ret) = self.fn_ret.clone() else {
            return Err(self.fail(
                ErrorKind::UnknownStatement,
                span,
                "`return` outside of a function",
            ));
        };
        match &value {
            Some(expr) if ret.is_void() && !expr.is_nothing() => {
                return Err(self.fail(
                    ErrorKind::IncorrectType,
                    expr.span,
                    "cannot return a value from a function returning `void`",
                ));
            }
            Some(expr) if !ret.is_void() && !kiln_types::is_castable(&ret, &expr.ty) => {
                return Err(self.fail(
                    ErrorKind::IncorrectType,
                    expr.span,
                    format!("expected `{ret}` return value, found `{}`", expr.ty),
                ));
            }
            None if !ret.is_void() => {
                return Err(self.fail(
                    ErrorKind::IncorrectType,
                    span,
                    format!("expected a `{ret}` return value"),
                ));
            }
            _ => {}
        }
        Ok(Stmt::new(StmtKind::Return(value), span, self.body))
    }

    fn parse_jump(&mut self) -> PResult<Stmt> {
        let token = self.advance();
        self.expect(TokenKind::Semicolon)?;
        let span = token.span;
        let is_break = token.kind == TokenKind::Break;
        if self.context.in_static_loop() {
            self.static_flow = Some(if is_break {
                StaticFlow::Break
            } else {
                StaticFlow::Continue
            });
            return Ok(self.empty(span));
        }
        if !self.context.in_loop() {
            return Err(self.fail(
                ErrorKind::UnknownStatement,
                span,
                format!("`{}` outside of a loop", token.text),
            ));
        }
        let kind = if is_break {
            StmtKind::Break
        } else {
            StmtKind::Continue
        };
        Ok(Stmt::new(kind, span, self.body))
    }

    fn parse_expr_statement(&mut self) -> PResult<Stmt> {
        let start = self.current_span();
        let expr = self.parse_expr()?;
        if self.eat(TokenKind::Eq) {
            let value = self.parse_expr()?;
            let value = self.rvalue(value);
            self.expect(TokenKind::Semicolon)?;
            return self.parse_assignment(expr, value, start.merge(self.previous_span()));
        }
        if expr.is_nothing() {
            // Statement macros need no terminator.
            self.eat(TokenKind::Semicolon);
            return Ok(self.empty(expr.span));
        }
        self.expect(TokenKind::Semicolon)?;
        let expr = self.rvalue(expr);
        let span = start.merge(self.previous_span());
        Ok(Stmt::new(StmtKind::Expr(expr), span, self.body))
    }

    fn parse_assignment(&mut self, target: Expr, value: Expr, span: Span) -> PResult<Stmt> {
        if !target.is_lvalue() {
            return Err(self.fail(
                ErrorKind::MustBeVariable,
                target.span,
                "left side of `=` must be a variable",
            ));
        }
        if target.ty.is_const() {
            return Err(self.fail(
                ErrorKind::IncorrectType,
                target.span,
                format!("cannot assign to constant of type `{}`", target.ty),
            ));
        }
        if !kiln_types::is_castable(&target.ty, &value.ty) {
            return Err(self.fail(
                ErrorKind::IncorrectType,
                value.span,
                format!("cannot assign `{}` to `{}`", value.ty, target.ty),
            ));
        }
        if let ExprKind::Var(var_ref) = &target.kind {
            if target.ty.is_static() && !self.context.defers_effects() {
                let var = var_ref.var;
                return self.assign_static(var, &target, value, span);
            }
        }
        Ok(Stmt::new(StmtKind::Assign { target, value }, span, self.body))
    }

    /// Assignment to a static variable: runs now, emits nothing.
    fn assign_static(&mut self, var: VarId, target: &Expr, value: Expr, span: Span) -> PResult<Stmt> {
        let Some(literal) = value.literal_value() else {
            return Err(self.fail(
                ErrorKind::MustBeStatic,
                value.span,
                format!("value assigned to static `{}` is not known at compile time", target.ty),
            ));
        };
        let Some(converted) = literal.convert(&target.ty) else {
            return Err(self.fail(
                ErrorKind::IncorrectType,
                value.span,
                format!("cannot convert `{literal}` to `{}`", target.ty),
            ));
        };
        trace!(var = var.raw(), value = %converted, "static assignment");
        self.tables.variables.get_mut(var).binding = Binding::Known(converted);
        Ok(self.empty(span))
    }
}
