//! Grammar productions.
//!
//! - `stmt`: statement forms and statement lists
//! - `decl`: variable, function, typedata and composite declarations
//! - `ty`: type specifiers
//! - `expr`: expressions, operators, calls and built-ins
//!
//! This module holds the scaffolding they share: scoped context and
//! body switches, cursor state entry, raw token skipping.

mod decl;
mod expr;
mod stmt;
mod ty;

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Span, TokenKind};
use kiln_types::Type;

use crate::ast::Stmt;
use crate::context::ParseContext;
use crate::cursor::{DeferredRange, StateKind};
use crate::symbols::BodyId;
use crate::{PResult, Parser};

impl Parser {
    /// Run `f` with `context` as the parse context, restoring the previous
    /// flags afterwards.
    pub(crate) fn with_context<T>(
        &mut self,
        context: ParseContext,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = saved;
        result
    }

    /// Run `f` inside `body`. Leaving marks everything declared in the
    /// body out of scope.
    pub(crate) fn with_body<T>(&mut self, body: BodyId, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.body, Some(body));
        let result = f(self);
        self.body = saved;
        self.tables.clear_scope(body);
        result
    }

    /// Open a body nested in the current one.
    pub(crate) fn open_body(&mut self, span: Span) -> PResult<BodyId> {
        self.open_body_in(self.body, span)
    }

    pub(crate) fn open_body_in(&mut self, parent: Option<BodyId>, span: Span) -> PResult<BodyId> {
        self.tables
            .new_body(parent)
            .map_err(|err| self.table_error(err, span))
    }

    /// Run `f` as the body of a function returning `ret`. Static control
    /// flow and syntax body results of the caller are set aside.
    pub(crate) fn with_function_frame<T>(
        &mut self,
        ret: Type,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved_ret = self.fn_ret.replace(ret);
        let saved_flow = self.static_flow.take();
        let saved_value = self.expansion_value.take();
        let result = f(self);
        self.fn_ret = saved_ret;
        self.static_flow = saved_flow;
        self.expansion_value = saved_value;
        result
    }

    /// Make `range` the active token buffer. Returns the depth to pass to
    /// [`Parser::leave_to`].
    pub(crate) fn enter_state(
        &mut self,
        range: DeferredRange,
        kind: StateKind,
        span: Span,
    ) -> PResult<usize> {
        let depth = self.cursor.depth();
        match self.cursor.enter(range, kind) {
            Ok(()) => Ok(depth),
            Err(err) => Err(self.fail(ErrorKind::MaxMacroDepth, span, err.to_string())),
        }
    }

    pub(crate) fn leave_to(&mut self, depth: usize) {
        self.cursor.leave_to(depth);
    }

    /// Parse a deferred token range to its end as a statement list.
    pub(crate) fn parse_deferred_list(&mut self, range: DeferredRange, span: Span) -> PResult<Vec<Stmt>> {
        let depth = self.enter_state(range, StateKind::Deferred, span)?;
        let result = self.parse_item_list(None);
        self.leave_to(depth);
        result
    }

    /// Enter the token runs queued by `insert` since `mark`, first run
    /// first.
    pub(crate) fn activate_splices(&mut self, mark: usize) -> PResult<()> {
        if self.pending_splices.len() <= mark || self.context.in_syntax_body() {
            return Ok(());
        }
        let span = self.previous_span();
        let splices: Vec<_> = self.pending_splices.drain(mark..).collect();
        for range in splices.into_iter().rev() {
            self.enter_state(range, StateKind::Splice, span)?;
        }
        Ok(())
    }

    // === Raw skipping ===

    /// Skip one balanced group starting at the current opening token.
    pub(crate) fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip one statement without parsing it.
    pub(crate) fn skip_statement(&mut self) {
        match self.current_kind() {
            TokenKind::LBrace => self.skip_group(),
            TokenKind::If => {
                self.advance();
                self.skip_group();
                self.skip_statement();
                if self.eat(TokenKind::Else) {
                    self.skip_statement();
                }
            }
            TokenKind::While => {
                self.advance();
                self.skip_group();
                self.skip_statement();
            }
            _ => loop {
                match self.current_kind() {
                    TokenKind::Eof | TokenKind::RBrace => return,
                    TokenKind::Semicolon => {
                        self.advance();
                        return;
                    }
                    TokenKind::LBrace => {
                        self.skip_group();
                        return;
                    }
                    TokenKind::LParen | TokenKind::LBracket => self.skip_group(),
                    _ => {
                        self.advance();
                    }
                }
            },
        }
    }

    /// Skip to `closing` (not consumed) or the end of the active buffer.
    pub(crate) fn skip_rest(&mut self, closing: Option<TokenKind>) {
        loop {
            let kind = self.current_kind();
            if kind == TokenKind::Eof || Some(kind) == closing {
                return;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_group(),
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Append a statement, flattening scope-less groups.
pub(crate) fn push_stmt(stmts: &mut Vec<Stmt>, stmt: Stmt) {
    if stmt.is_group() {
        if let crate::ast::StmtKind::Block { stmts: inner, .. } = stmt.kind {
            stmts.extend(inner);
        }
    } else {
        stmts.push(stmt);
    }
}
