//! `get_statements` and `insert`.

use std::rc::Rc;

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Name, Span};
use kiln_types::{Type, STATEMENT_TYPEDATA, TOKEN_TYPEDATA};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::{remap_variables, Expr, ExprKind, Stmt, StmtKind};
use crate::context::ParseContext;
use crate::cursor::DeferredRange;
use crate::symbols::{FunctionId, Variable};
use crate::value::Value;
use crate::{PResult, Parser};

impl Parser {
    /// Parse the body of `id` under the current scope and hand it back
    /// as statement values.
    pub(crate) fn get_statements(&mut self, id: FunctionId, span: Span) -> PResult<Expr> {
        let function = self.tables.functions.get(id);
        let Some(range) = function.body_tokens.clone() else {
            let message = format!("function `{}` has no body", function.name);
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        };
        let sig = function.sig.clone();
        let is_static = function.is_static;
        let fn_span = function.span;

        let body = self.open_body(span)?;
        for param in &sig.params {
            let ty = if is_static {
                param.ty.clone().as_prototype()
            } else {
                param.ty.clone()
            };
            self.tables
                .define_variable(Variable::new(Name::new(&param.name, fn_span), ty), Some(body))
                .map_err(|err| self.table_error(err, span))?;
        }
        let mut ctx = self
            .context
            .without(ParseContext::FUNCTION_SCOPED.union(ParseContext::IN_SYNTAX_BODY))
            .with(ParseContext::IN_FUNCTION);
        if is_static {
            ctx = ctx.with(ParseContext::DEFER_EFFECTS);
        }
        let stmts = self.with_body(body, |p| {
            p.with_context(ctx, |p| {
                p.with_function_frame((*sig.ret).clone(), |p| p.parse_deferred_list(range, span))
            })
        })?;
        debug!(function = id.raw(), statements = stmts.len(), "get_statements");

        let values = stmts.into_iter().map(|stmt| Value::Stmt(Rc::new(stmt))).collect();
        Ok(Expr::new(
            ExprKind::Literal(Value::Array(values)),
            Type::statement_array(),
            span,
        ))
    }

    /// Splice statement values into the call site's statement list, or
    /// token values into the input after the call site's statement.
    pub(crate) fn insert(&mut self, arg: &Expr, span: Span) -> PResult<()> {
        let is_statements = arg.ty.is_array_of_typedata(STATEMENT_TYPEDATA);
        if !is_statements && !arg.ty.is_array_of_typedata(TOKEN_TYPEDATA) {
            let message = format!("`insert` expects `statement[]` or `token[]`, found `{}`", arg.ty);
            return Err(self.fail(ErrorKind::IncorrectType, arg.span, message));
        }
        let Some(Value::Array(items)) = arg.literal_value() else {
            return Err(self.fail(
                ErrorKind::MustBeStatic,
                arg.span,
                "`insert` needs a value known at compile time",
            ));
        };

        if is_statements {
            let stmts: Option<Vec<Rc<Stmt>>> = items
                .iter()
                .map(|item| match item {
                    Value::Stmt(stmt) => Some(Rc::clone(stmt)),
                    _ => None,
                })
                .collect();
            let Some(stmts) = stmts else {
                return Err(self.fail(ErrorKind::IncorrectType, arg.span, "expected statement values"));
            };
            return self.insert_statements(stmts, span);
        }

        let tokens: Option<Vec<_>> = items
            .iter()
            .map(|item| match item {
                Value::Token(token) => Some(token.clone()),
                _ => None,
            })
            .collect();
        let Some(tokens) = tokens else {
            return Err(self.fail(ErrorKind::IncorrectType, arg.span, "expected token values"));
        };
        debug!(tokens = tokens.len(), "insert tokens");
        if !tokens.is_empty() {
            self.pending_splices.push(DeferredRange::from_tokens(tokens));
        }
        Ok(())
    }

    /// Declarations at the top of the inserted list are re-registered in
    /// the call site's body so the code after the call can use them.
    fn insert_statements(&mut self, stmts: Vec<Rc<Stmt>>, span: Span) -> PResult<()> {
        let home = self
            .expansions
            .last()
            .map_or(self.body, |frame| frame.outer_body);
        let mut renamed = FxHashMap::default();
        for stmt in &stmts {
            if let StmtKind::VarDecl { var, .. } = &stmt.kind {
                let variable = self.tables.variables.get(*var).clone();
                let new = self
                    .tables
                    .define_variable(variable, home)
                    .map_err(|err| self.table_error(err, span))?;
                renamed.insert(*var, new);
            }
        }
        debug!(
            statements = stmts.len(),
            redeclared = renamed.len(),
            "insert statements"
        );
        for shared in stmts {
            let stmt = if renamed.is_empty() {
                Stmt::new(StmtKind::Inserted(shared), span, home)
            } else {
                let mut stmt = (*shared).clone();
                remap_variables(&mut stmt, &renamed);
                stmt.home = home;
                stmt
            };
            self.pending_stmts.push(stmt);
        }
        Ok(())
    }
}
