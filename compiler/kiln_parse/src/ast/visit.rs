//! In-place rewriting of statement trees.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{Callee, Expr, ExprKind, Stmt, StmtKind};
use crate::symbols::VarId;

/// Hooks called on every node, children first.
pub(crate) trait Rewriter {
    fn stmt(&mut self, _stmt: &mut Stmt) {}
    fn expr(&mut self, _expr: &mut Expr) {}
}

pub(crate) fn rewrite_stmt(stmt: &mut Stmt, rw: &mut impl Rewriter) {
    match &mut stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => rewrite_expr(expr, rw),
        StmtKind::Assign { target, value } => {
            rewrite_expr(target, rw);
            rewrite_expr(value, rw);
        }
        StmtKind::VarDecl { init, .. } => {
            if let Some(init) = init {
                rewrite_expr(init, rw);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            rewrite_expr(cond, rw);
            rewrite_stmt(then_branch, rw);
            if let Some(else_branch) = else_branch {
                rewrite_stmt(else_branch, rw);
            }
        }
        StmtKind::While { cond, body } => {
            rewrite_expr(cond, rw);
            rewrite_stmt(body, rw);
        }
        StmtKind::Block { stmts, .. } => {
            for stmt in stmts {
                rewrite_stmt(stmt, rw);
            }
        }
        // Copy on write: other holders of the value keep the original.
        StmtKind::Inserted(shared) => rewrite_stmt(Rc::make_mut(shared), rw),
        StmtKind::Return(None)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Function(_)
        | StmtKind::Typedata(_)
        | StmtKind::Composite(_) => {}
    }
    rw.stmt(stmt);
}

pub(crate) fn rewrite_expr(expr: &mut Expr, rw: &mut impl Rewriter) {
    match &mut expr.kind {
        ExprKind::Unary { operand, .. } | ExprKind::Cast(operand) => rewrite_expr(operand, rw),
        ExprKind::Binary { left, right, .. } => {
            rewrite_expr(left, rw);
            rewrite_expr(right, rw);
        }
        ExprKind::Member { base, .. } => rewrite_expr(base, rw),
        ExprKind::Index { base, index } => {
            rewrite_expr(base, rw);
            rewrite_expr(index, rw);
        }
        ExprKind::Constructor(items) | ExprKind::Array(items) => {
            for item in items {
                rewrite_expr(item, rw);
            }
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            rewrite_expr(cond, rw);
            rewrite_expr(then_expr, rw);
            rewrite_expr(else_expr, rw);
        }
        ExprKind::Call { callee, args } => {
            if let Callee::Indirect(target) = callee {
                rewrite_expr(target, rw);
            }
            for arg in args {
                rewrite_expr(arg, rw);
            }
        }
        ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::Function(_) | ExprKind::Nothing => {}
    }
    rw.expr(expr);
}

struct VarRemap<'a>(&'a FxHashMap<VarId, VarId>);

impl Rewriter for VarRemap<'_> {
    fn stmt(&mut self, stmt: &mut Stmt) {
        if let StmtKind::VarDecl { var, .. } = &mut stmt.kind {
            if let Some(&new) = self.0.get(var) {
                *var = new;
            }
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        if let ExprKind::Var(var_ref) = &mut expr.kind {
            if let Some(&new) = self.0.get(&var_ref.var) {
                var_ref.var = new;
            }
        }
    }
}

/// Point declarations and references at re-registered variables.
pub(crate) fn remap_variables(stmt: &mut Stmt, map: &FxHashMap<VarId, VarId>) {
    if !map.is_empty() {
        rewrite_stmt(stmt, &mut VarRemap(map));
    }
}
