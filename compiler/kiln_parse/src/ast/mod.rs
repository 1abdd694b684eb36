//! Statement and expression trees.
//!
//! Nodes own their children. Two kinds of node point elsewhere:
//! variable references carry the [`VarId`] they resolved to plus the
//! lexical body the lookup ran in, and [`StmtKind::Inserted`] shares a
//! statement value handed out by `get_statements` without copying it.

mod ops;
mod visit;

use std::rc::Rc;

use kiln_ir::{Name, Span};
use kiln_types::Type;

use crate::eval::Builtin;
use crate::symbols::{BodyId, CompId, FunctionId, TypedataId, VarId};
use crate::value::Value;

pub use ops::{BinaryOp, UnaryOp};
pub(crate) use visit::{remap_variables, rewrite_stmt, Rewriter};

/// A typed expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Folded or literal compile-time value.
    Literal(Value),
    Var(VarRef),
    /// A function used as a value.
    Function(FunctionId),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Explicit conversion to `Expr::ty`.
    Cast(Box<Expr>),
    Member {
        base: Box<Expr>,
        member: Name,
        /// Position of the member in its typedata.
        index: usize,
        /// Written `->`.
        through_pointer: bool,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Typedata constructor; the typedata is named by `Expr::ty`.
    Constructor(Vec<Expr>),
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Array(Vec<Expr>),
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    /// Result of a statement macro; has type `void`.
    Nothing,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    Function(FunctionId),
    Builtin(Builtin),
    /// Call through a function-typed value.
    Indirect(Box<Expr>),
}

/// A resolved variable reference.
#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    pub name: Name,
    pub var: VarId,
    /// Lexical body the reference was resolved in.
    pub root: Option<BodyId>,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Expr { kind, ty, span }
    }

    /// Literal with the value's own static type.
    pub fn literal(value: Value, span: Span) -> Self {
        let ty = value.static_type();
        Expr::new(ExprKind::Literal(value), ty, span)
    }

    pub fn nothing(span: Span) -> Self {
        Expr::new(ExprKind::Nothing, Type::void(), span)
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self.kind, ExprKind::Nothing)
    }

    /// The compile-time value of a literal node.
    #[inline]
    pub fn literal_value(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Check if the expression designates storage.
    pub fn is_lvalue(&self) -> bool {
        match &self.kind {
            ExprKind::Var(_) | ExprKind::Index { .. } | ExprKind::Member { .. } => true,
            ExprKind::Unary { op, .. } => *op == UnaryOp::Deref,
            _ => false,
        }
    }
}

/// A statement with its location and owning lexical body.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub home: Option<BodyId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Assign {
        target: Expr,
        value: Expr,
    },
    VarDecl {
        var: VarId,
        name: Name,
        ty: Type,
        init: Option<Expr>,
    },
    Function(FunctionId),
    Typedata(TypedataId),
    Composite(CompId),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    /// A statement list. `body` is `None` for groups that open no scope
    /// (multi-variable declarations, unrolled loops).
    Block {
        body: Option<BodyId>,
        stmts: Vec<Stmt>,
    },
    /// A statement value spliced in by `insert`, shared with the value.
    Inserted(Rc<Stmt>),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, home: Option<BodyId>) -> Self {
        Stmt { kind, span, home }
    }

    /// Scope-less group of statements.
    pub fn group(stmts: Vec<Stmt>, span: Span, home: Option<BodyId>) -> Self {
        Stmt::new(StmtKind::Block { body: None, stmts }, span, home)
    }

    /// Check if this statement is a group whose members belong to the
    /// enclosing list.
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, StmtKind::Block { body: None, .. })
    }
}
