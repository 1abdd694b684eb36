//! Payloads of the symbol tables.

use std::rc::Rc;

use kiln_ir::{Name, Span};
use kiln_types::{CompositeType, FunctionSig, Type, TypeFlags, TypeKind};

use crate::ast::{Expr, Stmt};
use crate::cursor::DeferredRange;
use crate::syntax::SyntaxNode;
use crate::value::Value;

use super::VarId;

/// What is known about a variable's value.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// Runtime variable, or a static one without a value yet.
    Unknown,
    /// Compile-time value.
    Known(Value),
    /// Macro capture of a runtime expression; every reference expands to
    /// a copy of it.
    Expr(Box<Expr>),
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: Name,
    pub ty: Type,
    pub binding: Binding,
    /// Bound by a syntax rule capture.
    pub macro_bound: bool,
}

impl Variable {
    pub fn new(name: Name, ty: Type) -> Self {
        Variable {
            name,
            ty,
            binding: Binding::Unknown,
            macro_bound: false,
        }
    }

    pub fn known_value(&self) -> Option<&Value> {
        match &self.binding {
            Binding::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// Parse state of a function body.
#[derive(Clone, Debug)]
pub enum FunctionBody {
    /// Declared without a body.
    Prototype,
    /// Static body captured, parsed on first call.
    Deferred,
    /// Static body currently being parsed.
    Parsing,
    Parsed(Rc<[Stmt]>),
}

#[derive(Clone, Debug)]
pub struct Function {
    pub name: Name,
    pub sig: FunctionSig,
    /// Static-only: evaluated by the compiler, never emitted.
    pub is_static: bool,
    /// Source tokens of the body, kept for lazy parsing and
    /// `get_statements`.
    pub body_tokens: Option<DeferredRange>,
    pub body: FunctionBody,
    /// Parameter variables of the parsed body.
    pub params: Vec<VarId>,
    pub span: Span,
}

impl Function {
    /// The function's type as a value.
    pub fn ty(&self) -> Type {
        let ty = Type::new(TypeKind::Function(self.sig.clone()));
        if self.is_static {
            ty.with_flags(TypeFlags::STATIC)
        } else {
            ty
        }
    }

    pub fn has_body(&self) -> bool {
        !matches!(self.body, FunctionBody::Prototype)
    }
}

#[derive(Clone, Debug)]
pub struct Member {
    pub name: Name,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct Typedata {
    pub name: Name,
    pub members: Vec<Member>,
}

impl Typedata {
    pub fn member_index(&self, name: &Name) -> Option<usize> {
        self.members
            .iter()
            .position(|member| member.name.same_as(name))
    }

    /// The nominal type naming this typedata.
    pub fn ty(&self) -> Type {
        Type::typedata(self.name.spelling())
    }
}

#[derive(Clone, Debug)]
pub struct Composite {
    pub name: Name,
    pub ty: CompositeType,
}

/// A registered syntax rule.
#[derive(Clone, Debug)]
pub struct SyntaxRule {
    pub nodes: Rc<[SyntaxNode]>,
    pub body: DeferredRange,
    pub span: Span,
}
