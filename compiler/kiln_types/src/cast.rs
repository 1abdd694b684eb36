//! Equality and castability.
//!
//! Castability is asymmetric: `is_castable(expected, target)` asks
//! whether a value of type `target` may be used where `expected` is
//! required without an explicit cast. Both relations recurse
//! structurally and stop at `any`.

use crate::{CompositeType, FunctionSig, PointerType, Type, TypeFlags, TypeKind};

/// Structural equality.
///
/// `STATIC` and `CONST` take part; `PROTOTYPE_STATIC` does not. `any` on
/// either side matches any kind.
pub fn equals(a: &Type, b: &Type) -> bool {
    if a.flags & TypeFlags::IDENTITY_MASK != b.flags & TypeFlags::IDENTITY_MASK {
        return false;
    }
    kinds_equal(&a.kind, &b.kind)
}

/// Structural equality of kinds, ignoring the outer qualifiers.
pub(crate) fn kinds_equal(a: &TypeKind, b: &TypeKind) -> bool {
    match (a, b) {
        (TypeKind::Any, _) | (_, TypeKind::Any) => true,
        (TypeKind::Pointer(x), TypeKind::Pointer(y)) => {
            x.is_const == y.is_const && equals(&x.target, &y.target)
        }
        (TypeKind::Array(x), TypeKind::Array(y)) => {
            x.length == y.length && equals(&x.element, &y.element)
        }
        (TypeKind::ObjectType(x), TypeKind::ObjectType(y)) => equals(x, y),
        (TypeKind::Function(x), TypeKind::Function(y)) => {
            x.variadic == y.variadic
                && x.params.len() == y.params.len()
                && equals(&x.ret, &y.ret)
                && x.params.iter().zip(&y.params).all(|(p, q)| equals(&p.ty, &q.ty))
        }
        (TypeKind::Typedata(x), TypeKind::Typedata(y)) => x == y,
        (TypeKind::Composite(x), TypeKind::Composite(y)) => x.name == y.name,
        _ => std::mem::discriminant(a) == std::mem::discriminant(b),
    }
}

/// Implicit conversion check.
pub fn is_castable(expected: &Type, target: &Type) -> bool {
    staticness_compatible(expected, target) && kind_castable(expected, target)
}

/// A static demand needs a compile-time value; a static value only
/// reaches runtime code when it can be emitted as a constant.
fn staticness_compatible(expected: &Type, target: &Type) -> bool {
    if expected.is_static() && !target.flags.is_compile_time() {
        return false;
    }
    if target.is_static() && !expected.flags.is_compile_time() && !target.folds_to_runtime() {
        return false;
    }
    true
}

/// Castability of kinds, qualifiers of the outer types ignored.
pub(crate) fn kind_castable(expected: &Type, target: &Type) -> bool {
    match (&expected.kind, &target.kind) {
        (TypeKind::Any, _) | (_, TypeKind::Any) => true,
        (TypeKind::Composite(comp), _) => composite_accepts(comp, target),
        (_, TypeKind::Composite(comp)) => comp
            .members
            .iter()
            .any(|member| member.up && kind_castable(expected, &member.ty)),
        (TypeKind::Word, TypeKind::Word) | (TypeKind::Void, TypeKind::Void) => true,
        (TypeKind::Pointer(e), TypeKind::Pointer(t)) => pointer_castable(e, t),
        (TypeKind::Pointer(e), TypeKind::Array(t)) => {
            !e.is_null && (e.is_any || equals(&e.target, &t.element))
        }
        (TypeKind::Array(e), TypeKind::Array(t)) => {
            (e.length.is_none() || e.length == t.length)
                && (e.element.is_any() || equals(&e.element, &t.element))
        }
        (TypeKind::ObjectType(e), TypeKind::ObjectType(t)) => e.is_any() || equals(e, t),
        (TypeKind::Function(e), TypeKind::Function(t)) => {
            function_castable(expected.is_static(), e, t)
        }
        (TypeKind::Typedata(e), TypeKind::Typedata(t)) => e == t,
        _ => match (expected.numeric_rank(), target.numeric_rank()) {
            (Some(e), Some(t)) => t <= e,
            _ => false,
        },
    }
}

fn pointer_castable(expected: &PointerType, target: &PointerType) -> bool {
    if expected.is_null {
        return target.is_null;
    }
    if target.is_null {
        return true;
    }
    if target.is_const && !expected.is_const {
        return false;
    }
    expected.is_any || equals(&expected.target, &target.target)
}

fn composite_accepts(comp: &CompositeType, target: &Type) -> bool {
    if let TypeKind::Composite(other) = &target.kind {
        if other.name == comp.name {
            return true;
        }
    }
    if comp.optional {
        comp.members
            .iter()
            .any(|member| kind_castable(&member.ty, target))
    } else {
        !comp.members.is_empty()
            && comp
                .members
                .iter()
                .all(|member| kind_castable(&member.ty, target))
    }
}

/// Arity and return castability always; for static signatures also
/// parameter names and exact parameter types.
fn function_castable(is_static: bool, expected: &FunctionSig, target: &FunctionSig) -> bool {
    if expected.params.len() != target.params.len() || expected.variadic != target.variadic {
        return false;
    }
    if !is_castable(&expected.ret, &target.ret) {
        return false;
    }
    if !is_static {
        return true;
    }
    expected
        .params
        .iter()
        .zip(&target.params)
        .all(|(e, t)| e.name == t.name && equals(&e.ty, &t.ty))
}

/// Explicit cast check: everything implicit plus numeric narrowing,
/// pointer reinterpretation, integer/pointer conversion and
/// type-to-word naming.
pub fn is_convertible(to: &Type, from: &Type) -> bool {
    if kind_castable(to, from) {
        return true;
    }
    match (&to.kind, &from.kind) {
        (TypeKind::Pointer(_), TypeKind::Pointer(_) | TypeKind::Array(_))
        | (TypeKind::Word, TypeKind::ObjectType(_)) => true,
        (TypeKind::Pointer(_), _) => from.is_integral(),
        (_, TypeKind::Pointer(_)) => to.is_integral(),
        _ => to.is_numeric() && from.is_numeric(),
    }
}

#[cfg(test)]
mod tests;
