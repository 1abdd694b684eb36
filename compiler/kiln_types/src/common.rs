use crate::cast::kinds_equal;
use crate::{Type, TypeFlags, TypeKind};

/// Operand type for mixed arithmetic and comparison.
///
/// Numbers promote along `character < integer < float < double`. A
/// pointer mixed with an integral value keeps the pointer type. `any`
/// absorbs everything. The result is static only when both operands
/// are; `None` means the operands have no common type.
pub fn common_type(a: &Type, b: &Type) -> Option<Type> {
    let kind = match (&a.kind, &b.kind) {
        (TypeKind::Any, _) | (_, TypeKind::Any) => TypeKind::Any,
        (TypeKind::Pointer(_), _) if b.is_integral() => a.kind.clone(),
        (_, TypeKind::Pointer(_)) if a.is_integral() => b.kind.clone(),
        _ => match (a.numeric_rank(), b.numeric_rank()) {
            (Some(x), Some(y)) => {
                if x >= y {
                    a.kind.clone()
                } else {
                    b.kind.clone()
                }
            }
            _ if kinds_equal(&a.kind, &b.kind) => a.kind.clone(),
            _ => return None,
        },
    };

    let mut flags = TypeFlags::empty();
    if a.is_static() && b.is_static() {
        flags |= TypeFlags::STATIC;
    } else if a.flags.is_compile_time() && b.flags.is_compile_time() {
        flags |= TypeFlags::PROTOTYPE_STATIC;
    }
    Some(Type { kind, flags })
}

#[cfg(test)]
mod tests;
