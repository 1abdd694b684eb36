#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_numeric_promotion() {
    let cases = [
        (Type::integer(), Type::double(), TypeKind::Double),
        (Type::float(), Type::integer(), TypeKind::Float),
        (Type::character(), Type::integer(), TypeKind::Integer),
        (Type::float(), Type::double(), TypeKind::Double),
    ];
    for (a, b, want) in cases {
        assert_eq!(common_type(&a, &b).unwrap().kind, want);
        assert_eq!(common_type(&b, &a).unwrap().kind, want);
    }
}

#[test]
fn test_pointer_arithmetic_keeps_pointer() {
    let ptr = Type::pointer(Type::character());
    let result = common_type(&ptr, &Type::integer()).unwrap();
    assert_eq!(result.kind, ptr.kind);
    let result = common_type(&Type::integer(), &ptr).unwrap();
    assert_eq!(result.kind, ptr.kind);
}

#[test]
fn test_static_only_when_both_static() {
    let s = Type::integer().with_static();
    assert!(common_type(&s, &s).unwrap().is_static());
    assert!(!common_type(&s, &Type::integer()).unwrap().is_static());
}

#[test]
fn test_prototype_propagates() {
    let proto = Type::integer().with_static().as_prototype();
    let s = Type::integer().with_static();
    let result = common_type(&proto, &s).unwrap();
    assert!(!result.is_static());
    assert!(result.is_prototype_static());
}

#[test]
fn test_any_absorbs() {
    assert!(common_type(&Type::any(), &Type::word()).unwrap().is_any());
}

#[test]
fn test_incompatible() {
    assert_eq!(common_type(&Type::word(), &Type::integer()), None);
    let words = common_type(&Type::word(), &Type::word()).unwrap();
    assert_eq!(words.kind, TypeKind::Word);
}
