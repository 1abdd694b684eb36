use super::*;
use crate::{CompMember, Param};

fn const_ptr(target: Type) -> Type {
    let mut ty = Type::pointer(target);
    if let TypeKind::Pointer(p) = &mut ty.kind {
        p.is_const = true;
    }
    ty
}

fn comp(name: &str, members: Vec<(Type, bool)>, optional: bool) -> Type {
    Type::new(TypeKind::Composite(CompositeType {
        name: name.into(),
        members: members
            .into_iter()
            .map(|(ty, up)| CompMember { ty, up })
            .collect(),
        static_only: false,
        optional,
    }))
}

fn func(ret: Type, params: &[(&str, Type)]) -> Type {
    Type::function(
        ret,
        params
            .iter()
            .map(|(name, ty)| Param {
                name: (*name).to_string(),
                ty: ty.clone(),
            })
            .collect(),
        false,
    )
}

#[test]
fn test_pointer_accepts_array_not_reverse() {
    let ptr = Type::pointer(Type::integer());
    let arr = Type::array(Type::integer(), Some(3));
    assert!(is_castable(&ptr, &arr));
    assert!(!is_castable(&arr, &ptr));
}

#[test]
fn test_static_demand() {
    let s = Type::integer().with_static();
    assert!(!is_castable(&s, &Type::integer()));
    assert!(is_castable(&Type::integer(), &s));
    assert!(is_castable(&s, &s));
}

#[test]
fn test_prototype_static_satisfies_demand() {
    let demand = Type::integer().with_static();
    let promised = Type::integer().with_static().as_prototype();
    assert!(is_castable(&demand, &promised));
}

#[test]
fn test_static_reflection_does_not_reach_runtime() {
    let runtime_type = Type::object_type(Type::any());
    let reflected = Type::object_type(Type::integer()).with_static();
    assert!(!is_castable(&runtime_type, &reflected));
    assert!(is_castable(&runtime_type.clone().with_static(), &reflected));
}

#[test]
fn test_static_arrays_fold_unless_tokens() {
    let string = Type::array(Type::character(), Some(6)).with_static();
    assert!(is_castable(&Type::array(Type::character(), None), &string));
    assert!(is_castable(&Type::pointer(Type::character()), &string));

    let tokens = Type::token_array();
    assert!(!is_castable(&Type::array(Type::typedata("token"), None), &tokens));
    assert!(is_castable(&Type::token_array(), &tokens));
    assert!(!is_castable(&Type::statement_array(), &tokens));
}

#[test]
fn test_numeric_widening() {
    assert!(is_castable(&Type::double(), &Type::integer()));
    assert!(!is_castable(&Type::integer(), &Type::double()));
    assert!(is_castable(&Type::integer(), &Type::character()));
    assert!(!is_castable(&Type::character(), &Type::integer()));
    assert!(is_castable(&Type::float(), &Type::integer()));
    assert!(!is_castable(&Type::word(), &Type::integer()));
}

#[test]
fn test_any() {
    assert!(is_castable(&Type::any(), &Type::word()));
    assert!(is_castable(&Type::word(), &Type::any()));
    assert!(!is_castable(&Type::any().with_static(), &Type::word()));
}

#[test]
fn test_null_pointer() {
    let null = Type::null();
    assert!(is_castable(&Type::pointer(Type::integer()), &null));
    assert!(is_castable(&const_ptr(Type::word()), &null));
    assert!(!is_castable(&Type::integer(), &null));
    assert!(!is_castable(&null, &Type::pointer(Type::integer()).with_static()));
}

#[test]
fn test_const_cannot_be_dropped() {
    let plain = Type::pointer(Type::integer());
    let konst = const_ptr(Type::integer());
    assert!(is_castable(&konst, &plain));
    assert!(!is_castable(&plain, &konst));
}

#[test]
fn test_untyped_pointer() {
    let any_ptr = Type::pointer(Type::any());
    assert!(is_castable(&any_ptr, &Type::pointer(Type::double())));
    assert!(is_castable(&any_ptr, &Type::array(Type::word(), None)));
}

#[test]
fn test_optional_composite_accepts_any_member() {
    let number = comp("number", vec![(Type::integer(), false), (Type::word(), false)], true);
    assert!(is_castable(&number, &Type::word()));
    assert!(is_castable(&number, &Type::character()));
    assert!(!is_castable(&number, &Type::double()));
    assert!(is_castable(&number, &number));
}

#[test]
fn test_stacked_composite_needs_all_members() {
    let stacked = comp("real", vec![(Type::integer(), false), (Type::double(), false)], false);
    assert!(is_castable(&stacked, &Type::integer()));
    assert!(!is_castable(&stacked, &Type::double()));
}

#[test]
fn test_up_member_allows_upcast() {
    let point = Type::typedata("point");
    let with_up = comp("shape", vec![(point.clone(), true)], false);
    let without_up = comp("shape2", vec![(point.clone(), false)], false);
    assert!(is_castable(&point, &with_up));
    assert!(!is_castable(&point, &without_up));
}

#[test]
fn test_function_signatures() {
    let a = func(Type::integer(), &[("a", Type::integer())]);
    let b = func(Type::integer(), &[("b", Type::integer())]);
    let wider_ret = func(Type::double(), &[("a", Type::integer())]);
    let two = func(Type::integer(), &[("a", Type::integer()), ("b", Type::word())]);

    assert!(is_castable(&a, &b));
    assert!(is_castable(&wider_ret, &a));
    assert!(!is_castable(&a, &wider_ret));
    assert!(!is_castable(&a, &two));

    let sa = a.clone().with_static();
    let sb = b.clone().with_static();
    assert!(is_castable(&sa, &sa));
    assert!(!is_castable(&sa, &sb));
    assert!(!is_castable(&a, &sa));
}

#[test]
fn test_object_type_any_accepts_all_types() {
    let some_type = Type::object_type(Type::any()).with_static();
    let word_type = Type::object_type(Type::word()).with_static();
    assert!(is_castable(&some_type, &word_type));
    assert!(!is_castable(
        &Type::object_type(Type::integer()).with_static(),
        &word_type
    ));
}

#[test]
fn test_equals() {
    let a = Type::array(Type::integer(), Some(2));
    assert!(equals(&a, &a.clone()));
    assert!(!equals(&a, &Type::array(Type::integer(), None)));
    assert!(!equals(&Type::integer(), &Type::integer().with_static()));
    assert!(equals(
        &Type::integer().with_static(),
        &Type::integer().with_static().with_flags(TypeFlags::PROTOTYPE_STATIC)
    ));
    assert!(equals(&Type::any(), &Type::word()));
    assert!(equals(&Type::typedata("p"), &Type::typedata("p")));
    assert!(!equals(&Type::typedata("p"), &Type::typedata("q")));
}

#[test]
fn test_explicit_conversions() {
    assert!(is_convertible(&Type::integer(), &Type::double()));
    assert!(is_convertible(&Type::word(), &Type::object_type(Type::integer())));
    assert!(is_convertible(&Type::pointer(Type::integer()), &Type::integer()));
    assert!(is_convertible(&Type::integer(), &Type::pointer(Type::word())));
    assert!(is_convertible(
        &Type::pointer(Type::integer()),
        &Type::pointer(Type::word())
    ));
    assert!(!is_convertible(&Type::word(), &Type::integer()));
}

#[test]
fn test_try_clone_is_deep_and_equal() {
    let ty = func(
        Type::pointer(Type::array(Type::character(), Some(4))),
        &[("x", comp("c", vec![(Type::integer(), true)], true))],
    );
    assert_eq!(ty.try_clone(), Ok(ty.clone()));
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_cast {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Type> {
        prop_oneof![
            Just(Type::integer()),
            Just(Type::float()),
            Just(Type::double()),
            Just(Type::character()),
            Just(Type::word()),
            Just(Type::typedata("point")),
        ]
    }

    fn any_type() -> impl Strategy<Value = Type> {
        prop_oneof![leaf(), Just(Type::any()), Just(Type::void())].prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Type::pointer),
                (inner.clone(), proptest::option::of(0usize..8))
                    .prop_map(|(t, n)| Type::array(t, n)),
                inner.prop_map(Type::object_type),
            ]
        })
    }

    proptest! {
        #[test]
        fn pointer_array_castability_is_asymmetric(elem in leaf(), n in 0usize..16) {
            let ptr = Type::pointer(elem.clone());
            prop_assert!(is_castable(&ptr, &Type::array(elem.clone(), Some(n))));
            prop_assert!(!is_castable(&Type::array(elem, None), &ptr));
        }

        #[test]
        fn equality_is_symmetric(a in any_type(), b in any_type()) {
            prop_assert_eq!(equals(&a, &b), equals(&b, &a));
        }

        #[test]
        fn runtime_types_are_self_castable(t in any_type()) {
            prop_assert!(is_castable(&t, &t));
        }

        #[test]
        fn static_values_satisfy_static_demand(t in leaf()) {
            let s = t.with_static();
            prop_assert!(is_castable(&s, &s));
            prop_assert!(!is_castable(&s, &s.clone().without_static()));
        }
    }
}
