#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::operators::values_equal;
use super::*;
use crate::ast::{BinaryOp, UnaryOp};
use crate::value::Value;

mod binary {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn int_arithmetic() {
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::Int(3), &Value::Int(4)),
            Ok(Value::Int(7))
        );
        assert_eq!(
            fold_binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2)),
            Ok(Value::Int(3))
        );
        assert_eq!(
            fold_binary(BinaryOp::Rem, &Value::Int(-7), &Value::Int(2)),
            Ok(Value::Int(-1))
        );
    }

    #[test]
    fn int_arithmetic_wraps() {
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
            Ok(Value::Int(i64::MIN))
        );
        assert_eq!(
            fold_binary(BinaryOp::Div, &Value::Int(i64::MIN), &Value::Int(-1)),
            Ok(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            fold_binary(BinaryOp::Div, &Value::Int(1), &Value::Int(0)),
            Err(FoldError::DivisionByZero)
        );
        assert_eq!(
            fold_binary(BinaryOp::Rem, &Value::Int(1), &Value::Char(0)),
            Err(FoldError::DivisionByZero)
        );
    }

    #[test]
    fn float_division_by_zero_is_ieee() {
        let result = fold_binary(BinaryOp::Div, &Value::Double(1.0), &Value::Int(0)).unwrap();
        assert_eq!(result, Value::Double(f64::INFINITY));
    }

    #[test]
    fn promotion() {
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::Int(1), &Value::Double(0.5)),
            Ok(Value::Double(1.5))
        );
        assert_eq!(
            fold_binary(BinaryOp::Mul, &Value::Float(2.0), &Value::Int(3)),
            Ok(Value::Float(6.0))
        );
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::Char(b'a'), &Value::Int(1)),
            Ok(Value::Int(98))
        );
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::Char(b'a'), &Value::Char(1)),
            Ok(Value::Char(b'b'))
        );
    }

    #[test]
    fn comparisons_yield_integers() {
        assert_eq!(
            fold_binary(BinaryOp::Lt, &Value::Int(1), &Value::Int(2)),
            Ok(Value::Int(1))
        );
        assert_eq!(
            fold_binary(BinaryOp::GtEq, &Value::Char(1), &Value::Char(2)),
            Ok(Value::Int(0))
        );
        assert_eq!(
            fold_binary(BinaryOp::Eq, &Value::Int(2), &Value::Double(2.0)),
            Ok(Value::Int(1))
        );
    }

    #[test]
    fn logical_evaluates_both_operands() {
        assert_eq!(
            fold_binary(BinaryOp::And, &Value::Int(0), &Value::Int(5)),
            Ok(Value::Int(0))
        );
        assert_eq!(
            fold_binary(BinaryOp::Or, &Value::Int(0), &Value::Double(0.5)),
            Ok(Value::Int(1))
        );
        assert!(fold_binary(BinaryOp::Or, &Value::Int(0), &Value::string("x")).is_err());
    }

    #[test]
    fn array_equality_is_structural() {
        assert_eq!(
            fold_binary(BinaryOp::Eq, &Value::string("abc"), &Value::string("abc")),
            Ok(Value::Int(1))
        );
        assert_eq!(
            fold_binary(BinaryOp::NotEq, &Value::string("abc"), &Value::string("ab")),
            Ok(Value::Int(1))
        );
    }

    #[test]
    fn array_concatenation() {
        assert_eq!(
            fold_binary(BinaryOp::Add, &Value::string("ab"), &Value::string("c")),
            Ok(Value::string("abc"))
        );
    }

    #[test]
    fn integral_only_operators_reject_floats() {
        assert_eq!(
            fold_binary(BinaryOp::Rem, &Value::Double(1.0), &Value::Int(2)),
            Err(FoldError::Unsupported { op: "%" })
        );
    }
}

mod unary {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn negation() {
        assert_eq!(fold_unary(UnaryOp::Neg, &Value::Int(5)), Ok(Value::Int(-5)));
        assert_eq!(
            fold_unary(UnaryOp::Neg, &Value::Double(1.5)),
            Ok(Value::Double(-1.5))
        );
    }

    #[test]
    fn not_and_bit_not() {
        assert_eq!(fold_unary(UnaryOp::Not, &Value::Int(0)), Ok(Value::Int(1)));
        assert_eq!(fold_unary(UnaryOp::Not, &Value::Null), Ok(Value::Int(1)));
        assert_eq!(fold_unary(UnaryOp::BitNot, &Value::Int(0)), Ok(Value::Int(-1)));
    }

    #[test]
    fn pointer_operators_never_fold() {
        assert!(fold_unary(UnaryOp::AddrOf, &Value::Int(1)).is_err());
        assert!(fold_unary(UnaryOp::Deref, &Value::Null).is_err());
    }
}

#[test]
fn values_equal_compares_tokens_by_text() {
    use kiln_ir::{Span, Token, TokenKind};

    let a = Value::Token(Token::new(TokenKind::Word, "x", Span::DUMMY));
    let b = Value::Token(Token::new(
        TokenKind::Word,
        "x",
        Span::new(kiln_ir::FileId(0), 4, 5),
    ));
    assert!(values_equal(&a, &b));
}

#[test]
fn builtin_names_round_trip() {
    for builtin in [
        Builtin::Error,
        Builtin::Defined,
        Builtin::Undefine,
        Builtin::Length,
        Builtin::GetStatements,
        Builtin::Insert,
    ] {
        assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
    }
    assert_eq!(Builtin::from_name("printf"), None);
    assert!(Builtin::Insert.syntax_only());
    assert!(!Builtin::Defined.syntax_only());
}
