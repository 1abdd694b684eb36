//! Operator folding on compile-time values.
//!
//! Dispatch is a direct match on the value pair. Numeric operands are
//! promoted along `character < integer < float < double` before the
//! operation, mirroring `common_type` on their types. Integer arithmetic
//! wraps; integer division and remainder by zero are errors, float
//! division follows IEEE.

use crate::ast::{BinaryOp, UnaryOp};
use crate::value::Value;

#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum FoldError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("operator `{op}` cannot be applied to these operands")]
    Unsupported { op: &'static str },
}

/// Promoted operand pair.
enum Operands {
    Char(u8, u8),
    Int(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

fn promote(left: &Value, right: &Value) -> Option<Operands> {
    let operands = match (left, right) {
        (Value::Char(a), Value::Char(b)) => Operands::Char(*a, *b),
        (Value::Double(_), _) | (_, Value::Double(_)) => {
            Operands::Double(left.as_f64()?, right.as_f64()?)
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Operands::Float(left.as_f64()? as f32, right.as_f64()? as f32)
        }
        _ => Operands::Int(left.as_int()?, right.as_int()?),
    };
    Some(operands)
}

#[inline]
fn bool_value(b: bool) -> Value {
    Value::Int(i64::from(b))
}

/// Evaluate `left op right`.
///
/// Logical operators evaluate truthiness of both operands; there is no
/// short circuit at this level since both values already exist.
pub fn fold_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, FoldError> {
    let unsupported = FoldError::Unsupported { op: op.symbol() };
    if op.is_logical() {
        let (Some(a), Some(b)) = (left.truthy(), right.truthy()) else {
            return Err(unsupported);
        };
        return Ok(bool_value(match op {
            BinaryOp::And => a && b,
            _ => a || b,
        }));
    }
    if op.is_equality() {
        let equal = values_equal(left, right);
        return Ok(bool_value((op == BinaryOp::Eq) == equal));
    }
    if let (BinaryOp::Add, Value::Array(a), Value::Array(b)) = (op, left, right) {
        return Ok(Value::Array(a.iter().chain(b).cloned().collect()));
    }
    match promote(left, right).ok_or(unsupported)? {
        Operands::Int(a, b) => fold_int(op, a, b),
        Operands::Char(a, b) => fold_int(op, i64::from(a), i64::from(b)).map(|v| match v {
            Value::Int(n) if !op.is_relational() => Value::Char(n as u8),
            other => other,
        }),
        Operands::Float(a, b) => fold_float(op, f64::from(a), f64::from(b)).map(|v| match v {
            Value::Double(d) => Value::Float(d as f32),
            other => other,
        }),
        Operands::Double(a, b) => fold_float(op, a, b),
    }
}

fn fold_int(op: BinaryOp, a: i64, b: i64) -> Result<Value, FoldError> {
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(FoldError::DivisionByZero),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Rem if b == 0 => return Err(FoldError::DivisionByZero),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::Shl => a.wrapping_shl(b as u32),
        BinaryOp::Shr => a.wrapping_shr(b as u32),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Lt => return Ok(bool_value(a < b)),
        BinaryOp::LtEq => return Ok(bool_value(a <= b)),
        BinaryOp::Gt => return Ok(bool_value(a > b)),
        BinaryOp::GtEq => return Ok(bool_value(a >= b)),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Eq | BinaryOp::NotEq => {
            return Err(FoldError::Unsupported { op: op.symbol() })
        }
    };
    Ok(Value::Int(value))
}

fn fold_float(op: BinaryOp, a: f64, b: f64) -> Result<Value, FoldError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Lt => return Ok(bool_value(a < b)),
        BinaryOp::LtEq => return Ok(bool_value(a <= b)),
        BinaryOp::Gt => return Ok(bool_value(a > b)),
        BinaryOp::GtEq => return Ok(bool_value(a >= b)),
        _ => return Err(FoldError::Unsupported { op: op.symbol() }),
    };
    Ok(Value::Double(value))
}

/// Structural equality of compile-time values. Numbers compare after
/// promotion, arrays element by element.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Token(a), Value::Token(b)) => a.same_as(b),
        (Value::Type(a), Value::Type(b)) => kiln_types::equals(a, b),
        (Value::Record { typedata: ta, fields: fa }, Value::Record { typedata: tb, fields: fb }) => {
            ta == tb && fa.len() == fb.len() && fa.iter().zip(fb).all(|(x, y)| values_equal(x, y))
        }
        _ => match promote(left, right) {
            Some(Operands::Char(a, b)) => a == b,
            Some(Operands::Int(a, b)) => a == b,
            Some(Operands::Float(a, b)) => a == b,
            Some(Operands::Double(a, b)) => a == b,
            None => left == right,
        },
    }
}

/// Evaluate `op value`. Address-of and dereference never fold.
pub fn fold_unary(op: UnaryOp, value: &Value) -> Result<Value, FoldError> {
    let unsupported = FoldError::Unsupported { op: op.symbol() };
    let folded = match (op, value) {
        (UnaryOp::Neg, Value::Int(n)) => Value::Int(n.wrapping_neg()),
        (UnaryOp::Neg, Value::Char(c)) => Value::Char(c.wrapping_neg()),
        (UnaryOp::Neg, Value::Float(f)) => Value::Float(-f),
        (UnaryOp::Neg, Value::Double(d)) => Value::Double(-d),
        (UnaryOp::BitNot, Value::Int(n)) => Value::Int(!n),
        (UnaryOp::BitNot, Value::Char(c)) => Value::Char(!c),
        (UnaryOp::Not, _) => bool_value(!value.truthy().ok_or(unsupported)?),
        _ => return Err(unsupported),
    };
    Ok(folded)
}
