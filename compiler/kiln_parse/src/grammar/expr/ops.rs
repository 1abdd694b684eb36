//! Operator nodes: typing and folding.

use kiln_diagnostic::{ErrorKind, Fatal};
use kiln_ir::{Name, Span};
use kiln_types::{Type, TypeFlags, TypeKind};

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::eval::{fold_binary, fold_unary, FoldError};
use crate::value::Value;
use crate::{PResult, Parser};

/// Compile-time flags an operation on `a` and `b` carries.
fn compile_time_flags(a: &Type, b: &Type) -> TypeFlags {
    if a.is_static() && b.is_static() {
        TypeFlags::STATIC
    } else if a.flags.is_compile_time() && b.flags.is_compile_time() {
        TypeFlags::PROTOTYPE_STATIC
    } else {
        TypeFlags::empty()
    }
}

/// Compile-time flags of a single operand.
fn own_compile_time_flags(ty: &Type) -> TypeFlags {
    ty.flags & (TypeFlags::STATIC | TypeFlags::PROTOTYPE_STATIC)
}

fn truth_testable(ty: &Type) -> bool {
    ty.is_numeric() || ty.is_pointer() || ty.is_any()
}

impl Parser {
    pub(crate) fn fold_failed(&mut self, err: FoldError, span: Span) -> Fatal {
        let kind = match err {
            FoldError::DivisionByZero => ErrorKind::DivisionByZero,
            FoldError::Unsupported { .. } => ErrorKind::IncorrectType,
        };
        self.fail(kind, span, err.to_string())
    }

    pub(crate) fn make_binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> PResult<Expr> {
        let left = self.rvalue(left);
        let right = self.rvalue(right);
        let span = left.span.merge(right.span);
        let both_arrays = matches!(
            (&left.ty.kind, &right.ty.kind),
            (TypeKind::Array(_), TypeKind::Array(_))
        );

        let ty = if op == BinaryOp::Add && both_arrays {
            if left.literal_value().is_none() || right.literal_value().is_none() {
                return Err(self.fail(
                    ErrorKind::MustBeStatic,
                    span,
                    "arrays can only be concatenated at compile time",
                ));
            }
            // Typed from the folded value below.
            Type::any()
        } else if op.is_logical() {
            if !truth_testable(&left.ty) || !truth_testable(&right.ty) {
                return Err(self.operand_mismatch(op, &left, &right, span));
            }
            Type::integer().with_flags(compile_time_flags(&left.ty, &right.ty))
        } else if op.is_equality()
            && left.literal_value().is_some()
            && right.literal_value().is_some()
        {
            Type::integer().with_static()
        } else {
            let Some(common) = kiln_types::common_type(&left.ty, &right.ty) else {
                return Err(self.operand_mismatch(op, &left, &right, span));
            };
            let arithmetic_ok = common.is_numeric() || common.is_any() || common.is_pointer();
            if (op.is_integral_only() && !(common.is_integral() || common.is_any()))
                || (!op.is_equality() && !arithmetic_ok)
            {
                return Err(self.operand_mismatch(op, &left, &right, span));
            }
            if op.is_equality() || op.is_relational() {
                Type::integer().with_flags(common.flags)
            } else {
                common
            }
        };

        if let (Some(a), Some(b)) = (left.literal_value(), right.literal_value()) {
            let value = match fold_binary(op, a, b) {
                Ok(value) => value,
                Err(err) => return Err(self.fold_failed(err, span)),
            };
            if matches!(value, Value::Array(_)) {
                return Ok(Expr::literal(value, span));
            }
            let value = value.convert(&ty).unwrap_or(value);
            return Ok(Expr::new(ExprKind::Literal(value), ty, span));
        }
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            span,
        ))
    }

    fn operand_mismatch(&mut self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> Fatal {
        let message = format!(
            "operator `{op}` cannot be applied to `{}` and `{}`",
            left.ty, right.ty
        );
        self.fail(ErrorKind::IncorrectType, span, message)
    }

    pub(crate) fn make_unary(&mut self, op: UnaryOp, operand: Expr, start: Span) -> PResult<Expr> {
        let span = start.merge(operand.span);
        match op {
            UnaryOp::AddrOf => {
                if !operand.is_lvalue() || operand.ty.flags.is_compile_time() {
                    return Err(self.fail(
                        ErrorKind::MustBeVariable,
                        operand.span,
                        "can only take the address of a runtime variable",
                    ));
                }
                let ty = Type::pointer(operand.ty.clone().without_static());
                return Ok(unary_node(op, operand, ty, span));
            }
            UnaryOp::Deref => {
                let operand = self.rvalue(operand);
                let target = match &operand.ty.kind {
                    TypeKind::Pointer(pointer) if !pointer.is_null => (*pointer.target).clone(),
                    TypeKind::Any => Type::any(),
                    _ => {
                        let message = format!("cannot dereference `{}`", operand.ty);
                        return Err(self.fail(ErrorKind::IncorrectType, operand.span, message));
                    }
                };
                if operand.literal_value().is_some() {
                    return Err(self.fail(
                        ErrorKind::MustBeVariable,
                        operand.span,
                        "cannot dereference a compile-time value",
                    ));
                }
                return Ok(unary_node(op, operand, target, span));
            }
            UnaryOp::Neg | UnaryOp::Not | UnaryOp::BitNot => {}
        }

        let operand = self.rvalue(operand);
        let accepted = match op {
            UnaryOp::Neg => operand.ty.is_numeric() || operand.ty.is_any(),
            UnaryOp::BitNot => operand.ty.is_integral() || operand.ty.is_any(),
            _ => truth_testable(&operand.ty),
        };
        if !accepted {
            let message = format!("operator `{op}` cannot be applied to `{}`", operand.ty);
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        }
        let ty = if op == UnaryOp::Not {
            Type::integer().with_flags(own_compile_time_flags(&operand.ty))
        } else {
            operand.ty.clone()
        };
        if let Some(value) = operand.literal_value() {
            return match fold_unary(op, value) {
                Ok(value) => Ok(Expr::new(ExprKind::Literal(value), ty, span)),
                Err(err) => Err(self.fold_failed(err, span)),
            };
        }
        Ok(unary_node(op, operand, ty, span))
    }

    pub(crate) fn make_cast(&mut self, ty: Type, operand: Expr, start: Span) -> PResult<Expr> {
        let operand = self.rvalue(operand);
        let span = start.merge(operand.span);
        if !kiln_types::is_convertible(&ty, &operand.ty) {
            let message = format!("cannot cast `{}` to `{ty}`", operand.ty);
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        }
        if let Some(value) = operand.literal_value() {
            return match value.convert(&ty) {
                Some(converted) => Ok(Expr::new(
                    ExprKind::Literal(converted),
                    ty.with_static(),
                    span,
                )),
                None => {
                    let message = format!("`{value}` has no `{ty}` representation");
                    Err(self.fail(ErrorKind::IncorrectType, span, message))
                }
            };
        }
        let ty = ty.with_flags(own_compile_time_flags(&operand.ty));
        Ok(Expr::new(ExprKind::Cast(Box::new(operand)), ty, span))
    }

    pub(crate) fn make_conditional(
        &mut self,
        cond: Expr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> PResult<Expr> {
        let cond = self.rvalue(cond);
        let then_expr = self.rvalue(then_expr);
        let else_expr = self.rvalue(else_expr);
        let span = cond.span.merge(else_expr.span);
        if !truth_testable(&cond.ty) {
            let message = format!("condition must be numeric or a pointer, found `{}`", cond.ty);
            return Err(self.fail(ErrorKind::IncorrectType, cond.span, message));
        }
        if let Some(truth) = cond.literal_value().and_then(Value::truthy) {
            return Ok(if truth { then_expr } else { else_expr });
        }

        let ty = if let Some(common) = kiln_types::common_type(&then_expr.ty, &else_expr.ty) {
            common
        } else if kiln_types::is_castable(&then_expr.ty, &else_expr.ty) {
            then_expr.ty.clone()
        } else if kiln_types::is_castable(&else_expr.ty, &then_expr.ty) {
            else_expr.ty.clone()
        } else {
            let message = format!(
                "branches have incompatible types `{}` and `{}`",
                then_expr.ty, else_expr.ty
            );
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        };
        let flags = compile_time_flags(&cond.ty, &then_expr.ty)
            & compile_time_flags(&cond.ty, &else_expr.ty);
        let ty = ty.without_static().with_flags(flags);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            ty,
            span,
        ))
    }

    pub(crate) fn make_index(&mut self, base: Expr, index: Expr) -> PResult<Expr> {
        let base = self.rvalue(base);
        let index = self.rvalue(index);
        let span = base.span.merge(index.span);
        let element = match &base.ty.kind {
            TypeKind::Array(array) => (*array.element).clone(),
            TypeKind::Pointer(pointer) if !pointer.is_null => (*pointer.target).clone(),
            TypeKind::Any => Type::any(),
            _ => {
                let message = format!("cannot index `{}`", base.ty);
                return Err(self.fail(ErrorKind::IncorrectType, base.span, message));
            }
        };
        if !(index.ty.is_integral() || index.ty.is_any()) {
            let message = format!("array index must be an integer, found `{}`", index.ty);
            return Err(self.fail(ErrorKind::IncorrectType, index.span, message));
        }

        if let (Some(Value::Array(items)), Some(position)) = (
            base.literal_value(),
            index.literal_value().and_then(Value::as_int),
        ) {
            let Some(item) = usize::try_from(position).ok().and_then(|i| items.get(i)) else {
                let message = format!(
                    "index {position} is out of bounds for an array of length {}",
                    items.len()
                );
                return Err(self.fail(ErrorKind::IncorrectType, span, message));
            };
            let ty = if element.is_any() {
                item.static_type()
            } else {
                element.with_static()
            };
            return Ok(Expr::new(ExprKind::Literal(item.clone()), ty, span));
        }

        let ty = element.with_flags(compile_time_flags(&base.ty, &index.ty));
        Ok(Expr::new(
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            ty,
            span,
        ))
    }

    pub(crate) fn make_member(
        &mut self,
        base: Expr,
        member: Name,
        through_pointer: bool,
    ) -> PResult<Expr> {
        let base = self.rvalue(base);
        let span = base.span.merge(member.span);
        let record_ty = match (&base.ty.kind, through_pointer) {
            (TypeKind::Typedata(name), false) => Some(name.clone()),
            (TypeKind::Pointer(pointer), true) => match &pointer.target.kind {
                TypeKind::Typedata(name) => Some(name.clone()),
                _ => None,
            },
            _ => None,
        };
        let Some(typedata_name) = record_ty else {
            let access = if through_pointer { "->" } else { "." };
            let message = format!("`{access}{member}` cannot be applied to `{}`", base.ty);
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        };

        let found = self
            .tables
            .typedata_spelled(&typedata_name, self.body)
            .and_then(|id| {
                let typedata = self.tables.typedata.get(id);
                let index = typedata.member_index(&member)?;
                Some((index, typedata.members[index].ty.clone()))
            });
        let Some((index, member_ty)) = found else {
            return Err(self.fail(
                ErrorKind::UnknownMember,
                member.span,
                format!("`{typedata_name}` has no member `{member}`"),
            ));
        };

        if let (Some(Value::Record { fields, .. }), false) = (base.literal_value(), through_pointer) {
            if let Some(field) = fields.get(index) {
                return Ok(Expr::new(
                    ExprKind::Literal(field.clone()),
                    member_ty.with_static(),
                    span,
                ));
            }
        }

        let ty = member_ty.with_flags(own_compile_time_flags(&base.ty));
        Ok(Expr::new(
            ExprKind::Member {
                base: Box::new(base),
                member,
                index,
                through_pointer,
            },
            ty,
            span,
        ))
    }
}

fn unary_node(op: UnaryOp, operand: Expr, ty: Type, span: Span) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
        span,
    )
}
