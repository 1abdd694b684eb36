//! Calls, constructors and built-ins.

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Name, Span, TokenKind};
use kiln_types::{FunctionSig, Type, TypeFlags, TypeKind};
use tracing::debug;

use crate::ast::{Callee, Expr, ExprKind};
use crate::eval::Builtin;
use crate::value::Value;
use crate::{PResult, Parser};

impl Parser {
    pub(crate) fn make_call(&mut self, callee: Expr, args: Vec<Expr>) -> PResult<Expr> {
        let span = callee.span.merge(self.previous_span());
        let (target, sig, static_fn) = match &callee.kind {
            ExprKind::Function(id) | ExprKind::Literal(Value::Function(id)) => {
                let function = self.tables.functions.get(*id);
                (
                    Callee::Function(*id),
                    function.sig.clone(),
                    function.is_static.then_some(*id),
                )
            }
            _ => match callee.ty.as_function() {
                Some(sig) => {
                    let sig = sig.clone();
                    (Callee::Indirect(Box::new(callee)), sig, None)
                }
                None => {
                    let message = format!("`{}` is not callable", callee.ty);
                    return Err(self.fail(ErrorKind::IncorrectType, callee.span, message));
                }
            },
        };
        self.check_arguments(&sig, &args, span)?;
        let ret = (*sig.ret).clone();

        let Some(id) = static_fn else {
            return Ok(Expr::new(ExprKind::Call { callee: target, args }, ret, span));
        };
        if self.context.defers_effects() {
            return Ok(Expr::new(
                ExprKind::Call { callee: target, args },
                ret.as_prototype(),
                span,
            ));
        }
        let values: Option<Vec<Value>> = args
            .iter()
            .map(|arg| arg.literal_value().cloned())
            .collect();
        let Some(values) = values else {
            let name = self.tables.functions.get(id).name.clone();
            return Err(self.fail(
                ErrorKind::MustBeStatic,
                span,
                format!("arguments of static function `{name}` are not known at compile time"),
            ));
        };
        let value = self.call_static(id, values, span)?;
        if ret.is_void() {
            return Ok(Expr::nothing(span));
        }
        let unsized_array = matches!(&ret.kind, TypeKind::Array(array) if array.length.is_none());
        let ty = if unsized_array || ret.is_any() {
            value.static_type()
        } else {
            ret.with_static()
        };
        Ok(Expr::new(ExprKind::Literal(value), ty, span))
    }

    fn check_arguments(&mut self, sig: &FunctionSig, args: &[Expr], span: Span) -> PResult<()> {
        let arity_ok = if sig.variadic {
            args.len() >= sig.params.len()
        } else {
            args.len() == sig.params.len()
        };
        if !arity_ok {
            let message = format!(
                "expected {}{} argument(s), found {}",
                if sig.variadic { "at least " } else { "" },
                sig.params.len(),
                args.len()
            );
            return Err(self.fail(ErrorKind::WrongArguments, span, message));
        }
        for (position, (param, arg)) in sig.params.iter().zip(args).enumerate() {
            if !kiln_types::is_castable(&param.ty, &arg.ty) {
                let message = format!(
                    "argument {} expects `{}`, found `{}`",
                    position + 1,
                    param.ty,
                    arg.ty
                );
                return Err(self.fail(ErrorKind::IncorrectType, arg.span, message));
            }
        }
        Ok(())
    }

    /// `Name(args)` where `Name` is a typedata.
    pub(crate) fn parse_constructor(&mut self, name: &Name, ty: Type, start: Span) -> PResult<Expr> {
        let args = self.parse_args()?;
        let span = start.merge(self.previous_span());
        let TypeKind::Typedata(spelled) = &ty.kind else {
            let message = format!("`{name}` is not a record type");
            return Err(self.fail(ErrorKind::IncorrectType, span, message));
        };
        let members: Vec<Type> = self
            .tables
            .find_typedata(name, self.body)
            .map(|id| {
                self.tables
                    .typedata
                    .get(id)
                    .members
                    .iter()
                    .map(|member| member.ty.clone())
                    .collect()
            })
            .unwrap_or_default();
        if members.len() != args.len() {
            let message = format!(
                "`{name}` has {} member(s), found {} argument(s)",
                members.len(),
                args.len()
            );
            return Err(self.fail(ErrorKind::WrongArguments, span, message));
        }
        for (member, arg) in members.iter().zip(&args) {
            if !kiln_types::is_castable(member, &arg.ty) {
                let message = format!("member expects `{member}`, found `{}`", arg.ty);
                return Err(self.fail(ErrorKind::IncorrectType, arg.span, message));
            }
        }

        let fields: Option<Vec<Value>> = members
            .iter()
            .zip(&args)
            .map(|(member, arg)| arg.literal_value().and_then(|value| value.convert(member)))
            .collect();
        if let Some(fields) = fields {
            let record = Value::Record {
                typedata: spelled.clone(),
                fields,
            };
            return Ok(Expr::new(ExprKind::Literal(record), ty.with_static(), span));
        }
        Ok(Expr::new(ExprKind::Constructor(args), ty, span))
    }

    // === Built-ins ===

    pub(crate) fn parse_builtin_call(&mut self, builtin: Builtin, start: Span) -> PResult<Expr> {
        if builtin.syntax_only() && !self.context.in_syntax_body() {
            return Err(self.fail(
                ErrorKind::UnknownFunction,
                start,
                format!("`{builtin}` can only be called inside a syntax body"),
            ));
        }
        match builtin {
            Builtin::Defined | Builtin::Undefine => {
                self.expect(TokenKind::LParen)?;
                let name = self.parse_name_arg()?;
                self.expect(TokenKind::RParen)?;
                let span = start.merge(self.previous_span());
                if builtin == Builtin::Defined {
                    let defined = self.tables.is_defined(&name, self.body);
                    return Ok(Expr::literal(Value::Int(i64::from(defined)), span));
                }
                if self.context.defers_effects() {
                    let arg = Expr::literal(Value::Word(name.spelling()), name.span);
                    return Ok(builtin_call(builtin, vec![arg], Type::void(), span));
                }
                let removed = self.tables.undefine(&name, self.body);
                debug!(name = %name, ?removed, "undefine");
                Ok(Expr::nothing(span))
            }
            Builtin::Error => {
                let args = self.parse_args()?;
                let span = start.merge(self.previous_span());
                let arg = self.single_arg(builtin, args, span)?;
                if self.context.defers_effects() {
                    return Ok(builtin_call(builtin, vec![arg], Type::void(), span));
                }
                match arg.literal_value().and_then(Value::as_text) {
                    Some(message) => Err(self.fail(ErrorKind::UserError, span, message)),
                    None => Err(self.fail(
                        ErrorKind::MustBeStatic,
                        arg.span,
                        "`error` needs a compile-time string",
                    )),
                }
            }
            Builtin::Length => {
                let args = self.parse_args()?;
                let span = start.merge(self.previous_span());
                let arg = self.single_arg(builtin, args, span)?;
                if let Some(Value::Array(items)) = arg.literal_value() {
                    let length = i64::try_from(items.len()).unwrap_or(i64::MAX);
                    return Ok(Expr::literal(Value::Int(length), span));
                }
                match &arg.ty.kind {
                    TypeKind::Array(array) => {
                        if let Some(length) = array.length {
                            let length = i64::try_from(length).unwrap_or(i64::MAX);
                            return Ok(Expr::literal(Value::Int(length), span));
                        }
                        if self.context.defers_effects() {
                            let ty = Type::integer().with_flags(TypeFlags::PROTOTYPE_STATIC);
                            return Ok(builtin_call(builtin, vec![arg], ty, span));
                        }
                        Err(self.fail(
                            ErrorKind::MustBeStatic,
                            arg.span,
                            "array length is not known at compile time",
                        ))
                    }
                    _ => {
                        let message = format!("`length` expects an array, found `{}`", arg.ty);
                        Err(self.fail(ErrorKind::IncorrectType, arg.span, message))
                    }
                }
            }
            Builtin::GetStatements => {
                let args = self.parse_args()?;
                let span = start.merge(self.previous_span());
                let arg = self.single_arg(builtin, args, span)?;
                let function = match &arg.kind {
                    ExprKind::Function(id) | ExprKind::Literal(Value::Function(id)) => *id,
                    _ => {
                        let message =
                            format!("`get_statements` expects a function, found `{}`", arg.ty);
                        return Err(self.fail(ErrorKind::IncorrectType, arg.span, message));
                    }
                };
                self.get_statements(function, span)
            }
            Builtin::Insert => {
                let args = self.parse_args()?;
                let span = start.merge(self.previous_span());
                let arg = self.single_arg(builtin, args, span)?;
                self.insert(&arg, span)?;
                Ok(Expr::nothing(span))
            }
        }
    }

    fn single_arg(&mut self, builtin: Builtin, mut args: Vec<Expr>, span: Span) -> PResult<Expr> {
        if args.len() != 1 {
            return Err(self.fail(
                ErrorKind::WrongArguments,
                span,
                format!("`{builtin}` takes one argument, found {}", args.len()),
            ));
        }
        Ok(args.remove(0))
    }

    /// A bare identifier argument. A capture bound to a `word` stands for
    /// the word it holds.
    fn parse_name_arg(&mut self) -> PResult<Name> {
        let name = self.expect_word()?;
        if let Some(var) = self.tables.find_variable(&name, self.body) {
            let variable = self.tables.variables.get(var);
            if variable.macro_bound {
                if let Some(Value::Word(text)) = variable.known_value() {
                    return Ok(Name::new(text, name.span));
                }
            }
        }
        Ok(name)
    }
}

fn builtin_call(builtin: Builtin, args: Vec<Expr>, ty: Type, span: Span) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Callee::Builtin(builtin),
            args,
        },
        ty,
        span,
    )
}
