//! Expressions.
//!
//! Precedence climbing over [`BinaryOp::precedence`]. Every node is typed
//! as it is built, and nodes whose operands are all literals fold on the
//! spot, so a static expression never reaches the tree as an operator.
//!
//! An expression statement or argument goes through the syntax engine
//! first when rules are visible (`parse_expr`); `parse_unit` is the
//! plain operator grammar the engine uses for captures.

mod call;
mod ops;

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Name, Token, TokenKind};
use kiln_types::{Type, TypeKind};

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp, VarRef};
use crate::eval::Builtin;
use crate::stack::ensure_sufficient_stack;
use crate::symbols::Binding;
use crate::value::Value;
use crate::{PResult, Parser};

impl Parser {
    /// Parse a full expression, trying syntax rules when any are visible.
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| {
            if self.tables.has_visible_rules(self.body) {
                self.parse_macro_expr()
            } else {
                self.parse_unit()
            }
        })
    }

    /// Operator expression without rule matching at its top.
    pub(crate) fn parse_unit(&mut self) -> PResult<Expr> {
        let cond = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_unit()?;
        self.make_conditional(cond, then_expr, else_expr)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_prefix()?;
        while let Some(op) = BinaryOp::from_token(self.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            left = self.make_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| {
            if let Some(op) = UnaryOp::from_token(self.current_kind()) {
                let span = self.advance().span;
                let operand = self.parse_prefix()?;
                return self.make_unary(op, operand, span);
            }
            if self.check(TokenKind::LParen) && self.looks_like_cast() {
                let start = self.advance().span;
                let ty = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                let operand = self.parse_prefix()?;
                return self.make_cast(ty, operand, start);
            }
            self.parse_postfix()
        })
    }

    /// `( type )` followed by the start of an operand.
    fn looks_like_cast(&mut self) -> bool {
        self.look_ahead(|p| {
            p.advance();
            p.scan_type() && p.eat(TokenKind::RParen) && starts_operand(p.current_kind())
        })
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    expr = self.make_call(expr, args)?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = self.make_index(expr, index)?;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let through_pointer = self.advance().kind == TokenKind::Arrow;
                    let member = self.expect_word()?;
                    expr = self.make_member(expr, member, through_pointer)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `( [expr (, expr)*] )`, each argument as an rvalue.
    pub(crate) fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            let arg = self.parse_expr()?;
            args.push(self.rvalue(arg));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.current().clone();
        let span = token.span;
        let value = match token.kind {
            TokenKind::Int => match token.text.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => return Err(self.invalid_literal(&token)),
            },
            TokenKind::Float => match token.text.parse::<f32>() {
                Ok(v) => Value::Float(v),
                Err(_) => return Err(self.invalid_literal(&token)),
            },
            TokenKind::Double => match token.text.parse::<f64>() {
                Ok(v) => Value::Double(v),
                Err(_) => return Err(self.invalid_literal(&token)),
            },
            TokenKind::Char => match token.text.as_bytes() {
                [byte] if byte.is_ascii() => Value::Char(*byte),
                _ => {
                    return Err(self.fail(
                        ErrorKind::InvalidToken,
                        span,
                        format!("character literal `{token}` must hold exactly one ASCII character"),
                    ))
                }
            },
            TokenKind::Str => Value::string(&token.text),
            TokenKind::Null => Value::Null,
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::Quote => return self.parse_quote(),
            TokenKind::Word => return self.parse_name_expr(token),
            kind if kind.is_builtin_type() || kind == TokenKind::Function => {
                // Only the base: `integer * x` is a product here.
                let ty = self.parse_base_type()?;
                let span = span.merge(self.previous_span());
                return Ok(Expr::literal(Value::Type(ty), span));
            }
            _ => {
                if let Some(expr) = self.try_literal_rule()? {
                    return Ok(expr);
                }
                return Err(self.expected("an expression"));
            }
        };
        self.advance();
        Ok(Expr::literal(value, span))
    }

    fn invalid_literal(&mut self, token: &Token) -> kiln_diagnostic::Fatal {
        self.fail(
            ErrorKind::InvalidToken,
            token.span,
            format!("literal `{token}` is out of range"),
        )
    }

    /// `[ expr, ... ]`
    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let mut items = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                let item = self.parse_expr()?;
                items.push(self.rvalue(item));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        let span = start.merge(self.previous_span());

        let Some(first) = items.first() else {
            return Ok(Expr::literal(Value::Array(Vec::new()), span));
        };
        let mut element = first.ty.clone().without_static();
        for item in &items[1..] {
            let item_ty = item.ty.clone().without_static();
            if kiln_types::is_castable(&element, &item_ty) {
                continue;
            }
            match kiln_types::common_type(&element, &item_ty) {
                Some(common) if common.is_numeric() => element = common,
                _ => {
                    let message = format!(
                        "array element of type `{}` does not fit `{element}`",
                        item.ty
                    );
                    return Err(self.fail(ErrorKind::IncorrectType, item.span, message));
                }
            }
        }

        let literals: Option<Vec<Value>> = items
            .iter()
            .map(|item| item.literal_value().and_then(|v| v.convert(&element)))
            .collect();
        let ty = Type::array(element, Some(items.len()));
        match literals {
            Some(values) => Ok(Expr::new(
                ExprKind::Literal(Value::Array(values)),
                ty.with_static(),
                span,
            )),
            None => Ok(Expr::new(ExprKind::Array(items), ty, span)),
        }
    }

    /// `quote { tokens }`: the tokens as a static `token[]`.
    fn parse_quote(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::Quote)?.span;
        let Some(range) = self.cursor.capture_braced() else {
            return Err(self.expected("`{`"));
        };
        let tokens = range.tokens().iter().cloned().map(Value::Token).collect();
        let span = start.merge(self.previous_span());
        Ok(Expr::new(
            ExprKind::Literal(Value::Array(tokens)),
            Type::token_array(),
            span,
        ))
    }

    /// An identifier in expression position.
    fn parse_name_expr(&mut self, token: Token) -> PResult<Expr> {
        let span = token.span;
        let name = Name::new(&token.text, span);
        let call_follows = self.peek_kind(1) == TokenKind::LParen;

        if let Some(builtin) = Builtin::from_name(&token.text) {
            if call_follows && self.tables.find_function(&name, self.body).is_none() {
                self.advance();
                return self.parse_builtin_call(builtin, span);
            }
        }
        if let Some(var) = self.tables.find_variable(&name, self.body) {
            self.advance();
            let variable = self.tables.variables.get(var);
            // A captured runtime expression stands for itself.
            if let Binding::Expr(expr) = &variable.binding {
                return Ok(Expr {
                    span,
                    ..(**expr).clone()
                });
            }
            let ty = variable.ty.clone();
            let var_ref = VarRef {
                name,
                var,
                root: self.body,
            };
            return Ok(Expr::new(ExprKind::Var(var_ref), ty, span));
        }
        if let Some(function) = self.tables.find_function(&name, self.body) {
            self.advance();
            let ty = self.tables.functions.get(function).ty();
            return Ok(Expr::new(ExprKind::Function(function), ty, span));
        }
        if let Some(ty) = self.lookup_type_name(&name) {
            self.advance();
            if call_follows && matches!(ty.kind, TypeKind::Typedata(_)) {
                return self.parse_constructor(&name, ty, span);
            }
            return Ok(Expr::literal(Value::Type(ty), span));
        }
        if let Some(expr) = self.try_literal_rule()? {
            return Ok(expr);
        }
        let (kind, what) = if call_follows {
            (ErrorKind::UnknownFunction, "function")
        } else {
            (ErrorKind::UnknownVariable, "variable")
        };
        Err(self.fail(kind, span, format!("unknown {what} `{name}`")))
    }

    /// Replace a reference to a variable with a known value by that value.
    ///
    /// Inside a static function body being prepared, only capture
    /// bindings fold: other statics are read when the function runs.
    pub(crate) fn rvalue(&self, expr: Expr) -> Expr {
        let ExprKind::Var(var_ref) = &expr.kind else {
            return expr;
        };
        let variable = self.tables.variables.get(var_ref.var);
        match &variable.binding {
            Binding::Known(value) => {
                if self.context.defers_effects() && !variable.macro_bound {
                    return expr;
                }
                let unsized_array =
                    matches!(&variable.ty.kind, TypeKind::Array(array) if array.length.is_none());
                let ty = if unsized_array || variable.ty.is_any() {
                    value.static_type()
                } else {
                    variable.ty.clone().with_static()
                };
                Expr::new(ExprKind::Literal(value.clone()), ty, expr.span)
            }
            Binding::Expr(inner) => Expr {
                span: expr.span,
                ..(**inner).clone()
            },
            Binding::Unknown => expr,
        }
    }
}

/// Tokens that can begin an operand after a cast.
fn starts_operand(kind: TokenKind) -> bool {
    kind.is_literal()
        || kind.is_builtin_type()
        || matches!(
            kind,
            TokenKind::Word
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Null
                | TokenKind::Quote
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::Amp
                | TokenKind::Star
        )
}
