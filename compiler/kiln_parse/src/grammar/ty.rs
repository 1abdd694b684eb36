//! Type specifiers.

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Name, TokenKind};
use kiln_types::{Param, Type, TypeKind};

use crate::value::Value;
use crate::{PResult, Parser};

impl Parser {
    /// Parse `('static' | 'const')* base suffix*`.
    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        let mut is_static = false;
        let mut is_const = false;
        loop {
            match self.current_kind() {
                TokenKind::Static => is_static = true,
                TokenKind::Const => is_const = true,
                _ => break,
            }
            self.advance();
        }

        let mut ty = self.parse_base_type()?;
        loop {
            match self.current_kind() {
                TokenKind::Const if self.peek_kind(1) == TokenKind::Star => {
                    self.advance();
                    self.advance();
                    ty = const_pointer(ty);
                }
                TokenKind::Star => {
                    self.advance();
                    ty = Type::pointer(ty);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let length = if self.check(TokenKind::RBracket) {
                        None
                    } else {
                        Some(self.parse_array_length()?)
                    };
                    self.expect(TokenKind::RBracket)?;
                    ty = Type::array(ty, length);
                }
                _ => break,
            }
        }

        if is_static {
            ty = ty.with_static();
        }
        if is_const {
            ty = ty.with_const();
        }
        Ok(ty)
    }

    pub(crate) fn parse_base_type(&mut self) -> PResult<Type> {
        let ty = match self.current_kind() {
            TokenKind::IntegerType => Type::integer(),
            TokenKind::FloatType => Type::float(),
            TokenKind::DoubleType => Type::double(),
            TokenKind::CharacterType => Type::character(),
            TokenKind::WordType => Type::word(),
            TokenKind::VoidType => Type::void(),
            TokenKind::AnyType => Type::any(),
            TokenKind::TypeType => {
                self.advance();
                if !self.eat(TokenKind::Lt) {
                    return Ok(Type::object_type(Type::any()));
                }
                let target = self.parse_type()?;
                self.expect(TokenKind::Gt)?;
                return Ok(Type::object_type(target));
            }
            TokenKind::Function => return self.parse_function_type(),
            TokenKind::Word => {
                let token = self.advance();
                let name = Name::new(&token.text, token.span);
                return match self.lookup_type_name(&name) {
                    Some(ty) => Ok(ty),
                    None => Err(self.fail(
                        ErrorKind::UnknownType,
                        token.span,
                        format!("unknown type `{name}`"),
                    )),
                };
            }
            _ => return Err(self.expected("a type")),
        };
        self.advance();
        Ok(ty)
    }

    /// `function ( [type [name]] , ... ) [-> type]`
    fn parse_function_type(&mut self) -> PResult<Type> {
        self.expect(TokenKind::Function)?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;
        if !self.check(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    variadic = true;
                    break;
                }
                let ty = self.parse_type()?;
                let name = if self.check(TokenKind::Word) {
                    self.advance().text
                } else {
                    String::new()
                };
                params.push(Param { name, ty });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let ret = if self.eat(TokenKind::Arrow) {
            self.parse_type()?
        } else {
            Type::void()
        };
        Ok(Type::function(ret, params, variadic))
    }

    fn parse_array_length(&mut self) -> PResult<usize> {
        let expr = self.parse_expr()?;
        let expr = self.rvalue(expr);
        match expr.literal_value() {
            Some(Value::Int(n)) if *n >= 0 => Ok(usize::try_from(*n).unwrap_or(usize::MAX)),
            Some(Value::Int(n)) => Err(self.fail(
                ErrorKind::IncorrectType,
                expr.span,
                format!("array length {n} is negative"),
            )),
            Some(other) => {
                let message = format!("array length must be an integer, found `{other}`");
                Err(self.fail(ErrorKind::IncorrectType, expr.span, message))
            }
            None => Err(self.fail(
                ErrorKind::MustBeStatic,
                expr.span,
                "array length is not known at compile time",
            )),
        }
    }

    /// The type a visible typedata or composite name stands for. The
    /// more recent definition wins when both tables have one.
    pub(crate) fn lookup_type_name(&self, name: &Name) -> Option<Type> {
        let typedata = self.tables.find_typedata(name, self.body);
        let composite = self.tables.find_composite(name, self.body);
        match (typedata, composite) {
            (Some(t), Some(c))
                if self.tables.composites.entry(c).seq > self.tables.typedata.entry(t).seq =>
            {
                Some(Type::new(TypeKind::Composite(
                    self.tables.composites.get(c).ty.clone(),
                )))
            }
            (Some(t), _) => Some(self.tables.typedata.get(t).ty()),
            (None, Some(c)) => Some(Type::new(TypeKind::Composite(
                self.tables.composites.get(c).ty.clone(),
            ))),
            (None, None) => None,
        }
    }

    pub(crate) fn is_type_name(&self, name: &Name) -> bool {
        self.tables.find_typedata(name, self.body).is_some()
            || self.tables.find_composite(name, self.body).is_some()
    }

    /// Skip tokens that form a type without resolving or reporting
    /// anything. Meant to run under [`Parser::look_ahead`].
    pub(crate) fn scan_type(&mut self) -> bool {
        while matches!(self.current_kind(), TokenKind::Static | TokenKind::Const) {
            self.advance();
        }
        match self.current_kind() {
            TokenKind::TypeType => {
                self.advance();
                if self.eat(TokenKind::Lt) && !(self.scan_type() && self.eat(TokenKind::Gt)) {
                    return false;
                }
            }
            TokenKind::Function => {
                self.advance();
                if !self.check(TokenKind::LParen) {
                    return false;
                }
                self.skip_group();
                if self.eat(TokenKind::Arrow) && !self.scan_type() {
                    return false;
                }
            }
            kind if kind.is_builtin_type() => {
                self.advance();
            }
            TokenKind::Word => {
                let Some(name) = Name::from_token(self.current()) else {
                    return false;
                };
                if !self.is_type_name(&name) {
                    return false;
                }
                self.advance();
            }
            _ => return false,
        }
        loop {
            match self.current_kind() {
                TokenKind::Const if self.peek_kind(1) == TokenKind::Star => {
                    self.advance();
                    self.advance();
                }
                TokenKind::Star => {
                    self.advance();
                }
                TokenKind::LBracket => self.skip_group(),
                _ => return true,
            }
        }
    }
}

/// Pointer through which the target may not be written.
fn const_pointer(target: Type) -> Type {
    let mut ty = Type::pointer(target);
    if let TypeKind::Pointer(pointer) = &mut ty.kind {
        pointer.is_const = true;
    }
    ty
}
