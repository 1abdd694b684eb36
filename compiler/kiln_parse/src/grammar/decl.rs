//! Declarations: variables, functions, typedata and composites.

use kiln_diagnostic::ErrorKind;
use kiln_ir::{Name, Span, TokenKind};
use kiln_types::{CompMember, CompositeType, FunctionSig, Param, Type, TypeFlags, TypeKind};
use tracing::debug;

use crate::ast::{Stmt, StmtKind};
use crate::context::ParseContext;
use crate::symbols::{
    Binding, Composite, Function, FunctionBody, FunctionId, Member, Typedata, Variable,
};
use crate::value::Value;
use crate::{PResult, Parser};

impl Parser {
    /// Whether the current token starts a declaration: a qualifier, or a
    /// type followed by a name.
    pub(crate) fn starts_declaration(&mut self) -> bool {
        match self.current_kind() {
            TokenKind::Static | TokenKind::Const => true,
            kind if kind.is_builtin_type()
                || kind == TokenKind::Function
                || kind == TokenKind::Word =>
            {
                self.look_ahead(|p| p.scan_type() && p.check(TokenKind::Word))
            }
            _ => false,
        }
    }

    /// `type name (...)` or `type name [= init] (, name [= init])* ;`
    pub(crate) fn parse_declaration(&mut self) -> PResult<Stmt> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let name = self.expect_word()?;
        if self.check(TokenKind::LParen) {
            return self.parse_function_decl(ty, name, start);
        }

        let mut stmts = Vec::new();
        let mut name = name;
        loop {
            if let Some(stmt) = self.declare_variable(&ty, name)? {
                stmts.push(stmt);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
            name = self.expect_word()?;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::group(stmts, start.merge(self.previous_span()), self.body))
    }

    fn declare_variable(&mut self, ty: &Type, name: Name) -> PResult<Option<Stmt>> {
        let span = name.span;
        if ty.is_void() {
            return Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("variable `{name}` cannot have type `void`"),
            ));
        }
        if !name.anonymous && self.tables.variable_in_body(&name, self.body).is_some() {
            self.warn(
                ErrorKind::Redefinition,
                span,
                format!("`{name}` is already declared in this scope"),
            );
        }

        let init = if self.eat(TokenKind::Eq) {
            let expr = self.parse_expr()?;
            Some(self.rvalue(expr))
        } else {
            None
        };
        if let Some(init) = &init {
            if ty.is_static() && !init.ty.flags.is_compile_time() {
                return Err(self.fail(
                    ErrorKind::MustBeStatic,
                    init.span,
                    format!("initializer of static `{ty}` is not known at compile time"),
                ));
            }
            if !kiln_types::is_castable(ty, &init.ty) {
                return Err(self.fail(
                    ErrorKind::IncorrectType,
                    init.span,
                    format!("cannot initialize `{ty}` with `{}`", init.ty),
                ));
            }
        }

        if ty.is_static() && !self.context.defers_effects() {
            let value = match &init {
                Some(init) => self.static_initializer(ty, init.literal_value(), init.span)?,
                None => Value::zero(ty),
            };
            let variable = Variable {
                binding: Binding::Known(value),
                ..Variable::new(name, ty.clone())
            };
            self.tables
                .define_variable(variable, self.body)
                .map_err(|err| self.table_error(err, span))?;
            return Ok(None);
        }

        // Locals of a static function hold compile-time values once the
        // function runs.
        let ty = if self.context.defers_effects() {
            if ty.is_static() {
                ty.clone().as_prototype()
            } else {
                ty.clone().with_flags(TypeFlags::PROTOTYPE_STATIC)
            }
        } else {
            ty.clone()
        };
        let var = self
            .tables
            .define_variable(Variable::new(name.clone(), ty.clone()), self.body)
            .map_err(|err| self.table_error(err, span))?;
        let stmt_span = init.as_ref().map_or(span, |init| span.merge(init.span));
        Ok(Some(Stmt::new(
            StmtKind::VarDecl {
                var,
                name,
                ty,
                init,
            },
            stmt_span,
            self.body,
        )))
    }

    fn static_initializer(&mut self, ty: &Type, value: Option<&Value>, span: Span) -> PResult<Value> {
        let Some(value) = value else {
            return Err(self.fail(
                ErrorKind::MustBeStatic,
                span,
                format!("initializer of static `{ty}` is not known at compile time"),
            ));
        };
        match value.convert(ty) {
            Some(converted) => Ok(converted),
            None => Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("cannot convert `{value}` to `{ty}`"),
            )),
        }
    }

    // === Functions ===

    fn parse_function_decl(&mut self, ret: Type, name: Name, start: Span) -> PResult<Stmt> {
        self.expect(TokenKind::LParen)?;
        let is_static = ret.is_static();
        let mut params = Vec::new();
        let mut param_names = Vec::new();
        let mut variadic = false;
        if !self.check(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    variadic = true;
                    break;
                }
                let mut ty = self.parse_type()?;
                if ty.is_void() {
                    let span = self.previous_span();
                    return Err(self.fail(
                        ErrorKind::IncorrectType,
                        span,
                        "parameters cannot have type `void`",
                    ));
                }
                if is_static {
                    ty = ty.with_static();
                }
                let param = self.expect_word()?;
                params.push(Param {
                    name: param.spelling(),
                    ty,
                });
                param_names.push(param);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let sig = FunctionSig {
            ret: Box::new(ret),
            params,
            variadic,
        };

        if self.eat(TokenKind::Semicolon) {
            return self.declare_prototype(name, sig, is_static, start);
        }
        let Some(range) = self.cursor.capture_braced() else {
            return Err(self.expected("`;` or a function body"));
        };
        let span = start.merge(self.previous_span());

        let (id, fresh) = self.function_entry(name, sig, is_static, span)?;
        {
            let function = self.tables.functions.get_mut(id);
            function.body_tokens = Some(range.clone());
            function.span = span;
        }

        if is_static {
            // Parsed on first call.
            self.tables.functions.get_mut(id).body = FunctionBody::Deferred;
            debug!(function = %self.tables.functions.get(id).name, "deferred static function");
            return Ok(self.empty(span));
        }

        let body = self.open_body(span)?;
        let sig = self.tables.functions.get(id).sig.clone();
        let mut param_vars = Vec::with_capacity(param_names.len());
        for (param, name) in sig.params.iter().zip(param_names) {
            let var = self
                .tables
                .define_variable(Variable::new(name, param.ty.clone()), Some(body))
                .map_err(|err| self.table_error(err, span))?;
            param_vars.push(var);
        }
        self.tables.functions.get_mut(id).params = param_vars;

        let ctx = self
            .context
            .without(ParseContext::FUNCTION_SCOPED.union(ParseContext::IN_SYNTAX_BODY))
            .with(ParseContext::IN_FUNCTION);
        let stmts = self.with_body(body, |p| {
            p.with_context(ctx, |p| {
                p.with_function_frame((*sig.ret).clone(), |p| p.parse_deferred_list(range, span))
            })
        })?;
        self.tables.functions.get_mut(id).body = FunctionBody::Parsed(stmts.into());

        if fresh {
            Ok(Stmt::new(StmtKind::Function(id), span, self.body))
        } else {
            Ok(self.empty(span))
        }
    }

    fn declare_prototype(
        &mut self,
        name: Name,
        sig: FunctionSig,
        is_static: bool,
        start: Span,
    ) -> PResult<Stmt> {
        let span = start.merge(self.previous_span());
        if let Some(existing) = self.tables.function_in_body(&name, self.body) {
            self.check_redeclaration(existing, &sig, is_static, span)?;
            return Ok(self.empty(span));
        }
        let function = Function {
            name,
            sig,
            is_static,
            body_tokens: None,
            body: FunctionBody::Prototype,
            params: Vec::new(),
            span,
        };
        let id = self
            .tables
            .define_function(function, self.body)
            .map_err(|err| self.table_error(err, span))?;
        if is_static {
            Ok(self.empty(span))
        } else {
            Ok(Stmt::new(StmtKind::Function(id), span, self.body))
        }
    }

    /// Entry a definition fills in: a matching prototype in this body, or
    /// a new one. The flag is set for new entries.
    fn function_entry(
        &mut self,
        name: Name,
        sig: FunctionSig,
        is_static: bool,
        span: Span,
    ) -> PResult<(FunctionId, bool)> {
        if let Some(existing) = self.tables.function_in_body(&name, self.body) {
            if !self.tables.functions.get(existing).has_body() {
                self.check_redeclaration(existing, &sig, is_static, span)?;
                return Ok((existing, false));
            }
            self.warn(
                ErrorKind::Redefinition,
                name.span,
                format!("function `{name}` is already defined in this scope"),
            );
        }
        let function = Function {
            name,
            sig,
            is_static,
            body_tokens: None,
            body: FunctionBody::Prototype,
            params: Vec::new(),
            span,
        };
        let id = self
            .tables
            .define_function(function, self.body)
            .map_err(|err| self.table_error(err, span))?;
        Ok((id, true))
    }

    fn check_redeclaration(
        &mut self,
        existing: FunctionId,
        sig: &FunctionSig,
        is_static: bool,
        span: Span,
    ) -> PResult<()> {
        let previous = self.tables.functions.get(existing);
        if previous.is_static == is_static
            && kiln_types::equals(&signature_type(&previous.sig), &signature_type(sig))
        {
            return Ok(());
        }
        let message = format!(
            "declaration of `{}` does not match its prototype `{}`",
            previous.name,
            previous.ty()
        );
        Err(self.fail(ErrorKind::IncorrectType, span, message))
    }

    // === Nominal types ===

    /// `typedata NAME { type member; ... }`
    pub(crate) fn parse_typedata_decl(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Typedata)?.span;
        let name = self.expect_word()?;
        if self.tables.type_in_body(&name, self.body) {
            self.warn(
                ErrorKind::Redefinition,
                name.span,
                format!("type `{name}` is already defined in this scope"),
            );
        }
        // Registered first so members may point at it.
        let id = self
            .tables
            .define_typedata(
                Typedata {
                    name,
                    members: Vec::new(),
                },
                self.body,
            )
            .map_err(|err| self.table_error(err, start))?;

        self.expect(TokenKind::LBrace)?;
        while !self.check(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.expected("`}`"));
            }
            let ty = self.parse_type()?;
            let member = self.expect_word()?;
            self.expect(TokenKind::Semicolon)?;
            if ty.is_void() {
                return Err(self.fail(
                    ErrorKind::IncorrectType,
                    member.span,
                    format!("member `{member}` cannot have type `void`"),
                ));
            }
            if self.tables.typedata.get(id).member_index(&member).is_some() {
                self.warn(
                    ErrorKind::Redefinition,
                    member.span,
                    format!("member `{member}` is declared twice"),
                );
            }
            self.tables
                .typedata
                .get_mut(id)
                .members
                .push(Member { name: member, ty });
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon);
        Ok(Stmt::new(
            StmtKind::Typedata(id),
            start.merge(self.previous_span()),
            self.body,
        ))
    }

    /// `comp [static] [optional] NAME { [up] type, ... }`
    pub(crate) fn parse_comp_decl(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Comp)?.span;
        let static_only = self.eat(TokenKind::Static);
        let optional = self.eat(TokenKind::Optional);
        let name = self.expect_word()?;
        if self.tables.type_in_body(&name, self.body) {
            self.warn(
                ErrorKind::Redefinition,
                name.span,
                format!("type `{name}` is already defined in this scope"),
            );
        }

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let up = self.eat(TokenKind::Up);
                let ty = self.parse_type()?;
                members.push(CompMember { ty, up });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon);
        let span = start.merge(self.previous_span());

        let ty = CompositeType {
            name: name.spelling(),
            members,
            static_only,
            optional,
        };
        let id = self
            .tables
            .define_composite(Composite { name, ty }, self.body)
            .map_err(|err| self.table_error(err, span))?;
        if static_only {
            Ok(self.empty(span))
        } else {
            Ok(Stmt::new(StmtKind::Composite(id), span, self.body))
        }
    }
}

fn signature_type(sig: &FunctionSig) -> Type {
    Type::new(TypeKind::Function(sig.clone()))
}
