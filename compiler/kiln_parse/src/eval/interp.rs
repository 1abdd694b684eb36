//! Statement interpreter for static functions.
//!
//! A static function body is parsed lazily on its first call, with
//! effects deferred: static calls and side-effecting built-ins inside
//! it stay as nodes. The interpreter then walks those nodes with a
//! per-call environment. Reads fall back to the symbol tables, so a
//! body sees the current value of global statics.

use std::rc::Rc;

use kiln_diagnostic::{ErrorKind, Fatal};
use kiln_ir::{Name, Span};
use kiln_types::{FunctionSig, Type, TypeKind};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::{fold_binary, fold_unary, Builtin};
use crate::ast::{Callee, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use crate::context::ParseContext;
use crate::cursor::DeferredRange;
use crate::stack::ensure_sufficient_stack;
use crate::symbols::{Binding, BodyId, FunctionBody, FunctionId, VarId, Variable};
use crate::value::Value;
use crate::{PResult, Parser};

/// Locals of one static call.
type Env = FxHashMap<VarId, Value>;

enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

impl Parser {
    /// Run static function `id` on `args`.
    pub(crate) fn call_static(&mut self, id: FunctionId, args: Vec<Value>, span: Span) -> PResult<Value> {
        if self.eval_depth >= self.config.max_eval_depth {
            return Err(self.fail(
                ErrorKind::RecursionLimit,
                span,
                format!(
                    "static calls nest deeper than {}",
                    self.config.max_eval_depth
                ),
            ));
        }
        let body = self.prepare_static_body(id, span)?;
        let function = self.tables.functions.get(id);
        let name = function.name.clone();
        let sig = function.sig.clone();
        let params = function.params.clone();

        let mut env = Env::default();
        for ((var, param), arg) in params.iter().zip(&sig.params).zip(args) {
            let Some(value) = arg.convert(&param.ty) else {
                let message = format!("cannot pass `{arg}` as `{}`", param.ty);
                return Err(self.fail(ErrorKind::IncorrectType, span, message));
            };
            env.insert(*var, value);
        }

        trace!(function = %name, depth = self.eval_depth + 1, "static call");
        self.eval_depth += 1;
        let flow = ensure_sufficient_stack(|| self.exec_list(&body, &mut env));
        self.eval_depth -= 1;

        let ret = &sig.ret;
        match flow? {
            Flow::Return(value) if !ret.is_void() => match value.convert(ret) {
                Some(value) => Ok(value),
                None => {
                    let message = format!("cannot return `{value}` as `{ret}`");
                    Err(self.fail(ErrorKind::IncorrectType, span, message))
                }
            },
            _ if ret.is_void() => Ok(Value::Void),
            _ => Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("static function `{name}` ended without returning a `{ret}`"),
            )),
        }
    }

    /// The parsed body of a static function, parsing it on first use.
    fn prepare_static_body(&mut self, id: FunctionId, span: Span) -> PResult<Rc<[Stmt]>> {
        let function = self.tables.functions.get(id);
        let range = match (&function.body, &function.body_tokens) {
            (FunctionBody::Parsed(stmts), _) => return Ok(Rc::clone(stmts)),
            (FunctionBody::Parsing, _) => {
                let message = format!("`{}` is called while its body is being prepared", function.name);
                return Err(self.fail(ErrorKind::RecursionLimit, span, message));
            }
            (FunctionBody::Deferred, Some(range)) => range.clone(),
            _ => {
                let message = format!("static function `{}` has no body", function.name);
                return Err(self.fail(ErrorKind::UnknownFunction, span, message));
            }
        };
        let sig = function.sig.clone();
        let fn_span = function.span;
        let home = self.tables.functions.entry(id).body;

        self.tables.functions.get_mut(id).body = FunctionBody::Parsing;
        match self.parse_static_body(id, range, &sig, home, fn_span) {
            Ok(stmts) => {
                let stmts: Rc<[Stmt]> = stmts.into();
                debug!(function = id.raw(), statements = stmts.len(), "prepared static function");
                self.tables.functions.get_mut(id).body = FunctionBody::Parsed(Rc::clone(&stmts));
                Ok(stmts)
            }
            Err(fatal) => {
                self.tables.functions.get_mut(id).body = FunctionBody::Deferred;
                Err(fatal)
            }
        }
    }

    fn parse_static_body(
        &mut self,
        id: FunctionId,
        range: DeferredRange,
        sig: &FunctionSig,
        home: Option<BodyId>,
        span: Span,
    ) -> PResult<Vec<Stmt>> {
        let body = self.open_body_in(home, span)?;
        let mut params = Vec::with_capacity(sig.params.len());
        for param in &sig.params {
            let variable = Variable::new(Name::new(&param.name, span), param.ty.clone().as_prototype());
            let var = self
                .tables
                .define_variable(variable, Some(body))
                .map_err(|err| self.table_error(err, span))?;
            params.push(var);
        }
        self.tables.functions.get_mut(id).params = params;

        let ctx = self
            .context
            .without(ParseContext::FUNCTION_SCOPED.union(ParseContext::IN_SYNTAX_BODY))
            .with(ParseContext::IN_FUNCTION.union(ParseContext::DEFER_EFFECTS));
        let ret = (*sig.ret).clone();
        self.with_body(body, |p| {
            p.with_context(ctx, |p| {
                p.with_function_frame(ret, |p| p.parse_deferred_list(range, span))
            })
        })
    }

    // === Statements ===

    fn exec_list(&mut self, stmts: &[Stmt], env: &mut Env) -> PResult<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt, env)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &mut Env) -> PResult<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, env)?;
            }
            StmtKind::VarDecl { var, ty, init, .. } => {
                let value = match init {
                    Some(init) => {
                        let value = self.eval_expr(init, env)?;
                        self.convert_value(value, ty, init.span)?
                    }
                    None => Value::zero(ty),
                };
                env.insert(*var, value);
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value, env)?;
                let value = self.convert_value(value, &target.ty, stmt.span)?;
                self.assign(target, value, env)?;
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_truth(cond, env)? {
                    return self.exec_stmt(then_branch, env);
                }
                if let Some(else_branch) = else_branch {
                    return self.exec_stmt(else_branch, env);
                }
            }
            StmtKind::While { cond, body } => {
                let mut iterations = 0usize;
                while self.eval_truth(cond, env)? {
                    iterations += 1;
                    if iterations > self.config.max_static_iterations {
                        return Err(self.fail(
                            ErrorKind::RecursionLimit,
                            stmt.span,
                            format!(
                                "static loop exceeds {} iterations",
                                self.config.max_static_iterations
                            ),
                        ));
                    }
                    match self.exec_stmt(body, env)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            StmtKind::Block { stmts, .. } => return self.exec_list(stmts, env),
            StmtKind::Inserted(shared) => return self.exec_stmt(shared, env),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Function(_) | StmtKind::Typedata(_) | StmtKind::Composite(_) => {}
        }
        Ok(Flow::Normal)
    }

    fn convert_value(&mut self, value: Value, ty: &Type, span: Span) -> PResult<Value> {
        match value.convert(ty) {
            Some(converted) => Ok(converted),
            None => Err(self.fail(
                ErrorKind::IncorrectType,
                span,
                format!("cannot convert `{value}` to `{ty}`"),
            )),
        }
    }

    /// Store into an lvalue, rebuilding enclosing arrays and records.
    fn assign(&mut self, target: &Expr, value: Value, env: &mut Env) -> PResult<()> {
        match &target.kind {
            ExprKind::Var(var_ref) => {
                let var = var_ref.var;
                if let Some(slot) = env.get_mut(&var) {
                    *slot = value;
                    return Ok(());
                }
                let variable = self.tables.variables.get_mut(var);
                if let Binding::Known(slot) = &mut variable.binding {
                    *slot = value;
                    return Ok(());
                }
                let name = variable.name.clone();
                Err(self.not_static(&name.to_string(), target.span))
            }
            ExprKind::Index { base, index } => {
                let position = self.eval_index(index, env)?;
                let mut container = self.eval_expr(base, env)?;
                match &mut container {
                    Value::Array(items) if position < items.len() => items[position] = value,
                    Value::Array(items) => {
                        let message = format!("index {position} is out of bounds for length {}", items.len());
                        return Err(self.fail(ErrorKind::IncorrectType, index.span, message));
                    }
                    _ => return Err(self.not_static("indexed value", base.span)),
                }
                self.assign(base, container, env)
            }
            ExprKind::Member { base, index, .. } => {
                let mut record = self.eval_expr(base, env)?;
                match &mut record {
                    Value::Record { fields, .. } if *index < fields.len() => fields[*index] = value,
                    _ => return Err(self.not_static("record", base.span)),
                }
                self.assign(base, record, env)
            }
            _ => Err(self.not_static("assignment target", target.span)),
        }
    }

    // === Expressions ===

    fn eval_truth(&mut self, expr: &Expr, env: &mut Env) -> PResult<bool> {
        let value = self.eval_expr(expr, env)?;
        match value.truthy() {
            Some(truth) => Ok(truth),
            None => Err(self.fail(
                ErrorKind::IncorrectType,
                expr.span,
                format!("`{value}` cannot be used as a condition"),
            )),
        }
    }

    fn eval_index(&mut self, index: &Expr, env: &mut Env) -> PResult<usize> {
        let value = self.eval_expr(index, env)?;
        match value.as_int().and_then(|n| usize::try_from(n).ok()) {
            Some(position) => Ok(position),
            None => Err(self.fail(
                ErrorKind::IncorrectType,
                index.span,
                format!("`{value}` is not a valid index"),
            )),
        }
    }

    fn not_static(&mut self, what: &str, span: Span) -> Fatal {
        self.fail(
            ErrorKind::MustBeStatic,
            span,
            format!("{what} is not known at compile time"),
        )
    }

    fn eval_expr(&mut self, expr: &Expr, env: &mut Env) -> PResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &mut Env) -> PResult<Value> {
        let span = expr.span;
        let value = match &expr.kind {
            ExprKind::Literal(value) => value.clone(),
            ExprKind::Var(var_ref) => {
                if let Some(value) = env.get(&var_ref.var) {
                    return Ok(value.clone());
                }
                let variable = self.tables.variables.get(var_ref.var);
                match &variable.binding {
                    Binding::Known(value) => value.clone(),
                    Binding::Expr(inner) => {
                        let inner = (**inner).clone();
                        return self.eval_expr(&inner, env);
                    }
                    Binding::Unknown => {
                        let name = variable.name.to_string();
                        return Err(self.not_static(&format!("`{name}`"), span));
                    }
                }
            }
            ExprKind::Function(id) => Value::Function(*id),
            ExprKind::Unary { op, operand } => {
                if matches!(op, UnaryOp::AddrOf | UnaryOp::Deref) {
                    return Err(self.not_static("pointer operation", span));
                }
                let value = self.eval_expr(operand, env)?;
                fold_unary(*op, &value).map_err(|err| self.fold_failed(err, span))?
            }
            ExprKind::Binary { op, left, right } => {
                // `&&` and `||` evaluate both operands.
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                let value = fold_binary(*op, &left, &right).map_err(|err| self.fold_failed(err, span))?;
                if expr.ty.is_numeric() {
                    value.convert(&expr.ty).unwrap_or(value)
                } else {
                    value
                }
            }
            ExprKind::Cast(operand) => {
                let value = self.eval_expr(operand, env)?;
                self.convert_value(value, &expr.ty, span)?
            }
            ExprKind::Index { base, index } => {
                let position = self.eval_index(index, env)?;
                match self.eval_expr(base, env)? {
                    Value::Array(mut items) if position < items.len() => items.swap_remove(position),
                    Value::Array(items) => {
                        let message = format!("index {position} is out of bounds for length {}", items.len());
                        return Err(self.fail(ErrorKind::IncorrectType, index.span, message));
                    }
                    other => {
                        let message = format!("`{other}` cannot be indexed");
                        return Err(self.fail(ErrorKind::IncorrectType, base.span, message));
                    }
                }
            }
            ExprKind::Member { base, index, member, .. } => match self.eval_expr(base, env)? {
                Value::Record { mut fields, .. } if *index < fields.len() => fields.swap_remove(*index),
                _ => {
                    let message = format!("no member `{member}` on this value");
                    return Err(self.fail(ErrorKind::UnknownMember, span, message));
                }
            },
            ExprKind::Constructor(args) => {
                let TypeKind::Typedata(typedata) = &expr.ty.kind else {
                    return Err(self.not_static("constructor", span));
                };
                let typedata = typedata.clone();
                let fields = args
                    .iter()
                    .map(|arg| self.eval_expr(arg, env))
                    .collect::<PResult<Vec<_>>>()?;
                Value::Record { typedata, fields }
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let branch = if self.eval_truth(cond, env)? {
                    then_expr
                } else {
                    else_expr
                };
                return self.eval_expr(branch, env);
            }
            ExprKind::Array(items) => {
                let element = expr.ty.element().cloned().unwrap_or_else(Type::any);
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.eval_expr(item, env)?;
                    values.push(if element.is_numeric() {
                        self.convert_value(value, &element, item.span)?
                    } else {
                        value
                    });
                }
                Value::Array(values)
            }
            ExprKind::Call { callee, args } => return self.eval_call(callee, args, span, env),
            ExprKind::Nothing => Value::Void,
        };
        Ok(value)
    }

    fn eval_call(&mut self, callee: &Callee, args: &[Expr], span: Span, env: &mut Env) -> PResult<Value> {
        let values = args
            .iter()
            .map(|arg| self.eval_expr(arg, env))
            .collect::<PResult<Vec<_>>>()?;
        let id = match callee {
            Callee::Builtin(builtin) => return self.eval_builtin(*builtin, values, span),
            Callee::Function(id) => *id,
            Callee::Indirect(target) => match self.eval_expr(target, env)? {
                Value::Function(id) => id,
                other => {
                    let message = format!("`{other}` is not callable");
                    return Err(self.fail(ErrorKind::IncorrectType, target.span, message));
                }
            },
        };
        let function = self.tables.functions.get(id);
        if !function.is_static {
            let what = format!("result of runtime function `{}`", function.name);
            return Err(self.not_static(&what, span));
        }
        self.call_static(id, values, span)
    }

    /// Built-ins left as nodes while the body was prepared.
    fn eval_builtin(&mut self, builtin: Builtin, mut values: Vec<Value>, span: Span) -> PResult<Value> {
        let arg = values.pop().unwrap_or(Value::Void);
        match builtin {
            Builtin::Error => match arg.as_text() {
                Some(message) => Err(self.fail(ErrorKind::UserError, span, message)),
                None => Err(self.not_static("`error` message", span)),
            },
            Builtin::Undefine => {
                let Value::Word(text) = arg else {
                    return Err(self.not_static("`undefine` name", span));
                };
                let removed = self.tables.undefine(&Name::new(&text, span), self.body);
                debug!(name = %text, ?removed, "undefine");
                Ok(Value::Void)
            }
            Builtin::Length => match arg {
                Value::Array(items) => Ok(Value::Int(i64::try_from(items.len()).unwrap_or(i64::MAX))),
                other => {
                    let message = format!("`length` expects an array, found `{other}`");
                    Err(self.fail(ErrorKind::IncorrectType, span, message))
                }
            },
            Builtin::Defined | Builtin::GetStatements | Builtin::Insert => {
                Err(self.not_static(&format!("`{builtin}` call"), span))
            }
        }
    }
}
