//! C-like rendering of an exported module, for `kiln dump` and tests.

use std::fmt::{self, Write};

use kiln_types::Type;

use super::Module;
use crate::ast::{Callee, Expr, ExprKind, Stmt, StmtKind};
use crate::symbols::FunctionId;

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            module: self,
            out: f,
            indent: 0,
        };
        for typedata in &self.typedata {
            writeln!(printer.out, "typedata {} {{", typedata.name)?;
            for member in &typedata.members {
                writeln!(printer.out, "    {} {};", member.ty, member.name)?;
            }
            writeln!(printer.out, "}}")?;
        }
        for composite in &self.composites {
            let optional = if composite.ty.optional { "optional " } else { "" };
            write!(printer.out, "comp {optional}{} {{ ", composite.name)?;
            for (i, member) in composite.ty.members.iter().enumerate() {
                if i > 0 {
                    printer.out.write_str(", ")?;
                }
                if member.up {
                    printer.out.write_str("up ")?;
                }
                write!(printer.out, "{}", member.ty)?;
            }
            writeln!(printer.out, " }}")?;
        }
        for stmt in &self.statements {
            printer.stmt(stmt)?;
        }
        Ok(())
    }
}

struct Printer<'a, 'f> {
    module: &'a Module,
    out: &'a mut fmt::Formatter<'f>,
    indent: usize,
}

impl Printer<'_, '_> {
    fn line_start(&mut self) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match &stmt.kind {
            StmtKind::Block { body: None, stmts } => {
                for stmt in stmts {
                    self.stmt(stmt)?;
                }
                return Ok(());
            }
            StmtKind::Inserted(shared) => return self.stmt(shared),
            StmtKind::Typedata(_) | StmtKind::Composite(_) => return Ok(()),
            _ => {}
        }
        self.line_start()?;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.expr(expr)?;
                self.out.write_str(";\n")
            }
            StmtKind::Assign { target, value } => {
                self.expr(target)?;
                self.out.write_str(" = ")?;
                self.expr(value)?;
                self.out.write_str(";\n")
            }
            StmtKind::VarDecl { name, ty, init, .. } => {
                write!(self.out, "{} {name}", runtime(ty))?;
                if let Some(init) = init {
                    self.out.write_str(" = ")?;
                    self.expr(init)?;
                }
                self.out.write_str(";\n")
            }
            StmtKind::Function(id) => self.function_decl(*id),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.out.write_str("if (")?;
                self.expr(cond)?;
                self.out.write_str(")\n")?;
                self.nested(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.line_start()?;
                    self.out.write_str("else\n")?;
                    self.nested(else_branch)?;
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.out.write_str("while (")?;
                self.expr(cond)?;
                self.out.write_str(")\n")?;
                self.nested(body)
            }
            StmtKind::Return(value) => {
                self.out.write_str("return")?;
                if let Some(value) = value {
                    self.out.write_char(' ')?;
                    self.expr(value)?;
                }
                self.out.write_str(";\n")
            }
            StmtKind::Break => self.out.write_str("break;\n"),
            StmtKind::Continue => self.out.write_str("continue;\n"),
            StmtKind::Block { stmts, .. } => {
                self.out.write_str("{\n")?;
                self.block_body(stmts)?;
                self.line_start()?;
                self.out.write_str("}\n")
            }
            StmtKind::Inserted(_) | StmtKind::Typedata(_) | StmtKind::Composite(_) => Ok(()),
        }
    }

    fn nested(&mut self, stmt: &Stmt) -> fmt::Result {
        self.indent += 1;
        let result = self.stmt(stmt);
        self.indent -= 1;
        result
    }

    fn block_body(&mut self, stmts: &[Stmt]) -> fmt::Result {
        self.indent += 1;
        let result = stmts.iter().try_for_each(|stmt| self.stmt(stmt));
        self.indent -= 1;
        result
    }

    fn function_decl(&mut self, id: FunctionId) -> fmt::Result {
        let module = self.module;
        let Some(function) = module.functions.iter().find(|function| function.id == id) else {
            return Ok(());
        };
        write!(self.out, "{} {}(", runtime(&function.sig.ret), function.name)?;
        for (i, param) in function.sig.params.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            write!(self.out, "{} {}", runtime(&param.ty), param.name)?;
        }
        if function.sig.variadic {
            let sep = if function.sig.params.is_empty() { "" } else { ", " };
            write!(self.out, "{sep}...")?;
        }
        match &function.body {
            None => self.out.write_str(");\n"),
            Some(body) => {
                self.out.write_str(") {\n")?;
                self.block_body(body)?;
                self.line_start()?;
                self.out.write_str("}\n")
            }
        }
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::Literal(value) => write!(self.out, "{value}"),
            ExprKind::Var(var_ref) => write!(self.out, "{}", var_ref.name),
            ExprKind::Function(id) => self.function_ref(*id),
            ExprKind::Unary { op, operand } => {
                write!(self.out, "{op}")?;
                self.operand(operand)
            }
            ExprKind::Binary { op, left, right } => {
                self.operand(left)?;
                write!(self.out, " {op} ")?;
                self.operand(right)
            }
            ExprKind::Cast(operand) => {
                write!(self.out, "({})", runtime(&expr.ty))?;
                self.operand(operand)
            }
            ExprKind::Member {
                base,
                member,
                through_pointer,
                ..
            } => {
                self.operand(base)?;
                let access = if *through_pointer { "->" } else { "." };
                write!(self.out, "{access}{member}")
            }
            ExprKind::Index { base, index } => {
                self.operand(base)?;
                self.out.write_char('[')?;
                self.expr(index)?;
                self.out.write_char(']')
            }
            ExprKind::Constructor(args) => {
                write!(self.out, "{}", runtime(&expr.ty))?;
                self.args(args)
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.operand(cond)?;
                self.out.write_str(" ? ")?;
                self.operand(then_expr)?;
                self.out.write_str(" : ")?;
                self.operand(else_expr)
            }
            ExprKind::Array(items) => {
                self.out.write_char('[')?;
                self.list(items)?;
                self.out.write_char(']')
            }
            ExprKind::Call { callee, args } => {
                match callee {
                    Callee::Function(id) => self.function_ref(*id)?,
                    Callee::Builtin(builtin) => write!(self.out, "{builtin}")?,
                    Callee::Indirect(target) => self.operand(target)?,
                }
                self.args(args)
            }
            ExprKind::Nothing => Ok(()),
        }
    }

    /// Operands that are themselves operators get parentheses.
    fn operand(&mut self, expr: &Expr) -> fmt::Result {
        let compound = matches!(
            expr.kind,
            ExprKind::Binary { .. } | ExprKind::Conditional { .. } | ExprKind::Cast(_)
        );
        if compound {
            self.out.write_char('(')?;
            self.expr(expr)?;
            self.out.write_char(')')
        } else {
            self.expr(expr)
        }
    }

    fn args(&mut self, args: &[Expr]) -> fmt::Result {
        self.out.write_char('(')?;
        self.list(args)?;
        self.out.write_char(')')
    }

    fn list(&mut self, items: &[Expr]) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            self.expr(item)?;
        }
        Ok(())
    }

    fn function_ref(&mut self, id: FunctionId) -> fmt::Result {
        match self.module.function_name(id) {
            Some(name) => write!(self.out, "{name}"),
            None => write!(self.out, "function#{}", id.raw()),
        }
    }
}

/// Runtime spelling: compile-time qualifiers do not survive export.
fn runtime(ty: &Type) -> Type {
    ty.clone().without_static()
}
