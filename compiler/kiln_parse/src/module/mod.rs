//! The code-generator boundary.
//!
//! A [`Module`] is the final statement list plus flat copies of the
//! runtime-relevant table rows. Anonymous names are alpha-renamed on the
//! way out (`$tmp` declared as variable 12 becomes `tmp__12`), in
//! declarations, references, types and table rows alike, so repeated
//! expansions of one rule never collide in the output.

mod render;

use kiln_ir::Name;
use kiln_types::{CompositeType, FunctionSig, Type, TypeKind};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::{rewrite_stmt, Expr, ExprKind, Rewriter, Stmt, StmtKind};
use crate::symbols::{
    CompId, EntryId, FunctionBody, FunctionId, Member, SymbolTables, TypedataId, VarId,
};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct ModuleFunction {
    pub id: FunctionId,
    pub name: Name,
    pub sig: FunctionSig,
    pub params: Vec<VarId>,
    /// `None` for a prototype without a definition.
    pub body: Option<Vec<Stmt>>,
}

#[derive(Clone, Debug)]
pub struct ModuleTypedata {
    pub id: TypedataId,
    pub name: Name,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug)]
pub struct ModuleComposite {
    pub id: CompId,
    pub name: Name,
    pub ty: CompositeType,
}

#[derive(Clone, Debug)]
pub struct ModuleVariable {
    pub id: VarId,
    pub name: Name,
    pub ty: Type,
}

/// Everything code generation needs from a successful parse.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub statements: Vec<Stmt>,
    /// Runtime functions; static-only ones never leave the compiler.
    pub functions: Vec<ModuleFunction>,
    pub typedata: Vec<ModuleTypedata>,
    /// Composites that exist at runtime.
    pub composites: Vec<ModuleComposite>,
    /// Runtime variables still in scope at the end of the parse.
    pub variables: Vec<ModuleVariable>,
}

impl Module {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn export(mut statements: Vec<Stmt>, tables: &SymbolTables) -> Module {
        let renamer = Renamer::new(tables);
        let mut rewriter = RenameRewriter(&renamer);
        for stmt in &mut statements {
            rewrite_stmt(stmt, &mut rewriter);
        }

        let functions = tables
            .functions
            .iter()
            .filter(|(_, entry)| !entry.value.is_static)
            .map(|(id, entry)| {
                let function = &entry.value;
                let body = match &function.body {
                    FunctionBody::Parsed(stmts) => Some(
                        stmts
                            .iter()
                            .cloned()
                            .map(|mut stmt| {
                                rewrite_stmt(&mut stmt, &mut rewriter);
                                stmt
                            })
                            .collect(),
                    ),
                    _ => None,
                };
                let mut sig = function.sig.clone();
                renamer.sig(&mut sig);
                ModuleFunction {
                    id,
                    name: renamed(&function.name, "fn", id.index()),
                    sig,
                    params: function.params.clone(),
                    body,
                }
            })
            .collect::<Vec<_>>();

        let typedata = tables
            .typedata
            .iter()
            .filter(|(_, entry)| !is_builtin_typedata(&entry.value.name))
            .map(|(id, entry)| ModuleTypedata {
                id,
                name: renamed(&entry.value.name, "t", id.index()),
                members: entry
                    .value
                    .members
                    .iter()
                    .map(|member| {
                        let mut ty = member.ty.clone();
                        renamer.ty(&mut ty);
                        Member {
                            name: member.name.clone(),
                            ty,
                        }
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        let composites = tables
            .composites
            .iter()
            .filter(|(_, entry)| !entry.value.ty.static_only)
            .map(|(id, entry)| {
                let mut ty = entry.value.ty.clone();
                for member in &mut ty.members {
                    renamer.ty(&mut member.ty);
                }
                ModuleComposite {
                    id,
                    name: entry.value.name.clone(),
                    ty,
                }
            })
            .collect::<Vec<_>>();

        let variables = tables
            .variables
            .iter()
            .filter(|(_, entry)| {
                !entry.out_of_scope
                    && !entry.value.macro_bound
                    && !entry.value.ty.flags.is_compile_time()
            })
            .map(|(id, entry)| {
                let mut ty = entry.value.ty.clone();
                renamer.ty(&mut ty);
                ModuleVariable {
                    id,
                    name: entry.value.name.alpha_renamed(id.index()),
                    ty,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            statements = statements.len(),
            functions = functions.len(),
            variables = variables.len(),
            "exported module"
        );
        Module {
            statements,
            functions,
            typedata,
            composites,
            variables,
        }
    }

    /// Exported name of a function, `None` for static-only functions.
    pub fn function_name(&self, id: FunctionId) -> Option<&Name> {
        self.functions
            .iter()
            .find(|function| function.id == id)
            .map(|function| &function.name)
    }
}

fn is_builtin_typedata(name: &Name) -> bool {
    name.matches(kiln_types::TOKEN_TYPEDATA) || name.matches(kiln_types::STATEMENT_TYPEDATA)
}

/// Consistent renaming of anonymous names.
struct Renamer {
    /// Anonymous typedata spellings to their new names.
    types: FxHashMap<String, String>,
}

impl Renamer {
    fn new(tables: &SymbolTables) -> Self {
        let types = tables
            .typedata
            .iter()
            .filter(|(_, entry)| entry.value.name.anonymous)
            .map(|(id, entry)| {
                let name = &entry.value.name;
                (name.spelling(), format!("{}__t{}", name.text, id.index()))
            })
            .collect();
        Renamer { types }
    }

    fn ty(&self, ty: &mut Type) {
        if self.types.is_empty() {
            return;
        }
        match &mut ty.kind {
            TypeKind::Typedata(name) => {
                if let Some(new) = self.types.get(name.as_str()) {
                    name.clone_from(new);
                }
            }
            TypeKind::Pointer(pointer) => self.ty(&mut pointer.target),
            TypeKind::Array(array) => self.ty(&mut array.element),
            TypeKind::ObjectType(target) => self.ty(target),
            TypeKind::Function(sig) => self.sig(sig),
            TypeKind::Composite(comp) => {
                for member in &mut comp.members {
                    self.ty(&mut member.ty);
                }
            }
            _ => {}
        }
    }

    fn sig(&self, sig: &mut FunctionSig) {
        self.ty(&mut sig.ret);
        for param in &mut sig.params {
            self.ty(&mut param.ty);
        }
    }

    fn value(&self, value: &mut Value) {
        match value {
            Value::Type(ty) => self.ty(ty),
            Value::Record { typedata, fields } => {
                if let Some(new) = self.types.get(typedata.as_str()) {
                    typedata.clone_from(new);
                }
                for field in fields {
                    self.value(field);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.value(item);
                }
            }
            _ => {}
        }
    }
}

/// `$name` declared as row `index` becomes `name__{tag}{index}`.
fn renamed(name: &Name, tag: &str, index: usize) -> Name {
    if !name.anonymous {
        return name.clone();
    }
    Name::new(&format!("{}__{tag}{index}", name.text), name.span)
}

struct RenameRewriter<'a>(&'a Renamer);

impl Rewriter for RenameRewriter<'_> {
    fn stmt(&mut self, stmt: &mut Stmt) {
        if let StmtKind::VarDecl { var, name, ty, .. } = &mut stmt.kind {
            *name = name.alpha_renamed(var.index());
            self.0.ty(ty);
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        self.0.ty(&mut expr.ty);
        match &mut expr.kind {
            ExprKind::Var(var_ref) => {
                var_ref.name = var_ref.name.alpha_renamed(var_ref.var.index());
            }
            ExprKind::Literal(value) => self.0.value(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests;
