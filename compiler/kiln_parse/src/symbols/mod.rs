//! Symbol tables with soft scope masking.
//!
//! Five append-only tables (variables, functions, typedata, composites,
//! syntax rules) share one arena of lexical bodies. Lookups scan
//! backward so the most recent visible definition wins; an entry is
//! visible when it is not out of scope and its owning body is the
//! current body or one of its ancestors.
//!
//! Leaving a body marks its entries out of scope without removing them.
//! Each macro expansion opens a fresh body, so two active expansions of
//! the same rule never see each other's captures.

mod entries;
mod ids;
mod scope;
mod table;

use std::collections::TryReserveError;

use kiln_ir::Name;

pub use entries::{
    Binding, Composite, Function, FunctionBody, Member, SyntaxRule, Typedata, Variable,
};
pub use ids::{BodyId, CompId, EntryId, FunctionId, RuleId, TypedataId, VarId};
pub use scope::Scopes;
pub use table::{Entry, Table};

/// Growing a table failed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum TableError {
    #[error("symbol table allocation failed")]
    OutOfMemory,
    #[error("symbol tables are limited to {limit} entries")]
    LimitReached { limit: usize },
}

impl From<TryReserveError> for TableError {
    fn from(_: TryReserveError) -> Self {
        TableError::OutOfMemory
    }
}

/// Which table an entry lives in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Variable,
    Function,
    Typedata,
    Composite,
}

/// All symbol tables plus the body arena.
#[derive(Clone, Debug, Default)]
pub struct SymbolTables {
    scopes: Scopes,
    pub variables: Table<VarId, Variable>,
    pub functions: Table<FunctionId, Function>,
    pub typedata: Table<TypedataId, Typedata>,
    pub composites: Table<CompId, Composite>,
    pub rules: Table<RuleId, SyntaxRule>,
    next_seq: u64,
    entry_limit: Option<usize>,
}

impl SymbolTables {
    pub fn new(entry_limit: Option<usize>) -> Self {
        SymbolTables {
            entry_limit,
            ..Self::default()
        }
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn new_body(&mut self, parent: Option<BodyId>) -> Result<BodyId, TableError> {
        self.scopes.new_body(parent)
    }

    /// Total number of rows across all tables.
    pub fn entry_count(&self) -> usize {
        self.variables.len()
            + self.functions.len()
            + self.typedata.len()
            + self.composites.len()
            + self.rules.len()
    }

    fn next_seq(&mut self) -> Result<u64, TableError> {
        if let Some(limit) = self.entry_limit {
            if self.entry_count() >= limit {
                return Err(TableError::LimitReached { limit });
            }
        }
        self.next_seq += 1;
        Ok(self.next_seq)
    }

    // === Definition ===

    pub fn define_variable(
        &mut self,
        variable: Variable,
        body: Option<BodyId>,
    ) -> Result<VarId, TableError> {
        let seq = self.next_seq()?;
        self.variables.push(variable, body, seq)
    }

    pub fn define_function(
        &mut self,
        function: Function,
        body: Option<BodyId>,
    ) -> Result<FunctionId, TableError> {
        let seq = self.next_seq()?;
        self.functions.push(function, body, seq)
    }

    pub fn define_typedata(
        &mut self,
        typedata: Typedata,
        body: Option<BodyId>,
    ) -> Result<TypedataId, TableError> {
        let seq = self.next_seq()?;
        self.typedata.push(typedata, body, seq)
    }

    pub fn define_composite(
        &mut self,
        composite: Composite,
        body: Option<BodyId>,
    ) -> Result<CompId, TableError> {
        let seq = self.next_seq()?;
        self.composites.push(composite, body, seq)
    }

    pub fn define_rule(
        &mut self,
        rule: SyntaxRule,
        body: Option<BodyId>,
    ) -> Result<RuleId, TableError> {
        let seq = self.next_seq()?;
        self.rules.push(rule, body, seq)
    }

    // === Lookup ===

    pub fn find_variable(&self, name: &Name, current: Option<BodyId>) -> Option<VarId> {
        self.variables
            .find(&self.scopes, current, |v| v.name.same_as(name))
    }

    pub fn find_function(&self, name: &Name, current: Option<BodyId>) -> Option<FunctionId> {
        self.functions
            .find(&self.scopes, current, |f| f.name.same_as(name))
    }

    pub fn find_typedata(&self, name: &Name, current: Option<BodyId>) -> Option<TypedataId> {
        self.typedata
            .find(&self.scopes, current, |t| t.name.same_as(name))
    }

    pub fn find_composite(&self, name: &Name, current: Option<BodyId>) -> Option<CompId> {
        self.composites
            .find(&self.scopes, current, |c| c.name.same_as(name))
    }

    /// Typedata named by a type's spelling. Prefers a visible entry but
    /// falls back to any entry, since values outlive the scope their
    /// type was declared in.
    pub fn typedata_spelled(&self, spelled: &str, current: Option<BodyId>) -> Option<TypedataId> {
        self.typedata
            .find(&self.scopes, current, |t| t.name.matches(spelled))
            .or_else(|| {
                self.typedata
                    .iter()
                    .filter(|(_, entry)| entry.value.name.matches(spelled))
                    .map(|(id, _)| id)
                    .last()
            })
    }

    pub fn is_variable_defined(&self, name: &Name, current: Option<BodyId>) -> bool {
        self.find_variable(name, current).is_some()
    }

    /// Whether `name` resolves in any table.
    pub fn is_defined(&self, name: &Name, current: Option<BodyId>) -> bool {
        self.resolve_any(name, current).is_some()
    }

    /// Visible entry with the highest definition order across tables.
    fn resolve_any(&self, name: &Name, current: Option<BodyId>) -> Option<(SymbolKind, usize, u64)> {
        let candidates = [
            self.find_variable(name, current)
                .map(|id| (SymbolKind::Variable, id.index(), self.variables.entry(id).seq)),
            self.find_function(name, current)
                .map(|id| (SymbolKind::Function, id.index(), self.functions.entry(id).seq)),
            self.find_typedata(name, current)
                .map(|id| (SymbolKind::Typedata, id.index(), self.typedata.entry(id).seq)),
            self.find_composite(name, current)
                .map(|id| (SymbolKind::Composite, id.index(), self.composites.entry(id).seq)),
        ];
        candidates
            .into_iter()
            .flatten()
            .max_by_key(|&(_, _, seq)| seq)
    }

    /// Variable declared in exactly `body` under `name`, still in scope.
    pub fn variable_in_body(&self, name: &Name, body: Option<BodyId>) -> Option<VarId> {
        self.variables
            .iter()
            .filter(|(_, entry)| {
                !entry.out_of_scope && entry.body == body && entry.value.name.same_as(name)
            })
            .map(|(id, _)| id)
            .last()
    }

    /// Function declared in exactly `body` under `name`, still in scope.
    pub fn function_in_body(&self, name: &Name, body: Option<BodyId>) -> Option<FunctionId> {
        self.functions
            .iter()
            .filter(|(_, entry)| {
                !entry.out_of_scope && entry.body == body && entry.value.name.same_as(name)
            })
            .map(|(id, _)| id)
            .last()
    }

    /// Whether a type name is already taken in exactly `body`.
    pub fn type_in_body(&self, name: &Name, body: Option<BodyId>) -> bool {
        let typedata = self.typedata.iter().any(|(_, entry)| {
            !entry.out_of_scope && entry.body == body && entry.value.name.same_as(name)
        });
        typedata
            || self.composites.iter().any(|(_, entry)| {
                !entry.out_of_scope && entry.body == body && entry.value.name.same_as(name)
            })
    }

    /// Visible syntax rules, most recent first.
    pub fn visible_rules(&self, current: Option<BodyId>) -> Vec<RuleId> {
        self.rules.visible(&self.scopes, current).collect()
    }

    pub fn has_visible_rules(&self, current: Option<BodyId>) -> bool {
        self.rules.visible(&self.scopes, current).next().is_some()
    }

    // === Scope masking ===

    /// Mark every entry owned by `body` out of scope.
    pub fn clear_scope(&mut self, body: BodyId) {
        self.variables.clear_scope(body);
        self.functions.clear_scope(body);
        self.typedata.clear_scope(body);
        self.composites.clear_scope(body);
        self.rules.clear_scope(body);
    }

    /// Mark the most recent visible entry named `name` out of scope,
    /// whichever table holds it.
    pub fn undefine(&mut self, name: &Name, current: Option<BodyId>) -> Option<SymbolKind> {
        let (kind, index, _) = self.resolve_any(name, current)?;
        match kind {
            SymbolKind::Variable => self.variables.mark_out_of_scope(VarId::from_index(index)),
            SymbolKind::Function => self
                .functions
                .mark_out_of_scope(FunctionId::from_index(index)),
            SymbolKind::Typedata => self
                .typedata
                .mark_out_of_scope(TypedataId::from_index(index)),
            SymbolKind::Composite => self
                .composites
                .mark_out_of_scope(CompId::from_index(index)),
        }
        Some(kind)
    }
}

#[cfg(test)]
mod tests;
