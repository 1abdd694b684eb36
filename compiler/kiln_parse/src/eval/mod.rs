//! Compile-time evaluator.
//!
//! Folding of operators on static operands lives in [`operators`]; the
//! statement interpreter that runs static function bodies is an
//! extension of the parser (`interp`), because evaluation and parsing
//! call each other: a static call prepares its body lazily, and a body
//! may itself call built-ins that touch the symbol tables.

mod interp;
pub mod operators;

use std::fmt;

pub use operators::{fold_binary, fold_unary, FoldError};

/// Meta built-ins callable by name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Builtin {
    /// `error(message)`: abort the parse with a user message.
    Error,
    /// `defined(name)`: whether `name` resolves in any table.
    Defined,
    /// `undefine(name)`: mask the most recent entry named `name`.
    Undefine,
    /// `length(array)`: element count of a static array.
    Length,
    /// `get_statements(function)`: the function body as statement values.
    GetStatements,
    /// `insert(values)`: splice statement or token values.
    Insert,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "error" => Builtin::Error,
            "defined" => Builtin::Defined,
            "undefine" => Builtin::Undefine,
            "length" => Builtin::Length,
            "get_statements" => Builtin::GetStatements,
            "insert" => Builtin::Insert,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Error => "error",
            Builtin::Defined => "defined",
            Builtin::Undefine => "undefine",
            Builtin::Length => "length",
            Builtin::GetStatements => "get_statements",
            Builtin::Insert => "insert",
        }
    }

    /// Built-ins that only make sense while a syntax rule expands.
    pub fn syntax_only(self) -> bool {
        matches!(self, Builtin::GetStatements | Builtin::Insert)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
