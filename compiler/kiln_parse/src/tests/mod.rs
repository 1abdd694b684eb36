//! Parser scenario tests.
//!
//! Tests lex real source through `kiln_lexer` and are organized by area:
//! - `parser`: statements, declarations, expressions and scoping
//! - `syntax`: rule matching, expansion, chaining and the meta built-ins
//! - `static_eval`: static functions, static control flow and limits

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod parser;
mod static_eval;
mod syntax;

use kiln_diagnostic::ErrorKind;
use kiln_ir::FileId;

use crate::value::Value;
use crate::{parse, ParseOutput, ParserConfig};

pub(crate) fn parse_source(source: &str) -> ParseOutput {
    parse_with(source, ParserConfig::default())
}

pub(crate) fn parse_with(source: &str, config: ParserConfig) -> ParseOutput {
    let tokens = kiln_lexer::lex(source, FileId(0)).unwrap();
    parse(tokens, config)
}

/// Kinds of the fatal diagnostics, in report order.
pub(crate) fn errors(output: &ParseOutput) -> Vec<ErrorKind> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.fatal)
        .map(|d| d.kind)
        .collect()
}

pub(crate) fn warnings(output: &ParseOutput) -> Vec<ErrorKind> {
    output
        .diagnostics
        .iter()
        .filter(|d| !d.fatal)
        .map(|d| d.kind)
        .collect()
}

/// Value of the most recent static variable spelled `name`.
pub(crate) fn static_value<'a>(output: &'a ParseOutput, name: &str) -> Option<&'a Value> {
    output
        .tables
        .variables
        .iter()
        .filter(|(_, entry)| entry.value.name.matches(name))
        .filter_map(|(_, entry)| entry.value.known_value())
        .last()
}

/// Parse `source`, assert it is clean and return the static `name`.
pub(crate) fn eval_static(source: &str, name: &str) -> Value {
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![], "unexpected errors in {source:?}");
    static_value(&output, name)
        .cloned()
        .unwrap_or_else(|| panic!("no static `{name}` in {source:?}"))
}
