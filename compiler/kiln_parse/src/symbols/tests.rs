#![allow(clippy::unwrap_used)]

use kiln_ir::{Name, Span};
use kiln_types::Type;
use pretty_assertions::assert_eq;

use super::*;
use crate::value::Value;

fn name(text: &str) -> Name {
    Name::new(text, Span::DUMMY)
}

fn var(text: &str) -> Variable {
    Variable::new(name(text), Type::integer())
}

#[test]
fn test_global_entries_visible_everywhere() {
    let mut tables = SymbolTables::new(None);
    let body = tables.new_body(None).unwrap();
    let id = tables.define_variable(var("x"), None).unwrap();

    assert_eq!(tables.find_variable(&name("x"), None), Some(id));
    assert_eq!(tables.find_variable(&name("x"), Some(body)), Some(id));
}

#[test]
fn test_body_entries_visible_from_descendants_only() {
    let mut tables = SymbolTables::new(None);
    let outer = tables.new_body(None).unwrap();
    let inner = tables.new_body(Some(outer)).unwrap();
    let sibling = tables.new_body(Some(outer)).unwrap();
    tables.define_variable(var("x"), Some(inner)).unwrap();

    assert!(tables.is_variable_defined(&name("x"), Some(inner)));
    assert!(!tables.is_variable_defined(&name("x"), Some(outer)));
    assert!(!tables.is_variable_defined(&name("x"), Some(sibling)));
    assert!(!tables.is_variable_defined(&name("x"), None));
}

#[test]
fn test_recency_shadowing() {
    let mut tables = SymbolTables::new(None);
    let body = tables.new_body(None).unwrap();
    let outer = tables.define_variable(var("x"), None).unwrap();
    let inner = tables.define_variable(var("x"), Some(body)).unwrap();

    assert_eq!(tables.find_variable(&name("x"), Some(body)), Some(inner));
    assert_eq!(tables.find_variable(&name("x"), None), Some(outer));
}

#[test]
fn test_clear_scope_masks_without_removing() {
    let mut tables = SymbolTables::new(None);
    let body = tables.new_body(None).unwrap();
    let id = tables.define_variable(var("x"), Some(body)).unwrap();
    tables.clear_scope(body);

    assert!(!tables.is_variable_defined(&name("x"), Some(body)));
    assert_eq!(tables.variables.len(), 1);
    assert!(tables.variables.entry(id).out_of_scope);
}

#[test]
fn test_clear_scope_only_touches_exact_body() {
    let mut tables = SymbolTables::new(None);
    let outer = tables.new_body(None).unwrap();
    let inner = tables.new_body(Some(outer)).unwrap();
    tables.define_variable(var("a"), Some(outer)).unwrap();
    tables.define_variable(var("b"), Some(inner)).unwrap();
    tables.clear_scope(inner);

    assert!(tables.is_variable_defined(&name("a"), Some(inner)));
    assert!(!tables.is_variable_defined(&name("b"), Some(inner)));
}

#[test]
fn test_fresh_bodies_do_not_alias() {
    let mut tables = SymbolTables::new(None);
    let first = tables.new_body(None).unwrap();
    let second = tables.new_body(None).unwrap();
    let mut x = var("x");
    x.binding = Binding::Known(Value::Int(1));
    let outer = tables.define_variable(x, Some(first)).unwrap();
    let mut x = var("x");
    x.binding = Binding::Known(Value::Int(2));
    tables.define_variable(x, Some(second)).unwrap();
    tables.clear_scope(second);

    let found = tables.find_variable(&name("x"), Some(first)).unwrap();
    assert_eq!(found, outer);
    assert_eq!(
        tables.variables.get(found).known_value(),
        Some(&Value::Int(1))
    );
}

#[test]
fn test_undefine_picks_most_recent_table() {
    let mut tables = SymbolTables::new(None);
    tables.define_variable(var("f"), None).unwrap();
    tables
        .define_typedata(
            Typedata {
                name: name("f"),
                members: Vec::new(),
            },
            None,
        )
        .unwrap();

    assert_eq!(tables.undefine(&name("f"), None), Some(SymbolKind::Typedata));
    assert!(tables.find_typedata(&name("f"), None).is_none());
    assert!(tables.is_variable_defined(&name("f"), None));
    assert_eq!(tables.undefine(&name("f"), None), Some(SymbolKind::Variable));
    assert!(!tables.is_defined(&name("f"), None));
    assert_eq!(tables.undefine(&name("f"), None), None);
}

#[test]
fn test_anonymous_names_are_distinct() {
    let mut tables = SymbolTables::new(None);
    tables.define_variable(var("$tmp"), None).unwrap();

    assert!(tables.is_variable_defined(&name("$tmp"), None));
    assert!(!tables.is_variable_defined(&name("tmp"), None));
}

#[test]
fn test_entry_limit() {
    let mut tables = SymbolTables::new(Some(2));
    tables.define_variable(var("a"), None).unwrap();
    tables.define_variable(var("b"), None).unwrap();

    assert_eq!(
        tables.define_variable(var("c"), None),
        Err(TableError::LimitReached { limit: 2 })
    );
}

#[test]
fn test_variable_in_body_is_exact() {
    let mut tables = SymbolTables::new(None);
    let outer = tables.new_body(None).unwrap();
    let inner = tables.new_body(Some(outer)).unwrap();
    tables.define_variable(var("x"), Some(outer)).unwrap();

    assert!(tables.variable_in_body(&name("x"), Some(outer)).is_some());
    assert!(tables.variable_in_body(&name("x"), Some(inner)).is_none());
}

#[test]
fn test_visible_rules_most_recent_first() {
    use crate::cursor::DeferredRange;
    use std::rc::Rc;

    let mut tables = SymbolTables::new(None);
    let rule = || SyntaxRule {
        nodes: Rc::from(Vec::new()),
        body: DeferredRange::from_tokens(Vec::new()),
        span: Span::DUMMY,
    };
    let first = tables.define_rule(rule(), None).unwrap();
    let second = tables.define_rule(rule(), None).unwrap();

    assert_eq!(tables.visible_rules(None), vec![second, first]);
}
