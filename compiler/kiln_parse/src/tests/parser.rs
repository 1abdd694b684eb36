use kiln_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::ast::StmtKind;

#[test]
fn runtime_declarations_produce_statements() {
    let output = parse_source("integer a = 1, b; double c;");
    assert_eq!(errors(&output), vec![]);
    let names: Vec<String> = output
        .statements
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::VarDecl { name, .. } => Some(name.spelling()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn static_declarations_fold_and_vanish() {
    let output = parse_source("static integer x = 2 * 3 + 1; static integer y = x * 2;");
    assert_eq!(errors(&output), vec![]);
    assert!(output.statements.is_empty());
    assert_eq!(static_value(&output, "x"), Some(&Value::Int(7)));
    assert_eq!(static_value(&output, "y"), Some(&Value::Int(14)));
}

#[test]
fn static_initializer_must_be_known() {
    let output = parse_source("integer a = 1; static integer b = a;");
    assert_eq!(errors(&output), vec![ErrorKind::MustBeStatic]);
    assert!(output.is_critical());
}

#[test]
fn runtime_initializer_of_other_type_is_not_static() {
    let output = parse_source("double d = 1.5; static integer b = d;");
    assert_eq!(errors(&output), vec![ErrorKind::MustBeStatic]);
}

#[test]
fn static_assignment_updates_binding() {
    let value = eval_static("static integer x = 1; x = x + 41;", "x");
    assert_eq!(value, Value::Int(42));
}

#[test]
fn block_scope_hides_its_variables() {
    let output = parse_source("{ integer x = 1; } x = 2;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
    assert!(output.is_critical());
    assert!(output.into_module().is_none());
}

#[test]
fn redeclaration_in_same_body_warns() {
    let output = parse_source("integer x; integer x;");
    assert_eq!(errors(&output), vec![]);
    assert_eq!(warnings(&output), vec![ErrorKind::Redefinition]);
    assert!(!output.is_critical());
}

#[test]
fn shadowing_in_nested_body_is_silent() {
    let output = parse_source("integer x; { integer x; }");
    assert_eq!(output.diagnostics.len(), 0);
}

#[test]
fn undefine_masks_and_defined_reports() {
    let value = eval_static(
        "integer y; static integer before = defined(y); undefine(y); static integer after = defined(y);",
        "before",
    );
    assert_eq!(value, Value::Int(1));

    let output = parse_source("integer y; undefine(y); static integer after = defined(y);");
    assert_eq!(static_value(&output, "after"), Some(&Value::Int(0)));

    let output = parse_source("integer y; undefine(y); y = 1;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
}

#[test]
fn undefine_reveals_shadowed_global() {
    let output = parse_source(
        "static integer v = 1; static integer v = 2; undefine(v); static integer seen = v;",
    );
    assert_eq!(errors(&output), vec![]);
    assert_eq!(static_value(&output, "seen"), Some(&Value::Int(1)));
}

#[test]
fn entry_limit_reports_out_of_memory() {
    // The two built-in typedata take the first entries.
    let output = parse_with(
        "integer a; integer b;",
        ParserConfig::default().with_entry_limit(3),
    );
    assert_eq!(errors(&output), vec![ErrorKind::OutOfMemory]);
    assert!(output.is_critical());
    assert!(output.into_module().is_none());
}

#[test]
fn runtime_function_is_parsed_eagerly() {
    let output = parse_source("integer add(integer a, integer b) { return a + b; }");
    assert_eq!(errors(&output), vec![]);
    let (_, entry) = output
        .tables
        .functions
        .iter()
        .find(|(_, entry)| entry.value.name.matches("add"))
        .unwrap();
    assert!(matches!(&entry.value.body, crate::FunctionBody::Parsed(stmts) if stmts.len() == 1));
    assert!(matches!(output.statements[0].kind, StmtKind::Function(_)));
}

#[test]
fn prototype_then_definition_shares_entry() {
    let output = parse_source(
        "integer add(integer a, integer b); integer add(integer a, integer b) { return a + b; }",
    );
    assert_eq!(errors(&output), vec![]);
    let count = output
        .tables
        .functions
        .iter()
        .filter(|(_, entry)| entry.value.name.matches("add"))
        .count();
    assert_eq!(count, 1);
    let functions = output
        .statements
        .iter()
        .filter(|stmt| matches!(stmt.kind, StmtKind::Function(_)))
        .count();
    assert_eq!(functions, 1);
}

#[test]
fn mismatched_prototype_is_an_error() {
    let output = parse_source("integer f(integer a); double f(integer a) { return 1.0; }");
    assert_eq!(errors(&output), vec![ErrorKind::IncorrectType]);
}

#[test]
fn return_outside_function_is_rejected() {
    let output = parse_source("return 1;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownStatement]);
}

#[test]
fn typedata_constructor_and_member() {
    let output = parse_source(
        "typedata point { integer x; integer y; } static point p = point(3, 4); static integer sum = p.x + p.y;",
    );
    assert_eq!(errors(&output), vec![]);
    assert_eq!(static_value(&output, "sum"), Some(&Value::Int(7)));
}

#[test]
fn unknown_member_is_reported() {
    let output = parse_source("typedata point { integer x; } point p; integer z = p.w;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownMember]);
}

#[test]
fn length_of_sized_array_folds() {
    let value = eval_static(
        "integer[3] items; static integer n = length(items);",
        "n",
    );
    assert_eq!(value, Value::Int(3));
}

#[test]
fn error_builtin_stops_the_parse() {
    let output = parse_source("error(\"stop here\"); integer never;");
    assert_eq!(errors(&output), vec![ErrorKind::UserError]);
    assert_eq!(output.diagnostics[0].message, "stop here");
    assert!(output.statements.is_empty());
}

#[test]
fn insert_outside_syntax_body_is_rejected() {
    let output = parse_source("insert(quote { integer a; });");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownFunction]);
}

#[test]
fn parse_stops_at_first_fatal_keeping_prior_statements() {
    let output = parse_source("integer a; b = 1; integer c;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
    assert_eq!(output.statements.len(), 1);
}

#[test]
fn character_token_must_be_one_ascii_byte() {
    let mut tokens = kiln_lexer::lex("static character c = 'a';", kiln_ir::FileId(0))
        .unwrap()
        .into_vec();
    for token in &mut tokens {
        if token.kind == kiln_ir::TokenKind::Char {
            token.text = "é".into();
        }
    }
    let output = crate::parse(tokens.into(), ParserConfig::default());
    assert_eq!(errors(&output), vec![ErrorKind::InvalidToken]);

    assert_eq!(eval_static("static character c = 'a';", "c"), Value::Char(b'a'));
}
