use kiln_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{ExprKind, Stmt, StmtKind};
use crate::symbols::FunctionBody;

const PLUS: &str = "syntax [a: integer] plus [b: integer] { return a + b; }";
const PLUS_TIMES: &str =
    "syntax [a: integer] plus [b: integer] times [c: integer] { return (a + b) * c; }";

#[test]
fn infix_rule_expands_to_its_value() {
    let source = format!("{PLUS} static integer x = 3 plus 4;");
    assert_eq!(eval_static(&source, "x"), Value::Int(7));
}

#[test]
fn longest_match_wins_in_either_order() {
    for rules in [format!("{PLUS} {PLUS_TIMES}"), format!("{PLUS_TIMES} {PLUS}")] {
        let source = format!("{rules} static integer long = 1 plus 2 times 3;");
        assert_eq!(eval_static(&source, "long"), Value::Int(9), "{rules}");
        let source = format!("{rules} static integer short = 1 plus 2;");
        assert_eq!(eval_static(&source, "short"), Value::Int(3), "{rules}");
    }
}

#[test]
fn expansion_results_chain_into_further_matches() {
    let source = format!("{PLUS} static integer x = 1 plus 2 plus 3;");
    assert_eq!(eval_static(&source, "x"), Value::Int(6));
}

#[test]
fn recursive_rule_terminates_on_static_branch() {
    let source = "syntax sum [n: integer] { if (n == 0) { return 0; } return n + sum (n - 1); } \
                  static integer s = sum 3;";
    assert_eq!(eval_static(source, "s"), Value::Int(6));
}

#[test]
fn nested_expansions_keep_separate_captures() {
    let source = "syntax twice [v: integer] { return v * 2; } \
                  static integer a = twice 2; \
                  static integer b = twice 5; \
                  static integer c = twice (twice 3);";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![]);
    assert_eq!(static_value(&output, "a"), Some(&Value::Int(4)));
    assert_eq!(static_value(&output, "b"), Some(&Value::Int(10)));
    assert_eq!(static_value(&output, "c"), Some(&Value::Int(12)));
}

#[test]
fn recursive_expansion_keeps_its_capture_after_the_inner_one_returns() {
    let source = "syntax digits [n: integer] { \
                      if (n == 0) { return 0; } \
                      static integer inner = digits (n - 1); \
                      return inner * 10 + n; \
                  } \
                  static integer d = digits 3;";
    assert_eq!(eval_static(source, "d"), Value::Int(123));
}

#[test]
fn declarations_inside_an_expansion_are_masked_not_removed() {
    let output = parse_source("syntax make { static integer inside = 5; } make;");
    assert_eq!(errors(&output), vec![]);
    let rows: Vec<_> = output
        .tables
        .variables
        .iter()
        .filter(|(_, entry)| entry.value.name.matches("inside"))
        .collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].1.out_of_scope);
    let name = kiln_ir::Name::new("inside", kiln_ir::Span::DUMMY);
    assert!(!output.tables.is_variable_defined(&name, None));

    let output = parse_source("syntax make { static integer inside = 5; } make; static integer after = inside;");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
}

#[test]
fn captures_do_not_leak_past_expansion() {
    let source = format!("{PLUS} static integer x = 1 plus 2; static integer y = a;");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
}

#[test]
fn rule_declared_in_block_goes_out_of_scope() {
    let source = "{ syntax one { return 1; } static integer inner = one; } \
                  static integer outer = one;";
    let output = parse_source(source);
    assert_eq!(static_value(&output, "inner"), Some(&Value::Int(1)));
    assert_eq!(errors(&output), vec![ErrorKind::UnknownVariable]);
}

#[test]
fn incomplete_match_is_unknown_syntax() {
    let source = format!("{PLUS} static integer y = 1 plus;");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![ErrorKind::UnknownSyntax]);
    assert!(output.is_critical());
}

#[test]
fn rule_needs_a_literal_token() {
    let output = parse_source("syntax [a: integer] { return a; }");
    assert_eq!(errors(&output), vec![ErrorKind::UnknownSyntax]);
}

#[test]
fn runaway_expansion_hits_macro_depth() {
    let source = "syntax forever [v: integer] { return forever v; } static integer x = forever 1;";
    let output = parse_with(source, ParserConfig::default().with_max_macro_depth(8));
    assert_eq!(errors(&output), vec![ErrorKind::MaxMacroDepth]);
    assert!(output.is_critical());
}

#[test]
fn error_builtin_raises_user_error() {
    let source = "syntax must_be_positive [v: integer] { \
                      if (v <= 0) { error(\"value must be positive\"); } \
                      return v; \
                  } \
                  static integer ok = must_be_positive 3; \
                  static integer bad = must_be_positive 0;";
    let output = parse_source(source);
    assert_eq!(static_value(&output, "ok"), Some(&Value::Int(3)));
    assert_eq!(errors(&output), vec![ErrorKind::UserError]);
    let fatal = output.diagnostics.iter().find(|d| d.fatal).unwrap();
    assert_eq!(fatal.message, "value must be positive");
}

#[test]
fn errors_inside_an_expansion_point_at_the_call_site() {
    let source = "syntax must_be_positive [v: integer] { \
                      if (v <= 0) { error(\"value must be positive\"); } \
                      return v; \
                  } \
                  static integer bad = must_be_positive 0;";
    let output = parse_source(source);
    let fatal = output.diagnostics.iter().find(|d| d.fatal).unwrap();
    assert_eq!(fatal.labels.len(), 1);
    assert_eq!(
        fatal.labels[0].message,
        "in this expansion of `must_be_positive` [v: integer]"
    );
    let call = source.find("must_be_positive 0").unwrap();
    assert_eq!(fatal.labels[0].span.start as usize, call);

    let output = parse_source("integer a = b;");
    assert!(output.diagnostics.iter().all(|d| d.labels.is_empty()));
}

#[test]
fn statement_rule_inserts_quoted_tokens() {
    let source = "syntax declare_answer { insert(quote { static integer answer = 42; }); } \
                  declare_answer; \
                  static integer copy = answer;";
    assert_eq!(eval_static(source, "copy"), Value::Int(42));
}

#[test]
fn variadic_capture_collects_raw_tokens() {
    let source = "syntax twice_do [body ... end] end { insert(body); insert(body); } \
                  static integer n = 0; \
                  twice_do n = n + 1; end";
    assert_eq!(eval_static(source, "n"), Value::Int(2));
}

#[test]
fn word_capture_names_a_symbol() {
    let source = "syntax forget [w: word] { undefine(w); } \
                  integer gone; \
                  forget gone; \
                  static integer still = defined(gone);";
    assert_eq!(eval_static(source, "still"), Value::Int(0));
}

#[test]
fn runtime_capture_stands_for_its_expression() {
    let source = format!("{PLUS} integer r; integer s = r plus 1;");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![]);
    let init = output
        .statements
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::VarDecl { name, init, .. } if name.matches("s") => init.clone(),
            _ => None,
        })
        .unwrap();
    assert!(matches!(init.kind, ExprKind::Binary { .. }));
}

/// Statements of a parsed function, groups flattened.
fn function_body(output: &ParseOutput, name: &str) -> Vec<Stmt> {
    let (_, entry) = output
        .tables
        .functions
        .iter()
        .find(|(_, entry)| entry.value.name.matches(name))
        .unwrap();
    let FunctionBody::Parsed(stmts) = &entry.value.body else {
        panic!("`{name}` has no parsed body");
    };
    let mut flat = Vec::new();
    flatten(stmts, &mut flat);
    flat
}

fn flatten(stmts: &[Stmt], out: &mut Vec<Stmt>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Block { body: None, stmts } => flatten(stmts, out),
            StmtKind::Inserted(inner) => flatten(std::slice::from_ref(inner.as_ref()), out),
            _ => out.push(stmt.clone()),
        }
    }
}

#[test]
fn get_statements_inlines_a_function_body() {
    let source = "integer counter = 0; \
                  void body_src() { integer local = 5; counter = local; } \
                  syntax inline_body [f: any] { insert(get_statements(f)); } \
                  void main() { inline_body body_src; local = local + 1; }";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![]);

    let body = function_body(&output, "main");
    assert_eq!(body.len(), 3);
    let StmtKind::VarDecl { var: local, .. } = &body[0].kind else {
        panic!("expected the inlined declaration first, found {:?}", body[0].kind);
    };
    let StmtKind::Assign { target, .. } = &body[2].kind else {
        panic!("expected the trailing assignment, found {:?}", body[2].kind);
    };
    let ExprKind::Var(target) = &target.kind else {
        panic!("assignment target is not a variable");
    };
    assert_eq!(target.var, *local);

    // The source function keeps its own local.
    let source_body = function_body(&output, "body_src");
    let StmtKind::VarDecl { var: original, .. } = &source_body[0].kind else {
        panic!("expected a declaration");
    };
    assert_ne!(original, local);
}

#[test]
fn statements_without_declarations_are_spliced_shared() {
    let source = "void body_src() { body_src(); } \
                  syntax inline_body [f: any] { insert(get_statements(f)); } \
                  void main() { inline_body body_src; }";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![]);
    let (_, entry) = output
        .tables
        .functions
        .iter()
        .find(|(_, entry)| entry.value.name.matches("main"))
        .unwrap();
    let FunctionBody::Parsed(stmts) = &entry.value.body else {
        panic!("`main` has no parsed body");
    };
    assert_eq!(stmts.len(), 1);
    let StmtKind::Inserted(inner) = &stmts[0].kind else {
        panic!("expected a shared statement, found {:?}", stmts[0].kind);
    };
    assert!(matches!(&inner.kind, StmtKind::Expr(call) if matches!(call.kind, ExprKind::Call { .. })));
}

#[test]
fn get_statements_needs_a_definition() {
    let source = "void proto(); \
                  syntax inline_body [f: any] { insert(get_statements(f)); } \
                  void main() { inline_body proto; }";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![ErrorKind::IncorrectType]);
}

#[test]
fn insert_rejects_other_arrays() {
    let source = "syntax bad { insert([1, 2]); } bad;";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![ErrorKind::IncorrectType]);
}
