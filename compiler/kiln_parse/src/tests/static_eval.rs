use kiln_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::symbols::FunctionBody;

const FACT: &str =
    "static integer fact(integer n) { if (n <= 1) { return 1; } return n * fact(n - 1); }";

#[test]
fn static_function_runs_at_parse_time() {
    let source = format!("{FACT} static integer f = fact(5);");
    assert_eq!(eval_static(&source, "f"), Value::Int(120));
}

#[test]
fn static_body_is_parsed_on_first_call() {
    let output = parse_source(FACT);
    assert_eq!(errors(&output), vec![]);
    let (_, entry) = output.tables.functions.iter().next().unwrap();
    assert!(matches!(entry.value.body, FunctionBody::Deferred));

    let source = format!("{FACT} static integer f = fact(3);");
    let output = parse_source(&source);
    let (_, entry) = output.tables.functions.iter().next().unwrap();
    assert!(matches!(entry.value.body, FunctionBody::Parsed(_)));
}

#[test]
fn static_functions_never_reach_the_tree() {
    let source = format!("{FACT} static integer f = fact(2);");
    let output = parse_source(&source);
    assert!(output.statements.is_empty());
    let module = output.into_module().unwrap();
    assert!(module.functions.is_empty());
}

#[test]
fn missing_return_is_an_error() {
    let source = "static integer bad(integer n) { n = n + 1; } static integer r = bad(1);";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![ErrorKind::IncorrectType]);
}

#[test]
fn runtime_argument_is_rejected() {
    let source = format!("{FACT} integer k = 3; integer f = fact(k);");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![ErrorKind::IncorrectType]);
}

#[test]
fn logical_operators_evaluate_both_operands() {
    let boom = "static integer boom() { error(\"boom\"); return 1; }";

    let source = format!("{boom} static integer f() {{ return 0 && boom(); }} static integer r = f();");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![ErrorKind::UserError]);

    let source = format!("{boom} static integer f() {{ return 1 || boom(); }} static integer r = f();");
    let output = parse_source(&source);
    assert_eq!(errors(&output), vec![ErrorKind::UserError]);
}

#[test]
fn logical_operators_fold_to_zero_or_one() {
    let source = "static integer pick(integer a, integer b) { return a && b || 0; } \
                  static integer yes = pick(2, 3); static integer no = pick(2, 0);";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![]);
    assert_eq!(static_value(&output, "yes"), Some(&Value::Int(1)));
    assert_eq!(static_value(&output, "no"), Some(&Value::Int(0)));
}

#[test]
fn unbounded_recursion_hits_eval_depth() {
    let source = "static integer down(integer n) { return down(n + 1); } static integer x = down(0);";
    let output = parse_with(source, ParserConfig::default().with_max_eval_depth(16));
    assert_eq!(errors(&output), vec![ErrorKind::RecursionLimit]);
}

#[test]
fn static_loop_inside_function() {
    let source = "static integer sum_to(integer n) { \
                      integer total = 0; \
                      integer i = 1; \
                      while (i <= n) { total = total + i; i = i + 1; } \
                      return total; \
                  } \
                  static integer s = sum_to(10);";
    assert_eq!(eval_static(source, "s"), Value::Int(55));
}

#[test]
fn endless_static_loop_is_bounded() {
    let source = "static integer spin() { while (1) { } return 0; } static integer x = spin();";
    let output = parse_with(source, ParserConfig::default().with_max_static_iterations(100));
    assert_eq!(errors(&output), vec![ErrorKind::RecursionLimit]);
}

#[test]
fn static_function_reads_global_statics_when_called() {
    let source = "static integer base = 10; \
                  static integer offset(integer n) { return base + n; } \
                  base = 20; \
                  static integer r = offset(1);";
    assert_eq!(eval_static(source, "r"), Value::Int(21));
}

#[test]
fn static_division_by_zero() {
    let output = parse_source("static integer z = 1 / 0;");
    assert_eq!(errors(&output), vec![ErrorKind::DivisionByZero]);
}

#[test]
fn top_level_static_while_unrolls() {
    let source = "static integer i = 0; \
                  static integer total = 0; \
                  while (i < 4) { total = total + i; i = i + 1; }";
    assert_eq!(eval_static(source, "total"), Value::Int(6));
}

#[test]
fn static_break_leaves_unrolled_loop() {
    let source = "static integer i = 0; \
                  while (1) { if (i == 3) { break; } i = i + 1; }";
    assert_eq!(eval_static(source, "i"), Value::Int(3));
}

#[test]
fn static_if_discards_the_other_branch() {
    let source = "static integer pick = 0; \
                  if (1) { pick = 1; } else { pick = 2; } \
                  if (0) { this is not valid code ; }";
    let output = parse_source(source);
    assert_eq!(errors(&output), vec![]);
    assert_eq!(static_value(&output, "pick"), Some(&Value::Int(1)));
}

#[test]
fn runtime_if_keeps_both_branches() {
    let output = parse_source("integer c; integer x; if (c) { x = 1; } else { x = 2; }");
    assert_eq!(errors(&output), vec![]);
    assert!(matches!(
        output.statements.last().map(|stmt| &stmt.kind),
        Some(crate::ast::StmtKind::If { else_branch: Some(_), .. })
    ));
}

proptest! {
    #[test]
    fn integer_expressions_fold_like_rust(a in -1000i64..1000, b in -1000i64..1000, c in 1i64..100) {
        let source = format!("static integer r = ({a}) * ({b}) + ({a}) / {c} - ({b}) % {c};");
        let output = parse_source(&source);
        prop_assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let expected = a * b + a / c - b % c;
        prop_assert_eq!(static_value(&output, "r"), Some(&Value::Int(expected)));
    }

    #[test]
    fn folded_literals_reparse_to_the_same_value(
        a in -10_000i64..10_000,
        b in (-100i64..100).prop_filter("non-zero divisor", |b| *b != 0),
        op in prop::sample::select(vec!["+", "-", "*", "/"]),
    ) {
        let output = parse_source(&format!("static integer r = ({a}) {op} ({b});"));
        prop_assert!(!output.has_errors(), "{:?}", output.diagnostics);
        let expected = match op {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            _ => a / b,
        };
        let folded = static_value(&output, "r").cloned();
        prop_assert_eq!(folded.clone(), Some(Value::Int(expected)));

        let rendered = folded.as_ref().map(ToString::to_string).unwrap_or_default();
        let again = parse_source(&format!("static integer r = {rendered};"));
        prop_assert!(!again.has_errors(), "{:?}", again.diagnostics);
        prop_assert_eq!(static_value(&again, "r").cloned(), folded);
    }

    #[test]
    fn comparisons_fold_to_zero_or_one(a in -50i64..50, b in -50i64..50) {
        let source = format!("static integer lt = ({a}) < ({b}); static integer eq = ({a}) == ({b});");
        let output = parse_source(&source);
        prop_assert!(!output.has_errors());
        prop_assert_eq!(static_value(&output, "lt"), Some(&Value::Int(i64::from(a < b))));
        prop_assert_eq!(static_value(&output, "eq"), Some(&Value::Int(i64::from(a == b))));
    }
}
