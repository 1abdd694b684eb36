#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::tests::parse_source;

fn export(source: &str) -> Module {
    let output = parse_source(source);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    output.into_module().unwrap()
}

fn declared_names(stmts: &[Stmt]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::VarDecl { name, .. } => names.push(name.spelling()),
            StmtKind::Block { stmts, .. } => names.extend(declared_names(stmts)),
            _ => {}
        }
    }
    names
}

#[test]
fn repeated_expansions_get_distinct_names() {
    let module = export(
        "syntax make_temp [v: integer] { integer $tmp = v; } \
         void main() { make_temp 1; make_temp 2; }",
    );
    let main = module
        .functions
        .iter()
        .find(|function| function.name.matches("main"))
        .unwrap();
    let names = declared_names(main.body.as_deref().unwrap());
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
    assert!(names.iter().all(|name| name.starts_with("tmp__")));

    let rendered = module.to_string();
    assert!(rendered.contains("integer tmp__"), "{rendered}");
    assert!(!rendered.contains('$'), "{rendered}");
}

#[test]
fn references_follow_their_declaration() {
    let module = export("integer $x = 1; $x = $x + 1;");
    let decl = declared_names(&module.statements);
    assert_eq!(decl.len(), 1);
    let StmtKind::Assign { target, .. } = &module.statements[1].kind else {
        panic!("expected an assignment, found {:?}", module.statements[1].kind);
    };
    let ExprKind::Var(var_ref) = &target.kind else {
        panic!("assignment target is not a variable");
    };
    assert_eq!(var_ref.name.spelling(), decl[0]);
}

#[test]
fn static_only_entities_stay_behind() {
    let module = export(
        "static integer helper(integer n) { return n; } \
         static integer k = helper(2); \
         comp static numberish { integer, double } \
         comp runtime_num { integer, double } \
         integer kept;",
    );
    assert!(module.functions.is_empty());
    assert_eq!(module.composites.len(), 1);
    assert!(module.composites[0].name.matches("runtime_num"));
    let variables: Vec<String> = module
        .variables
        .iter()
        .map(|variable| variable.name.spelling())
        .collect();
    assert_eq!(variables, vec!["kept"]);
}

#[test]
fn builtin_typedata_is_not_exported() {
    let module = export("typedata pair { integer a; integer b; }");
    let names: Vec<String> = module
        .typedata
        .iter()
        .map(|typedata| typedata.name.spelling())
        .collect();
    assert_eq!(names, vec!["pair"]);
}

#[test]
fn anonymous_typedata_is_renamed_everywhere() {
    let module = export("typedata $cell { integer v; } $cell c;");
    let typedata = &module.typedata[0];
    assert!(typedata.name.text.starts_with("cell__t"));
    let ty = module
        .statements
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::VarDecl { ty, .. } => Some(ty),
            _ => None,
        })
        .unwrap();
    assert_eq!(ty.to_string(), typedata.name.text);
}

#[test]
fn out_of_scope_variables_are_not_exported() {
    let module = export("integer a; { integer b; } integer c; undefine(c);");
    let variables: Vec<String> = module
        .variables
        .iter()
        .map(|variable| variable.name.spelling())
        .collect();
    assert_eq!(variables, vec!["a"]);
}

#[test]
fn renders_functions_and_control_flow() {
    let module = export(
        "integer add(integer a, integer b) { if (a) { return a + b; } return b; }",
    );
    let rendered = module.to_string();
    assert!(rendered.contains("integer add(integer a, integer b) {"), "{rendered}");
    assert!(rendered.contains("return a + b;"), "{rendered}");
}

#[test]
fn function_name_lookup() {
    let module = export("void f(); void g() { f(); }");
    let f = module.functions[0].id;
    assert!(module.function_name(f).unwrap().matches("f"));
}
