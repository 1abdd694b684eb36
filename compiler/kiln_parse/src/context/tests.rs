use super::*;

#[test]
fn test_default_context() {
    let ctx = ParseContext::new();
    assert_eq!(ctx, ParseContext::NONE);
    assert!(!ctx.in_function());
    assert!(!ctx.in_loop());
    assert!(!ctx.in_syntax_body());
    assert!(!ctx.defers_effects());
}

#[test]
fn test_with_and_without() {
    let ctx = ParseContext::new()
        .with(ParseContext::IN_LOOP)
        .with(ParseContext::IN_SYNTAX_BODY);
    assert!(ctx.in_loop());
    assert!(ctx.in_syntax_body());

    let ctx = ctx.without(ParseContext::IN_LOOP);
    assert!(!ctx.in_loop());
    assert!(ctx.in_syntax_body());
}

#[test]
fn test_function_scoped_flags_cleared_together() {
    let ctx = ParseContext::new()
        .with(ParseContext::IN_FUNCTION)
        .with(ParseContext::IN_STATIC_LOOP)
        .with(ParseContext::DEFER_EFFECTS)
        .with(ParseContext::IN_SYNTAX_BODY);

    let ctx = ctx.without(ParseContext::FUNCTION_SCOPED);
    assert!(!ctx.in_function());
    assert!(!ctx.in_static_loop());
    assert!(!ctx.defers_effects());
    assert!(ctx.in_syntax_body());
}

#[test]
fn test_union() {
    let combined = ParseContext::IN_FUNCTION.union(ParseContext::IN_LOOP);
    assert!(combined.in_function());
    assert!(combined.in_loop());
    assert!(!combined.in_static_loop());
}

#[test]
fn test_runtime_branch_is_function_scoped() {
    let ctx = ParseContext::IN_SYNTAX_BODY.with(ParseContext::RUNTIME_BRANCH);
    assert!(ctx.in_runtime_branch());
    assert!(!ctx.without(ParseContext::FUNCTION_SCOPED).in_runtime_branch());
}
