use super::*;
use crate::ErrorKind;
use kiln_ir::Span;
use pretty_assertions::assert_eq;

fn diag(kind: ErrorKind) -> Diagnostic {
    Diagnostic::new(kind, Span::DUMMY)
}

#[test]
fn test_recoverable_report_continues() {
    let mut sink = DiagnosticSink::new();
    assert!(sink.report(diag(ErrorKind::Redefinition)).is_ok());
    assert!(!sink.is_critical());
    assert_eq!(sink.warning_count(), 1);
}

#[test]
fn test_fatal_report_sets_critical() {
    let mut sink = DiagnosticSink::new();
    assert!(sink.report(diag(ErrorKind::UnknownVariable)).is_err());
    assert!(sink.is_critical());
    assert_eq!(sink.error_count(), 1);
}

#[test]
fn test_discard_restores_state() {
    let mut sink = DiagnosticSink::new();
    sink.warn(diag(ErrorKind::Redefinition));
    let mark = sink.mark();
    let _ = sink.error(diag(ErrorKind::UnknownExpression));
    assert!(sink.is_critical());
    assert!(sink.has_fatal_since(mark));
    assert!(!sink.has_hard_since(mark));

    sink.discard_since(mark);
    assert!(!sink.is_critical());
    assert_eq!(sink.diagnostics().len(), 1);
}

#[test]
fn test_hard_since_detects_exhaustion() {
    let mut sink = DiagnosticSink::new();
    let mark = sink.mark();
    let _ = sink.error(diag(ErrorKind::MaxMacroDepth));
    assert!(sink.has_hard_since(mark));
}

#[test]
fn test_take_since() {
    let mut sink = DiagnosticSink::new();
    let mark = sink.mark();
    let _ = sink.error(diag(ErrorKind::UnknownSyntax));
    let taken = sink.take_since(mark);
    assert_eq!(taken.len(), 1);
    assert!(sink.is_empty());
    assert!(!sink.is_critical());
}

#[test]
fn test_order_preserved() {
    let mut sink = DiagnosticSink::new();
    sink.warn(diag(ErrorKind::Redefinition));
    let _ = sink.error(diag(ErrorKind::UserError));
    let kinds: Vec<_> = sink.into_diagnostics().into_iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::Redefinition, ErrorKind::UserError]);
}
