//! Diagnostic helpers.

use kiln_diagnostic::{Diagnostic, ErrorKind, Fatal};
use kiln_ir::{Span, TokenKind};

use crate::symbols::TableError;
use crate::syntax::describe_pattern;
use crate::Parser;

impl Parser {
    /// Report a fatal diagnostic.
    pub(crate) fn fail(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) -> Fatal {
        let diagnostic = self.in_expansion(Diagnostic::new(kind, span).with_message(message));
        self.sink.error(diagnostic)
    }

    /// Report a recoverable diagnostic.
    pub(crate) fn warn(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) {
        let diagnostic = self.in_expansion(Diagnostic::new(kind, span).with_message(message));
        self.sink.warn(diagnostic);
    }

    /// Label the call site of the innermost active expansion.
    fn in_expansion(&self, diagnostic: Diagnostic) -> Diagnostic {
        match self.expansions.last() {
            Some(frame) if frame.call_span != diagnostic.span => {
                let pattern = describe_pattern(&self.tables.rules.get(frame.rule).nodes);
                diagnostic.with_label(frame.call_span, format!("in this expansion of {pattern}"))
            }
            _ => diagnostic,
        }
    }

    /// "expected X, found `Y`" at the current token.
    pub(crate) fn expected(&mut self, what: &str) -> Fatal {
        let found = match self.current_kind() {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.current()),
        };
        let span = self.current_span();
        self.fail(ErrorKind::ExpectedToken, span, format!("expected {what}, found {found}"))
    }

    /// Table growth failed.
    pub(crate) fn table_error(&mut self, err: TableError, span: Span) -> Fatal {
        self.fail(ErrorKind::OutOfMemory, span, err.to_string())
    }

    /// Re-report diagnostics taken out of the sink by a failed
    /// speculative attempt.
    pub(crate) fn reraise(&mut self, diagnostics: Vec<Diagnostic>, span: Span) -> Fatal {
        let mut fatal = None;
        for diagnostic in diagnostics {
            if diagnostic.fatal {
                fatal = Some(self.sink.error(diagnostic));
            } else {
                self.sink.warn(diagnostic);
            }
        }
        match fatal {
            Some(fatal) => fatal,
            None => self.fail(ErrorKind::UnknownExpression, span, "expected an expression"),
        }
    }
}
