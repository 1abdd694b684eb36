use std::fmt;

use kiln_ir::Span;

use crate::ErrorKind;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A secondary labeled span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// One error record: kind, message, location and criticality.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    /// Primary location.
    pub span: Span,
    /// Fatal diagnostics abort the parse.
    pub fatal: bool,
    /// Related locations.
    pub labels: Vec<Label>,
    /// Additional context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default message and criticality.
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Diagnostic {
            kind,
            message: kind.description().to_string(),
            span,
            fatal: kind.is_fatal(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a secondary label for context.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Downgrade to a recoverable diagnostic.
    pub fn recoverable(mut self) -> Self {
        self.fatal = false;
        self
    }

    pub fn severity(&self) -> Severity {
        if self.fatal {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// Check if this is a hard error that speculation cannot discard.
    pub fn is_hard(&self) -> bool {
        self.fatal && self.kind.is_hard()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity(), self.kind, self.message)?;
        write!(f, "\n  --> {:?}", self.span)?;
        for label in &self.labels {
            write!(f, "\n      {:?}: {}", label.span, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}
