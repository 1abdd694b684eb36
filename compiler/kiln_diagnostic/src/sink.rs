//! Ordered diagnostic collection with criticality tracking.
//!
//! The sink supports speculation: a caller takes a [`SinkMark`], tries a
//! parse path, and on giving up calls [`DiagnosticSink::discard_since`],
//! which drops everything reported in between and restores the
//! criticality flag. Hard diagnostics must not be discarded; callers
//! check [`DiagnosticSink::has_hard_since`] first.

use crate::{Diagnostic, Fatal};

/// Position in the sink captured before a speculative attempt.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SinkMark {
    len: usize,
    critical: bool,
}

/// Collects diagnostics in report order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    critical: bool,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, failing if it is fatal.
    pub fn report(&mut self, diagnostic: Diagnostic) -> Result<(), Fatal> {
        if diagnostic.fatal {
            Err(self.error(diagnostic))
        } else {
            self.diagnostics.push(diagnostic);
            Ok(())
        }
    }

    /// Record a diagnostic as fatal and mark the sink critical.
    pub fn error(&mut self, mut diagnostic: Diagnostic) -> Fatal {
        diagnostic.fatal = true;
        self.diagnostics.push(diagnostic);
        self.critical = true;
        Fatal::new()
    }

    /// Record a diagnostic as recoverable.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic.recoverable());
    }

    /// Whether a fatal diagnostic has been recorded (and not discarded).
    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn mark(&self) -> SinkMark {
        SinkMark {
            len: self.diagnostics.len(),
            critical: self.critical,
        }
    }

    /// Whether a hard diagnostic was reported after `mark`.
    pub fn has_hard_since(&self, mark: SinkMark) -> bool {
        self.diagnostics
            .get(mark.len..)
            .is_some_and(|recent| recent.iter().any(Diagnostic::is_hard))
    }

    /// Whether any fatal diagnostic was reported after `mark`.
    pub fn has_fatal_since(&self, mark: SinkMark) -> bool {
        self.diagnostics
            .get(mark.len..)
            .is_some_and(|recent| recent.iter().any(|d| d.fatal))
    }

    /// Drop everything reported after `mark` and restore criticality.
    pub fn discard_since(&mut self, mark: SinkMark) {
        self.diagnostics.truncate(mark.len);
        self.critical = mark.critical;
    }

    /// Remove and return everything reported after `mark`.
    pub fn take_since(&mut self, mark: SinkMark) -> Vec<Diagnostic> {
        let taken = self.diagnostics.split_off(mark.len.min(self.diagnostics.len()));
        self.critical = mark.critical;
        taken
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.fatal).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.fatal).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests;
