use std::fmt;

/// Proof that a fatal diagnostic was recorded.
///
/// Only [`DiagnosticSink`](crate::DiagnosticSink) can mint one, so a
/// function returning `Err(Fatal)` has necessarily reported why it
/// failed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Fatal(());

impl Fatal {
    pub(crate) fn new() -> Self {
        Fatal(())
    }

    /// Recover the proof from a sink's criticality flag.
    pub fn from_critical(critical: bool) -> Option<Self> {
        critical.then(Fatal::new)
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fatal error emitted")
    }
}

#[cfg(test)]
mod tests;
