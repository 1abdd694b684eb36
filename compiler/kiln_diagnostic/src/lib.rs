//! Diagnostic system for the Kiln front end.
//!
//! Every problem the parser, macro engine or evaluator finds is reported
//! as a [`Diagnostic`]: a kind with a stable code, a message, a primary
//! location and a `fatal` flag.
//!
//! # Criticality
//!
//! Fatal diagnostics abort the parse. The [`Fatal`] type is proof that a
//! fatal diagnostic was recorded in a [`DiagnosticSink`]; it can only be
//! obtained by reporting one, so `Result<T, Fatal>` plus `?` gives every
//! caller the mandatory check-and-unwind.
//!
//! ```text
//! let fatal = sink.error(diagnostic);       // records, sets critical
//! fn parse_expr(..) -> Result<Expr, Fatal>  // propagates with `?`
//! ```

mod diagnostic;
pub mod emitter;
mod error_kind;
mod guarantee;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_kind::ErrorKind;
pub use guarantee::Fatal;
pub use sink::{DiagnosticSink, SinkMark};
