//! Command implementations.
//!
//! Every command reads one file, runs as much of the front end as it
//! needs and reports diagnostics through the terminal emitter. The
//! return value is the process exit status.

mod check;
mod lex;

pub use check::{check_file, dump_file};
pub use lex::lex_file;

use std::process::ExitCode;

use kiln_diagnostic::emitter::DiagnosticEmitter;
use kiln_diagnostic::Diagnostic;
use kiln_ir::FileId;
use kiln_parse::{ParseOutput, ParserConfig};

/// Read a source file, describing the failure on stderr.
pub(crate) fn read_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("error: {msg}");
            None
        }
    }
}

/// Lex and parse `text`. A tokenizer failure comes back as its
/// diagnostic; parser diagnostics stay in the output.
pub fn parse_source(text: &str, file: FileId, config: ParserConfig) -> Result<ParseOutput, Diagnostic> {
    let tokens = kiln_lexer::lex(text, file).map_err(|err| err.to_diagnostic())?;
    tracing::debug!(tokens = tokens.len(), "lexed");
    Ok(kiln_parse::parse(tokens, config))
}

/// Emit `diagnostics` plus a summary line. Returns the error count.
pub fn report(emitter: &mut impl DiagnosticEmitter, diagnostics: &[Diagnostic]) -> usize {
    let errors = diagnostics.iter().filter(|d| d.fatal).count();
    let warnings = diagnostics.len() - errors;
    emitter.emit_all(diagnostics);
    emitter.emit_summary(errors, warnings);
    emitter.flush();
    errors
}

fn status(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn stderr_is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
