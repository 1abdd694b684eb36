//! The `check` and `dump` commands.

use std::process::ExitCode;

use kiln_diagnostic::emitter;
use kiln_ir::SourceMap;
use kiln_parse::ParseOutput;

use super::{parse_source, read_file, report, status, stderr_is_tty};
use crate::CliOptions;

/// Parse a file, report every diagnostic and fail on errors.
pub fn check_file(options: &CliOptions) -> ExitCode {
    let Some(output) = run(options) else {
        return ExitCode::FAILURE;
    };
    if output.has_errors() {
        return ExitCode::FAILURE;
    }
    let functions = output
        .tables
        .functions
        .iter()
        .filter(|(_, entry)| !entry.value.is_static)
        .count();
    println!(
        "OK: {} ({} statements, {functions} functions)",
        options.path,
        output.statements.len()
    );
    ExitCode::SUCCESS
}

/// Parse a file and print the module handed to code generation.
pub fn dump_file(options: &CliOptions) -> ExitCode {
    let Some(output) = run(options) else {
        return ExitCode::FAILURE;
    };
    let failed = output.has_errors();
    match output.into_module() {
        Some(module) => {
            print!("{module}");
            status(!failed)
        }
        None => ExitCode::FAILURE,
    }
}

/// Read, lex and parse, reporting diagnostics. `None` when the file
/// could not be read or tokenized.
fn run(options: &CliOptions) -> Option<ParseOutput> {
    let path = options.path.as_str();
    let content = read_file(path)?;
    let mut sources = SourceMap::new();
    let file = sources.add(path, content.as_str());
    let mut emitter = emitter::stderr(&sources, options.color, stderr_is_tty());

    let _span = tracing::debug_span!("check", path).entered();
    match parse_source(&content, file, options.config.clone()) {
        Ok(output) => {
            report(&mut emitter, &output.diagnostics);
            Some(output)
        }
        Err(diagnostic) => {
            report(&mut emitter, &[diagnostic]);
            None
        }
    }
}
