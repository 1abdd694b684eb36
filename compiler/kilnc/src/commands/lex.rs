//! The `lex` command: dump the token stream.

use std::process::ExitCode;

use kiln_diagnostic::emitter;
use kiln_ir::SourceMap;

use super::{read_file, report, stderr_is_tty};
use crate::CliOptions;

pub fn lex_file(options: &CliOptions) -> ExitCode {
    let path = options.path.as_str();
    let Some(content) = read_file(path) else {
        return ExitCode::FAILURE;
    };
    let mut sources = SourceMap::new();
    let file = sources.add(path, content.as_str());

    match kiln_lexer::lex(&content, file) {
        Ok(tokens) => {
            println!("Tokens for '{}' ({} tokens):", path, tokens.len());
            for token in tokens.iter() {
                println!("  {:?} `{token}` @ {}", token.kind, sources.describe(token.span));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut emitter = emitter::stderr(&sources, options.color, stderr_is_tty());
            report(&mut emitter, &[err.to_diagnostic()]);
            ExitCode::FAILURE
        }
    }
}
