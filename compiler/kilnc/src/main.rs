//! Kiln front-end CLI.

use std::process::ExitCode;

use kilnc::commands::{check_file, dump_file, lex_file};
use kilnc::CliOptions;

fn main() -> ExitCode {
    kilnc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let Some(command) = args.get(1) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let run: fn(&CliOptions) -> ExitCode = match command.as_str() {
        "lex" => lex_file,
        "check" => check_file,
        "dump" => dump_file,
        "help" | "--help" | "-h" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "version" | "--version" | "-V" => {
            println!("kiln {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match CliOptions::parse(&args[2..]) {
        Ok(options) => run(&options),
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Usage: kiln {command} <file.kn> [options]");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("Kiln front end");
    println!();
    println!("Usage: kiln <command> <file.kn> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file>      Tokenize and display tokens");
    println!("  check <file>    Parse, expand and evaluate; report diagnostics");
    println!("  dump <file>     Print the module handed to code generation");
    println!("  help            Show this help message");
    println!("  version         Show version information");
    println!();
    println!("Options:");
    println!("  --max-macro-depth=<n>        Nested macro expansions (default 64)");
    println!("  --max-eval-depth=<n>         Nested static calls (default 256)");
    println!("  --max-static-iterations=<n>  Static loop iterations (default 10000)");
    println!("  --entry-limit=<n>            Cap on symbol table entries");
    println!("  --color=<when>               auto, always or never");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=kiln_parse=debug) for tracing output.");
}
