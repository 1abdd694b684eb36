//! Kiln front-end driver.
//!
//! The binary is a thin dispatcher over [`commands`]; option parsing and
//! logging setup live here so they can be tested without a process.

pub mod commands;
mod options;

use std::sync::Once;

pub use options::{CliOptions, OptionError};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Call this once at startup. Safe to call multiple times. Output is
/// enabled only when `RUST_LOG` is set, e.g. `RUST_LOG=kiln_parse=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
