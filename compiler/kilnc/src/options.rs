//! Command-line flags.

use kiln_diagnostic::emitter::ColorMode;
use kiln_parse::ParserConfig;

/// A flag that could not be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionError {
    Unknown(String),
    InvalidNumber { flag: &'static str, value: String },
    MissingPath,
}

impl std::fmt::Display for OptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionError::Unknown(flag) => write!(f, "unknown option '{flag}'"),
            OptionError::InvalidNumber { flag, value } => {
                write!(f, "'{value}' is not a valid number for --{flag}")
            }
            OptionError::MissingPath => f.write_str("missing file path"),
        }
    }
}

/// Options shared by every command that parses a file.
#[derive(Clone, Debug, PartialEq)]
pub struct CliOptions {
    pub path: String,
    pub config: ParserConfig,
    pub color: ColorMode,
}

impl CliOptions {
    /// Parse the arguments after the command name. The first non-flag
    /// argument is the input file; later ones are rejected.
    pub fn parse(args: &[String]) -> Result<Self, OptionError> {
        let mut path = None;
        let mut config = ParserConfig::default();
        let mut color = ColorMode::Auto;

        for arg in args {
            if let Some(value) = arg.strip_prefix("--max-macro-depth=") {
                config = config.with_max_macro_depth(number("max-macro-depth", value)?);
            } else if let Some(value) = arg.strip_prefix("--max-eval-depth=") {
                config = config.with_max_eval_depth(number("max-eval-depth", value)?);
            } else if let Some(value) = arg.strip_prefix("--max-static-iterations=") {
                config = config
                    .with_max_static_iterations(number("max-static-iterations", value)?);
            } else if let Some(value) = arg.strip_prefix("--entry-limit=") {
                config = config.with_entry_limit(number("entry-limit", value)?);
            } else if let Some(value) = arg.strip_prefix("--color=") {
                color = match value {
                    "auto" => ColorMode::Auto,
                    "always" => ColorMode::Always,
                    "never" => ColorMode::Never,
                    _ => return Err(OptionError::Unknown(arg.clone())),
                };
            } else if arg.starts_with('-') || path.is_some() {
                return Err(OptionError::Unknown(arg.clone()));
            } else {
                path = Some(arg.clone());
            }
        }

        Ok(CliOptions {
            path: path.ok_or(OptionError::MissingPath)?,
            config,
            color,
        })
    }
}

fn number(flag: &'static str, value: &str) -> Result<usize, OptionError> {
    value.parse().map_err(|_| OptionError::InvalidNumber {
        flag,
        value: value.to_string(),
    })
}
