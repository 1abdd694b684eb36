//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support and
//! a one-line source snippet under each primary location.

use std::io::{self, Write};

use kiln_ir::{SourceMap, Span};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<'a, W: Write> {
    writer: W,
    sources: &'a SourceMap,
    colors: bool,
}

impl<'a, W: Write> TerminalEmitter<'a, W> {
    /// Create a new terminal emitter with explicit color mode.
    pub fn with_color_mode(writer: W, sources: &'a SourceMap, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            sources,
            colors: mode.should_use_colors(is_tty),
        }
    }

    /// Write text with optional ANSI color codes.
    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_code(&mut self, code: &str) {
        if self.colors {
            let _ = write!(self.writer, "{}[{code}]{}", colors::BOLD, colors::RESET);
        } else {
            let _ = write!(self.writer, "[{code}]");
        }
    }

    /// Print `line | text` with a caret underline below the span.
    fn write_snippet(&mut self, span: Span, caret_color: &str) {
        let Some(file) = self.sources.get(span.file) else {
            return;
        };
        let (line, col) = file.line_col(span.start);
        let text = file.line_text(line).to_string();
        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());

        let available = text.len().saturating_sub(col as usize - 1).max(1);
        let width = (span.len() as usize).clamp(1, available);
        let carets = "^".repeat(width);

        let _ = writeln!(self.writer, "{pad} |");
        let _ = writeln!(self.writer, "{gutter} | {text}");
        let _ = write!(self.writer, "{pad} | {}", " ".repeat(col as usize - 1));
        self.write_colored(&carets, caret_color);
        let _ = writeln!(self.writer);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity());
        self.write_code(diagnostic.kind.code());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        let location = self.sources.describe(diagnostic.span);
        let _ = writeln!(self.writer, "  --> {location}");
        let caret = match diagnostic.severity() {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
        };
        self.write_snippet(diagnostic.span, caret);

        for label in &diagnostic.labels {
            let location = self.sources.describe(label.span);
            let _ = write!(self.writer, "  ::: {location}: ");
            self.write_colored(&label.message, colors::SECONDARY);
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::NOTE);
            let _ = writeln!(self.writer, ": {note}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

/// Convenience constructor for a stderr emitter.
pub fn stderr(sources: &SourceMap, mode: ColorMode, is_tty: bool) -> TerminalEmitter<'_, io::Stderr> {
    TerminalEmitter::with_color_mode(io::stderr(), sources, mode, is_tty)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sources() -> (SourceMap, Span) {
        let mut map = SourceMap::new();
        let file = map.add("main.kn", "integer x = 1;\ny = 2;\n");
        (map, Span::new(file, 15, 16))
    }

    #[test]
    fn test_terminal_emitter_no_color() {
        let (map, span) = sources();
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, &map, ColorMode::Never, true);

        emitter.emit(
            &Diagnostic::new(ErrorKind::UnknownVariable, span)
                .with_message("unknown variable `y`")
                .with_note("declare it before use"),
        );
        emitter.flush();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("error[E2007]: unknown variable `y`"));
        assert!(text.contains("--> main.kn:2:1"));
        assert!(text.contains("2 | y = 2;"));
        assert!(text.contains("\n  | ^\n"));
        assert!(text.contains("note: declare it"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_terminal_emitter_with_color() {
        let (map, span) = sources();
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, &map, ColorMode::Always, false);

        emitter.emit(&Diagnostic::new(ErrorKind::Redefinition, span));
        emitter.flush();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.contains("warning"));
        assert!(text.contains("E1005"));
    }

    #[test]
    fn test_summary() {
        let map = SourceMap::new();
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, &map, ColorMode::Never, false);
        emitter.emit_summary(2, 1);
        emitter.emit_summary(0, 0);
        emitter.flush();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "error: aborting due to 2 previous errors; 1 warning emitted\n");
    }

    #[test]
    fn test_unknown_file_has_no_snippet() {
        let map = SourceMap::new();
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, &map, ColorMode::Never, false);
        emitter.emit(&Diagnostic::new(ErrorKind::OutOfMemory, Span::DUMMY));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("<unknown>:0..0"));
        assert!(!text.contains(" | "));
    }
}
