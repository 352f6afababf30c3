//! Plain-text diagnostic output for terminals.
//!
//! ```text
//! error[E2002]: evaluation of `a` may be infinite
//!  at 12..13
//!  | 12..13: call to `a`
//!  | 30..31: call to `b`
//!  = note: ...
//! ```

use std::io::{self, Write};

use crate::{Diagnostic, Label, Severity};

use super::DiagnosticEmitter;

const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const CYAN: &str = "\x1b[1;36m";
const BLUE: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";

/// `1 error`, `2 errors`.
fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// When to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color only when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Writes diagnostics as text, one block per diagnostic.
///
/// Write errors are ignored; a broken stderr must not turn a compile error
/// into a crash.
pub struct TerminalEmitter<W: Write> {
    out: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(out: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            out,
            colors: mode.should_use_colors(is_tty),
        }
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&mut self, color: &str, text: &str) {
        let _ = if self.colors {
            write!(self.out, "{color}{text}{RESET}")
        } else {
            write!(self.out, "{text}")
        };
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Note => CYAN,
        }
    }

    fn write_label(&mut self, label: &Label) {
        let span = label.span;
        if label.is_primary {
            let _ = write!(self.out, " at {}..{}", span.start, span.end);
            if !label.message.is_empty() {
                let _ = write!(self.out, ": {}", label.message);
            }
        } else {
            self.paint(BLUE, " |");
            let _ = write!(self.out, " {}..{}: {}", span.start, span.end, label.message);
        }
        let _ = writeln!(self.out);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let header = format!("{}[{}]", diagnostic.severity, diagnostic.code);
        self.paint(Self::severity_color(diagnostic.severity), &header);
        let _ = writeln!(self.out, ": {}", diagnostic.message);

        // Primary location first, then the chain in report order.
        let (primary, secondary): (Vec<&Label>, Vec<&Label>) =
            diagnostic.labels.iter().partition(|label| label.is_primary);
        for label in primary.into_iter().chain(secondary) {
            self.write_label(label);
        }

        for note in &diagnostic.notes {
            let _ = writeln!(self.out, " = note: {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        match (error_count, warning_count) {
            (0, 0) => {}
            (0, warnings) => {
                self.paint(YELLOW, "warning");
                let _ = writeln!(self.out, ": {} emitted", counted(warnings, "warning"));
            }
            (errors, 0) => {
                self.paint(RED, "error");
                let _ = writeln!(self.out, ": stopping after {}", counted(errors, "error"));
            }
            (errors, warnings) => {
                self.paint(RED, "error");
                let _ = writeln!(
                    self.out,
                    ": stopping after {} and {}",
                    counted(errors, "error"),
                    counted(warnings, "warning")
                );
            }
        }
    }
}
