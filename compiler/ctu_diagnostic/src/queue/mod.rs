//! Diagnostic queue: the sink every resolution and check pass reports into.
//!
//! Features:
//! - Error limits to keep a runaway stage from flooding output
//! - Warnings-as-errors policy applied when a stage is gated
//! - `ErrorGuaranteed` proof that errors were emitted
//!
//! Diagnostics are kept in emission order. Cycle reports and entry point
//! conflicts reference earlier declarations, and reading them in the order
//! the walk found them is what makes the chain legible.

use ctu_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept per stage (0 = unlimited).
    pub error_limit: usize,
    /// Count warnings as fatal when gating a stage.
    pub warnings_as_errors: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 100,
            warnings_as_errors: false,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            warnings_as_errors: false,
        }
    }
}

/// Queue for collecting diagnostics of one compilation stage.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
/// queue.push(diagnostic);
/// if let Some(guar) = queue.has_errors() { return Err(guar); }
/// let diagnostics = queue.flush();
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors dropped because the limit was reached.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was kept, `false` if the error limit
    /// dropped it. Warnings and notes are never dropped.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        if diag.is_error() {
            if self.limit_reached() {
                self.suppressed += 1;
                return false;
            }
            self.error_count += 1;
        } else if diag.is_warning() {
            self.warning_count += 1;
        }

        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// # Panics
    /// Panics if `diag` is not an error.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        assert!(
            diag.is_error(),
            "emit_error called with a {} diagnostic",
            diag.severity
        );
        self.push(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Number of errors dropped past the limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Number of diagnostics that halt the pipeline under the current policy.
    pub fn fatal_count(&self) -> usize {
        let fatal = self.error_count + self.suppressed;
        if self.config.warnings_as_errors {
            fatal + self.warning_count
        } else {
            fatal
        }
    }

    /// Check if any fatal diagnostics were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.fatal_count())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drain diagnostics in emission order and reset the counts.
    ///
    /// If errors were dropped past the limit, a final "too many errors"
    /// diagnostic is appended.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        if self.suppressed > 0 {
            result.push(too_many_errors(self.config.error_limit, self.suppressed));
        }

        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;

        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Count queued diagnostics with `code`.
    pub fn count_code(&self, code: ErrorCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, suppressed: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(Span::DUMMY, "error limit reached")
        .with_note(format!("{suppressed} further errors were not shown"))
}
