//! Diagnostic emitters.
//!
//! A driver drains a stage's [`DiagnosticQueue`](crate::DiagnosticQueue) and
//! hands the diagnostics to an emitter. Only the terminal format is provided;
//! tooling formats plug in through [`DiagnosticEmitter`].

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Sink for the diagnostics a stage produced.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit in queue order.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        diagnostics.iter().for_each(|diag| self.emit(diag));
    }

    fn flush(&mut self);

    /// Called once per failing or noisy stage, after its diagnostics.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// Keeps everything in memory, for embedding the broker in tests.
#[derive(Default, Debug)]
pub struct CollectingEmitter {
    pub diagnostics: Vec<Diagnostic>,
    pub summaries: Vec<(usize, usize)>,
}

impl DiagnosticEmitter for CollectingEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn flush(&mut self) {}

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        self.summaries.push((error_count, warning_count));
    }
}
