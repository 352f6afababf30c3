//! Diagnostic system for the tree IR.
//!
//! Every user-facing failure is a [`Diagnostic`] value: an [`ErrorCode`], a
//! primary span, a message, and an ordered chain of secondary labels and
//! notes. Nothing in the resolution engine or the validator formats output
//! itself; diagnostics are pushed into a [`DiagnosticQueue`] and a driver
//! renders them through a [`DiagnosticEmitter`](emitter::DiagnosticEmitter).
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is proof that at least one error reached the queue.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn end_stage(&mut self) -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
