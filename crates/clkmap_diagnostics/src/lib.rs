//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Every user-visible event of a clock-buffer run (an inserted buffer, a
//! deferred clock input, a fatal configuration problem) is reported as a structured [`Diagnostic`]. The thread-safe
//! [`DiagnosticSink`] accumulates them and a [`DiagnosticRenderer`] formats
//! them for the terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Location};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
