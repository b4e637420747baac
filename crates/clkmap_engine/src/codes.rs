//! Diagnostic codes emitted by the insertion pass.

use clkmap_diagnostics::{Category, DiagnosticCode};

/// A buffer cell was inserted.
pub const BUFFER_INSERTED: DiagnosticCode = DiagnosticCode::new(Category::Info, 1);
/// An input pad cell was inserted.
pub const PAD_INSERTED: DiagnosticCode = DiagnosticCode::new(Category::Info, 2);
/// A clock input of a submodule was left for the instantiating module.
pub const CLOCK_INPUT_DEFERRED: DiagnosticCode = DiagnosticCode::new(Category::Info, 3);
/// Neither a buffer nor a pad is configured.
pub const NO_BUFFER_CONFIGURED: DiagnosticCode = DiagnosticCode::new(Category::Error, 1);
/// The module hierarchy is cyclic.
pub const HIERARCHY_CYCLE: DiagnosticCode = DiagnosticCode::new(Category::Error, 2);
