//! Fatal errors of the insertion pass.
//!
//! Both are detected before any module is modified.

use crate::codes;
use clkmap_diagnostics::{Diagnostic, DiagnosticCode, Location};

/// Errors that abort [`run`](crate::run).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClkbufError {
    /// Neither a buffer nor a pad cell type was configured.
    #[error("either a buffer cell or an input pad cell must be configured")]
    NoBufferConfigured,

    /// A module instantiates itself, directly or through other modules.
    #[error("module hierarchy contains a cycle: {}", chain.join(" -> "))]
    HierarchyCycle {
        /// Module names along the cycle, starting and ending with the same module.
        chain: Vec<String>,
    },
}

impl ClkbufError {
    /// The diagnostic code reported for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ClkbufError::NoBufferConfigured => codes::NO_BUFFER_CONFIGURED,
            ClkbufError::HierarchyCycle { .. } => codes::HIERARCHY_CYCLE,
        }
    }

    /// Converts the error into a renderable diagnostic.
    pub fn diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            ClkbufError::NoBufferConfigured => {
                diag.with_help("pass --buf CELL PORTS, --inpad CELL PORTS, or a [buffer] section")
            }
            ClkbufError::HierarchyCycle { chain } => {
                let diag = diag.with_note("no module was modified");
                match chain.first() {
                    Some(module) => diag.at(Location::module(module.as_str())),
                    None => diag,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cycle() {
        let err = ClkbufError::HierarchyCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            format!("{err}"),
            "module hierarchy contains a cycle: a -> b -> a"
        );
    }

    #[test]
    fn display_no_buffer() {
        assert!(format!("{}", ClkbufError::NoBufferConfigured).contains("buffer"));
    }

    #[test]
    fn diagnostics_carry_codes() {
        let diag = ClkbufError::NoBufferConfigured.diagnostic();
        assert_eq!(diag.code.to_string(), "E001");
        assert_eq!(diag.help.len(), 1);
        let cycle = ClkbufError::HierarchyCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        }
        .diagnostic();
        assert_eq!(cycle.code.to_string(), "E002");
        assert_eq!(cycle.location.map(|l| l.to_string()), Some("a".to_string()));
        assert_eq!(cycle.notes, vec!["no module was modified".to_string()]);
        assert!(ClkbufError::HierarchyCycle { chain: vec![] }
            .diagnostic()
            .location
            .is_none());
    }
}
