//! Error types for JSON netlist import and export.

/// Errors produced while reading or writing a JSON netlist.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON or does not have the netlist shape.
    #[error("invalid JSON netlist: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The document is well-formed JSON but describes an inconsistent netlist.
    #[error("malformed netlist: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed() {
        let err = JsonError::Malformed("module 'top': unknown bit \"q\"".to_string());
        assert_eq!(
            format!("{err}"),
            "malformed netlist: module 'top': unknown bit \"q\""
        );
    }

    #[test]
    fn syntax_error_converts() {
        let err: JsonError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, JsonError::Syntax(_)));
    }
}
