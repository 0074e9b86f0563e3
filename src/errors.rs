//! Error types for puzzle construction, with error codes and helpful messages.
//!
//! Each error variant has a unique code for documentation lookup:
//!
//! - P001: `EmptyStructure` (Structure text contains no grid rows)
//!
//! Solver errors (S001, S002) live in [`crate::solver::SolverError`].

/// Format an error message together with its code and optional help text.
///
/// Used by the `display_detailed()` methods of both error enums so every
/// error in the crate renders the same way.
pub(crate) fn format_error_with_code_and_help(msg: &str, code: &str, help: Option<&str>) -> String {
    match help {
        Some(help) => format!("[{code}] {msg}\n  help: {help}"),
        None => format!("[{code}] {msg}"),
    }
}

/// Error raised while building a [`crate::puzzle::Puzzle`] from structure text.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// The structure text contained no rows (or only zero-width rows).
    #[error("structure is empty")]
    EmptyStructure,
}

impl PuzzleError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            PuzzleError::EmptyStructure => "P001",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            PuzzleError::EmptyStructure => {
                Some("Pass at least one row; use '_' for open cells and any other character for blocks")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}
