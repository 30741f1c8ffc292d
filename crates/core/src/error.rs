//! Error types for the classgrid domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all classgrid operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Solver service errors ---
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    // --- Session snapshot errors ---
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Wizard input ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// One field-level complaint returned by the solver's input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path of the offending field (e.g. `body.config.dias_semana`).
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("Input rejected: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),

    #[error("Solver request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Solver unreachable: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unexpected solver response: {0}")]
    InvalidResponse(String),

    #[error("Solver not configured: {0}")]
    NotConfigured(String),
}

impl SolverError {
    /// Whether the failure came from the solver checking our input, as opposed
    /// to the service being unreachable or misbehaving.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the service answered and refused (bad input or no solution).
    /// Transport failures and unreadable replies are not rejections.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ApiError { .. })
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_error_displays_correctly() {
        let err = Error::Solver(SolverError::ApiError {
            status_code: 400,
            message: "ERRO: grafo inviável".into(),
        });
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("inviável"));
    }

    #[test]
    fn validation_issues_join_with_paths() {
        let err = SolverError::Validation(vec![
            FieldIssue {
                path: "body.config.dias_semana".into(),
                message: "field required".into(),
            },
            FieldIssue {
                path: String::new(),
                message: "bad input".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Input rejected: body.config.dias_semana: field required | bad input"
        );
        assert!(err.is_validation());
        assert!(!SolverError::Network("refused".into()).is_validation());
        assert!(err.is_rejection());
        assert!(!SolverError::Timeout("60s".into()).is_rejection());
    }
}
