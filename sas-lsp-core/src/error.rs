use lsp_types::Url;
use thiserror::Error;

/// Errors raised by the document store and the analysis cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("document is not open: {0}")]
    UnknownDocument(Url),

    #[error("document is already open: {0}")]
    DuplicateDocument(Url),

    #[error("analysis failed for {uri}: {reason}")]
    AnalysisFailed { uri: Url, reason: String },
}

impl WorkspaceError {
    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkspaceError::UnknownDocument(_) => "UnknownDocument",
            WorkspaceError::DuplicateDocument(_) => "DuplicateDocument",
            WorkspaceError::AnalysisFailed { .. } => "AnalysisFailed",
        }
    }
}

/// Failure reported by an [`AnalysisBuilder`](crate::AnalysisBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("invalid analysis: {0}")]
    Invalid(String),

    #[error("internal analyzer error: {0}")]
    Internal(String),
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
