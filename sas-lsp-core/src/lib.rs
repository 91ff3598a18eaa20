pub mod analysis;
pub mod cache;
pub mod completion;
pub mod document;
pub mod error;
pub mod format;
pub mod line_index;
pub mod sas;
pub mod workspace;

pub use analysis::{
    Analysis, AnalysisBuilder, AnalysisResult, FoldRange, SemanticToken, Symbol, TokenKind,
};
pub use cache::{CacheEntry, CacheState};
pub use completion::{
    CompletionEntry, CompletionIndex, CompletionKind, CompletionMatch, HoverInfo,
};
pub use document::Document;
pub use error::{BuildError, Result, WorkspaceError};
pub use line_index::LineIndex;
pub use sas::SasAnalyzer;
pub use workspace::{Workspace, WorkspaceStats};
