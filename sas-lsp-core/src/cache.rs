use crate::analysis::AnalysisResult;
use serde::Serialize;
use std::sync::Arc;

/// Externally visible state of a document's cached analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CacheState {
    /// Opened, never analyzed
    Absent,
    /// A change (or a failed build) left the cached result stale or missing
    Dirty,
    /// Cached result matches the current document version
    Fresh,
}

/// Cached analysis for one document.
///
/// `dirty` is true whenever `result` is missing or was built from another
/// version than the document's current one.
#[derive(Debug)]
pub struct CacheEntry {
    result: Option<Arc<AnalysisResult>>,
    dirty: bool,
    ever_built: bool,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheEntry {
    pub fn new() -> Self {
        Self {
            result: None,
            dirty: true,
            ever_built: false,
        }
    }

    pub fn state(&self, document_version: i32) -> CacheState {
        match &self.result {
            None if !self.ever_built && self.dirty => CacheState::Absent,
            Some(result) if !self.dirty && result.source_version() == document_version => {
                CacheState::Fresh
            }
            _ => CacheState::Dirty,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The cached result, only if it may be served for `document_version`.
    pub fn fresh(&self, document_version: i32) -> Option<Arc<AnalysisResult>> {
        match &self.result {
            Some(result) if !self.dirty && result.source_version() == document_version => {
                Some(result.clone())
            }
            _ => None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Record an attempted build so a failure reports `Dirty`, not `Absent`.
    pub fn record_failure(&mut self) {
        self.ever_built = true;
        self.dirty = true;
    }

    /// Replace any previous result with `result` and clear the dirty flag.
    pub fn install(&mut self, result: Arc<AnalysisResult>) {
        self.result = Some(result);
        self.dirty = false;
        self.ever_built = true;
    }

    pub fn clear(&mut self) {
        self.result = None;
        self.dirty = true;
    }
}
