//! Document store and analysis cache.
//!
//! Every open URI owns a slot holding its document and cache entry under one
//! short, synchronous lock, plus an async build lock that serializes rebuilds
//! for that URI only. The URI map lock is never held while a slot is used,
//! and no lock except the slot's build lock is held across the builder call.
//!
//! A rebuild runs in its own task which owns the build lock until the result
//! is installed. Dropping the request that started it (for example on
//! `$/cancelRequest`) leaves the rebuild running, and later requests join it.

use crate::analysis::{AnalysisBuilder, AnalysisResult};
use crate::cache::{CacheEntry, CacheState};
use crate::document::Document;
use crate::error::{BuildError, Result, WorkspaceError};
use crate::line_index::LineIndex;
use crate::sas::SasAnalyzer;
use lsp_types::{TextDocumentContentChangeEvent, Url};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

struct SlotState {
    document: Document,
    cache: CacheEntry,
    /// Set on close; a rebuild finishing afterwards must not write back
    closed: bool,
}

struct DocumentSlot {
    state: Mutex<SlotState>,
    build_lock: Arc<tokio::sync::Mutex<()>>,
}

impl DocumentSlot {
    fn new(document: Document) -> Self {
        Self {
            state: Mutex::new(SlotState {
                document,
                cache: CacheEntry::new(),
                closed: false,
            }),
            build_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn fresh(&self, uri: &Url) -> Result<Option<Arc<AnalysisResult>>> {
        let state = self.state.lock();
        if state.closed {
            return Err(WorkspaceError::UnknownDocument(uri.clone()));
        }
        Ok(state.cache.fresh(state.document.version))
    }
}

/// Snapshot of the text a rebuild works from.
struct BuildInput {
    source: Arc<str>,
    version: i32,
    revision: u64,
}

#[derive(Default)]
struct BuildCounters {
    builds: AtomicU64,
    failed: AtomicU64,
}

pub struct Workspace {
    slots: RwLock<HashMap<Url, Arc<DocumentSlot>>>,
    builder: Arc<dyn AnalysisBuilder>,
    counters: Arc<BuildCounters>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Arc::new(SasAnalyzer::new()))
    }
}

impl Workspace {
    pub fn new(builder: Arc<dyn AnalysisBuilder>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            builder,
            counters: Arc::new(BuildCounters::default()),
        }
    }

    fn slot(&self, uri: &Url) -> Result<Arc<DocumentSlot>> {
        self.slots
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| WorkspaceError::UnknownDocument(uri.clone()))
    }

    /// Register a newly opened document. Its analysis starts out `Absent`.
    pub fn open(
        &self,
        uri: Url,
        language_id: impl Into<String>,
        version: i32,
        text: &str,
    ) -> Result<()> {
        let mut slots = self.slots.write();
        if slots.contains_key(&uri) {
            warn!("Document opened twice without close: {}", uri);
            return Err(WorkspaceError::DuplicateDocument(uri));
        }

        info!("Opening document: {} (version {})", uri, version);
        let document = Document::new(uri.clone(), language_id.into(), version, text);
        slots.insert(uri, Arc::new(DocumentSlot::new(document)));
        Ok(())
    }

    /// Apply an ordered batch of edits, move to `version` and mark the cache dirty.
    pub fn apply_change(
        &self,
        uri: &Url,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Result<()> {
        let slot = self.slot(uri)?;
        let mut state = slot.state.lock();
        if state.closed {
            return Err(WorkspaceError::UnknownDocument(uri.clone()));
        }

        if version <= state.document.version {
            warn!(
                "Non-increasing version for {}: {} after {}, applying anyway",
                uri, version, state.document.version
            );
        }

        state.document.apply_changes(version, changes);
        state.cache.mark_dirty();
        debug!("Applied {} change(s) to {} (version {})", changes.len(), uri, version);
        Ok(())
    }

    /// Remove a document and its cache entry.
    pub fn close(&self, uri: &Url) -> Result<()> {
        let slot = self
            .slots
            .write()
            .remove(uri)
            .ok_or_else(|| WorkspaceError::UnknownDocument(uri.clone()))?;

        let mut state = slot.state.lock();
        state.closed = true;
        state.cache.clear();
        info!("Closed document: {}", uri);
        Ok(())
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.slots.read().contains_key(uri)
    }

    pub fn open_documents(&self) -> Vec<Url> {
        self.slots.read().keys().cloned().collect()
    }

    pub fn text(&self, uri: &Url) -> Result<String> {
        Ok(self.slot(uri)?.state.lock().document.text())
    }

    pub fn version(&self, uri: &Url) -> Result<i32> {
        Ok(self.slot(uri)?.state.lock().document.version)
    }

    pub fn cache_state(&self, uri: &Url) -> Result<CacheState> {
        let slot = self.slot(uri)?;
        let state = slot.state.lock();
        Ok(state.cache.state(state.document.version))
    }

    /// Number of builder invocations since the workspace was created.
    pub fn build_count(&self) -> u64 {
        self.counters.builds.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> WorkspaceStats {
        let slots: Vec<Arc<DocumentSlot>> = self.slots.read().values().cloned().collect();
        let fresh_count = slots
            .iter()
            .filter(|slot| {
                let state = slot.state.lock();
                state.cache.state(state.document.version) == CacheState::Fresh
            })
            .count();

        WorkspaceStats {
            document_count: slots.len(),
            fresh_count,
            builds: self.counters.builds.load(Ordering::SeqCst),
            failed_builds: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Analysis reflecting every change applied before this call.
    ///
    /// Serves the cached result when it is fresh. Otherwise rebuilds once,
    /// with concurrent callers for the same URI waiting on that rebuild.
    pub async fn get_analysis(&self, uri: &Url) -> Result<Arc<AnalysisResult>> {
        let slot = self.slot(uri)?;
        if let Some(result) = slot.fresh(uri)? {
            debug!("Analysis cache hit for {} (version {})", uri, result.source_version());
            return Ok(result);
        }

        let guard = Arc::clone(&slot.build_lock).lock_owned().await;

        let input = {
            let state = slot.state.lock();
            if state.closed {
                return Err(WorkspaceError::UnknownDocument(uri.clone()));
            }
            if let Some(result) = state.cache.fresh(state.document.version) {
                debug!("Joined in-flight rebuild for {}", uri);
                return Ok(result);
            }
            BuildInput {
                source: Arc::from(state.document.text()),
                version: state.document.version,
                revision: state.document.revision,
            }
        };

        debug!("Analysis cache miss for {}, rebuilding version {}", uri, input.version);
        let task = tokio::spawn(rebuild(
            slot,
            uri.clone(),
            input,
            Arc::clone(&self.builder),
            Arc::clone(&self.counters),
            guard,
        ));

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(WorkspaceError::AnalysisFailed {
                uri: uri.clone(),
                reason: format!("rebuild task failed: {}", join_error),
            }),
        }
    }
}

/// Build `input`, then install the result if the slot still holds that text.
///
/// Holds the slot's build lock through `_guard` until it returns.
async fn rebuild(
    slot: Arc<DocumentSlot>,
    uri: Url,
    input: BuildInput,
    builder: Arc<dyn AnalysisBuilder>,
    counters: Arc<BuildCounters>,
    _guard: OwnedMutexGuard<()>,
) -> Result<Arc<AnalysisResult>> {
    counters.builds.fetch_add(1, Ordering::SeqCst);
    let built = run_builder(builder, input.source.clone()).await;

    let mut state = slot.state.lock();
    if state.closed {
        debug!("Discarding analysis for closed document {}", uri);
        return Err(WorkspaceError::UnknownDocument(uri));
    }

    match built {
        Ok((analysis, line_index)) => {
            let result = Arc::new(AnalysisResult::new(
                input.version,
                input.source,
                line_index,
                analysis,
            ));
            if state.document.revision == input.revision {
                state.cache.install(result.clone());
            } else {
                debug!("{} changed during rebuild, leaving cache dirty", uri);
            }
            Ok(result)
        }
        Err(reason) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            state.cache.record_failure();
            error!("Analysis failed for {}: {}", uri, reason);
            Err(WorkspaceError::AnalysisFailed { uri, reason })
        }
    }
}

async fn run_builder(
    builder: Arc<dyn AnalysisBuilder>,
    source: Arc<str>,
) -> std::result::Result<(crate::Analysis, LineIndex), String> {
    let task = tokio::task::spawn_blocking(move || {
        let line_index = LineIndex::new(&source);
        let analysis = builder.analyze(&source)?;
        analysis.validate(&source, &line_index)?;
        Ok::<_, BuildError>((analysis, line_index))
    });

    match task.await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(join_error) => Err(format!("analyzer panicked: {}", join_error)),
    }
}

/// Workspace statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceStats {
    pub document_count: usize,
    pub fresh_count: usize,
    pub builds: u64,
    pub failed_builds: u64,
}
