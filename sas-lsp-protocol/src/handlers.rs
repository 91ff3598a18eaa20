//! Request routing from LSP operations to the workspace.
//!
//! Every request handler answers with a neutral value when the document is
//! unknown or its analysis cannot be built; errors never reach the client.

use crate::semantic_tokens;
use lsp_types::*;
use sas_lsp_core::{
    format, AnalysisResult, CompletionEntry, CompletionKind, Workspace, WorkspaceError,
    WorkspaceStats,
};
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tracing::{debug, error, info, warn};

pub struct Handlers {
    workspace: Arc<Workspace>,
}

fn report(operation: &str, error: &WorkspaceError) {
    match error {
        WorkspaceError::AnalysisFailed { .. } => {
            error!("{} failed ({}): {}", operation, error.kind(), error)
        }
        WorkspaceError::UnknownDocument(_) | WorkspaceError::DuplicateDocument(_) => {
            warn!("{} ignored ({}): {}", operation, error.kind(), error)
        }
    }
}

fn completion_item_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Keyword | CompletionKind::MacroStatement => CompletionItemKind::KEYWORD,
        CompletionKind::Procedure => CompletionItemKind::FUNCTION,
        CompletionKind::Macro => CompletionItemKind::METHOD,
        CompletionKind::MacroVariable => CompletionItemKind::VARIABLE,
        CompletionKind::Dataset => CompletionItemKind::STRUCT,
        CompletionKind::DatasetOption => CompletionItemKind::PROPERTY,
    }
}

fn completion_item(entry: &CompletionEntry, replace: Range) -> CompletionItem {
    CompletionItem {
        label: entry.label.clone(),
        kind: Some(completion_item_kind(entry.kind)),
        detail: entry.detail.clone(),
        documentation: entry.documentation.as_ref().map(|doc| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            })
        }),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: replace,
            new_text: entry.label.clone(),
        })),
        ..Default::default()
    }
}

#[allow(deprecated)]
fn document_symbol(symbol: &sas_lsp_core::Symbol) -> DocumentSymbol {
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: symbol.detail.clone(),
        kind: symbol.kind,
        tags: None,
        deprecated: None,
        range: symbol.range,
        selection_range: symbol.selection_range,
        children: (!symbol.children.is_empty())
            .then(|| symbol.children.iter().map(document_symbol).collect()),
    }
}

#[allow(deprecated)]
fn symbol_information(result: &AnalysisResult, uri: &Url) -> Vec<SymbolInformation> {
    result
        .flat_symbols()
        .into_iter()
        .map(|(symbol, container)| SymbolInformation {
            name: symbol.name.clone(),
            kind: symbol.kind,
            tags: None,
            deprecated: None,
            location: Location::new(uri.clone(), symbol.range),
            container_name: container.map(str::to_string),
        })
        .collect()
}

fn empty_completion() -> CompletionResponse {
    CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items: Vec::new(),
    })
}

fn empty_tokens() -> SemanticTokensResult {
    SemanticTokensResult::Tokens(SemanticTokens::default())
}

impl Handlers {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn stats(&self) -> WorkspaceStats {
        self.workspace.stats()
    }

    async fn analysis(&self, operation: &str, uri: &Url) -> Option<Arc<AnalysisResult>> {
        match self.workspace.get_analysis(uri).await {
            Ok(result) => Some(result),
            Err(e) => {
                report(operation, &e);
                None
            }
        }
    }

    // Document synchronization. These never await, so an edit is visible to
    // every request that arrives after it.

    pub fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        if let Err(e) = self
            .workspace
            .open(document.uri, document.language_id, document.version, &document.text)
        {
            report("didOpen", &e);
        }
    }

    pub fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Err(e) = self
            .workspace
            .apply_change(&uri, &params.content_changes, version)
        {
            report("didChange", &e);
        }
    }

    pub fn did_close(&self, params: DidCloseTextDocumentParams) {
        if let Err(e) = self.workspace.close(&params.text_document.uri) {
            report("didClose", &e);
        }
    }

    pub async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        let Some(result) = self.analysis("semanticTokens/full", &uri).await else {
            return Ok(Some(empty_tokens()));
        };

        debug!("Encoding {} semantic tokens for {}", result.tokens().len(), uri);
        Ok(Some(SemanticTokensResult::Tokens(semantic_tokens::encode(result.tokens()))))
    }

    pub async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(result) = self.analysis("completion", &uri).await else {
            return Ok(Some(empty_completion()));
        };

        let matched = result.completions_at(position);
        let items: Vec<CompletionItem> = matched
            .entries
            .iter()
            .map(|entry| completion_item(entry, matched.replace))
            .collect();

        info!("Returning {} completion items for {} at {:?}", items.len(), uri, position);
        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }

    pub async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(result) = self.analysis("hover", &uri).await else {
            return Ok(None);
        };

        Ok(result.hover_at(position).map(|info| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: info.contents,
            }),
            range: Some(info.range),
        }))
    }

    pub async fn formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let Some(result) = self.analysis("formatting", &uri).await else {
            return Ok(Some(Vec::new()));
        };

        Ok(Some(format::format(&result, &params.options)))
    }

    pub async fn folding_range(
        &self,
        params: FoldingRangeParams,
    ) -> Result<Option<Vec<FoldingRange>>> {
        let uri = params.text_document.uri;
        let Some(result) = self.analysis("foldingRange", &uri).await else {
            return Ok(Some(Vec::new()));
        };

        let ranges = result
            .fold_ranges()
            .iter()
            .map(|fold| FoldingRange {
                start_line: fold.start_line,
                end_line: fold.end_line,
                kind: fold.kind.clone(),
                ..Default::default()
            })
            .collect();
        Ok(Some(ranges))
    }

    /// Flat symbol list with container names.
    pub async fn symbols(&self, uri: &Url) -> Vec<SymbolInformation> {
        match self.analysis("symbols", uri).await {
            Some(result) => symbol_information(&result, uri),
            None => Vec::new(),
        }
    }

    /// Nested symbols for clients that support them, the flat list otherwise.
    pub async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
        hierarchical: bool,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        if !hierarchical {
            return Ok(Some(DocumentSymbolResponse::Flat(self.symbols(&uri).await)));
        }

        let Some(result) = self.analysis("documentSymbol", &uri).await else {
            return Ok(Some(DocumentSymbolResponse::Nested(Vec::new())));
        };
        Ok(Some(DocumentSymbolResponse::Nested(
            result.symbols().iter().map(document_symbol).collect(),
        )))
    }
}
