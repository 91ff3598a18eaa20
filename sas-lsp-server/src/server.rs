use lsp_types::*;
use sas_lsp_core::{Workspace, WorkspaceStats};
use sas_lsp_protocol::{server_capabilities, supports_hierarchical_symbols, Handlers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::info;

pub struct SasLanguageServer {
    client: Client,
    handlers: Handlers,
    /// Client accepts nested DocumentSymbol trees
    hierarchical_symbols: AtomicBool,
}

impl SasLanguageServer {
    pub fn new(client: Client) -> Self {
        Self::with_workspace(client, Arc::new(Workspace::default()))
    }

    pub fn with_workspace(client: Client, workspace: Arc<Workspace>) -> Self {
        info!("Initializing language server");
        Self {
            client,
            handlers: Handlers::new(workspace),
            hierarchical_symbols: AtomicBool::new(false),
        }
    }

    /// `sas/workspaceStats`: document and cache counters.
    pub async fn workspace_stats(&self) -> Result<WorkspaceStats> {
        Ok(self.handlers.stats())
    }
}

/// Build the service with the default analyzer and custom methods.
pub fn build_service() -> (LspService<SasLanguageServer>, tower_lsp::ClientSocket) {
    LspService::build(SasLanguageServer::new)
        .custom_method("sas/workspaceStats", SasLanguageServer::workspace_stats)
        .finish()
}

#[tower_lsp::async_trait]
impl LanguageServer for SasLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let hierarchical = supports_hierarchical_symbols(&params.capabilities);
        self.hierarchical_symbols.store(hierarchical, Ordering::SeqCst);

        info!(
            "Initialize request received from {} (hierarchical symbols: {})",
            params
                .client_info
                .as_ref()
                .map_or("unknown client", |client| client.name.as_str()),
            hierarchical
        );

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "sas-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Server initialized");
        self.client
            .log_message(MessageType::INFO, "SAS language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        let stats = self.handlers.stats();
        info!(
            "Shutdown request received ({} documents open, {} builds, {} failed)",
            stats.document_count, stats.builds, stats.failed_builds
        );
        Ok(())
    }

    // Document synchronization
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.handlers.did_open(params);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.handlers.did_change(params);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.handlers.did_close(params);
    }

    // Language features
    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        self.handlers.semantic_tokens_full(params).await
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        self.handlers.completion(params).await
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        self.handlers.hover(params).await
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        self.handlers.formatting(params).await
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        self.handlers.folding_range(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let hierarchical = self.hierarchical_symbols.load(Ordering::SeqCst);
        self.handlers.document_symbol(params, hierarchical).await
    }
}
