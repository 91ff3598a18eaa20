//! Builders for protocol messages used by the server tests.

use lsp_types::*;
use serde_json::Value;
use tower_lsp::jsonrpc::Request;

/// Test utilities for LSP server testing
pub struct LspTestClient {
    next_id: i64,
}

impl Default for LspTestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LspTestClient {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Wrap typed params into a JSON-RPC request with a fresh id.
    pub fn request(&mut self, method: &'static str, params: impl serde::Serialize) -> Request {
        let id = self.next_id;
        self.next_id += 1;
        Request::build(method)
            .params(to_value(params))
            .id(id)
            .finish()
    }

    /// JSON-RPC notification (no id).
    pub fn notification(method: &'static str, params: impl serde::Serialize) -> Request {
        Request::build(method).params(to_value(params)).finish()
    }

    /// Create an initialize request; `hierarchical` toggles nested document symbols.
    pub fn create_initialize_request(hierarchical: bool) -> InitializeParams {
        InitializeParams {
            process_id: Some(1234),
            capabilities: ClientCapabilities {
                text_document: Some(TextDocumentClientCapabilities {
                    synchronization: Some(TextDocumentSyncClientCapabilities {
                        dynamic_registration: Some(false),
                        will_save: Some(false),
                        will_save_wait_until: Some(false),
                        did_save: Some(false),
                    }),
                    hover: Some(HoverClientCapabilities {
                        dynamic_registration: Some(false),
                        content_format: Some(vec![MarkupKind::Markdown, MarkupKind::PlainText]),
                    }),
                    document_symbol: Some(DocumentSymbolClientCapabilities {
                        hierarchical_document_symbol_support: Some(hierarchical),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            client_info: Some(ClientInfo {
                name: "test-client".to_string(),
                version: Some("1.0.0".to_string()),
            }),
            ..Default::default()
        }
    }

    pub fn create_did_open_notification(uri: &str, text: &str) -> DidOpenTextDocumentParams {
        DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: parse_uri(uri),
                language_id: "sas".to_string(),
                version: 1,
                text: text.to_string(),
            },
        }
    }

    pub fn create_did_change_notification(
        uri: &str,
        version: i32,
        text: &str,
    ) -> DidChangeTextDocumentParams {
        DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: parse_uri(uri),
                version,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: text.to_string(),
            }],
        }
    }

    pub fn create_did_close_notification(uri: &str) -> DidCloseTextDocumentParams {
        DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: parse_uri(uri) },
        }
    }

    pub fn create_document_symbol_request(uri: &str) -> DocumentSymbolParams {
        DocumentSymbolParams {
            text_document: TextDocumentIdentifier { uri: parse_uri(uri) },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        }
    }

    pub fn create_hover_request(uri: &str, line: u32, character: u32) -> HoverParams {
        HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: parse_uri(uri) },
                position: Position { line, character },
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
        }
    }

    pub fn create_completion_request(uri: &str, line: u32, character: u32) -> CompletionParams {
        CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: parse_uri(uri) },
                position: Position { line, character },
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
            context: None,
        }
    }
}

fn parse_uri(uri: &str) -> Url {
    Url::parse(uri).unwrap_or_else(|e| panic!("invalid test uri {}: {}", uri, e))
}

fn to_value(params: impl serde::Serialize) -> Value {
    serde_json::to_value(params).unwrap_or_else(|e| panic!("unserializable test params: {}", e))
}

/// A small program exercising steps, macros and comments.
pub fn create_test_sas_source() -> &'static str {
    r#"/* region setup */
libname raw '/data/raw';
%let cutoff = 50;
/* endregion */

data work.scores;
    set raw.exams;
    if score >= &cutoff then passed = 1;
run;

%macro report(ds);
    proc print data=&ds;
    run;
%mend report;

%report(work.scores);
"#
}
