use lsp_types::*;
use sas_lsp_core::Workspace;
use sas_lsp_protocol::Handlers;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const URI: &str = "file:///test.sas";

fn uri() -> Url {
    Url::parse(URI).unwrap()
}

/// Create handlers over a fresh workspace with one open document
fn create_handlers(content: &str) -> Handlers {
    let handlers = Handlers::new(Arc::new(Workspace::default()));
    handlers.did_open(DidOpenTextDocumentParams {
        text_document: TextDocumentItem {
            uri: uri(),
            language_id: "sas".to_string(),
            version: 1,
            text: content.to_string(),
        },
    });
    handlers
}

fn document(uri: Url) -> TextDocumentIdentifier {
    TextDocumentIdentifier { uri }
}

fn position_params(uri: Url, line: u32, character: u32) -> TextDocumentPositionParams {
    TextDocumentPositionParams {
        text_document: document(uri),
        position: Position { line, character },
    }
}

fn completion_params(uri: Url, line: u32, character: u32) -> CompletionParams {
    CompletionParams {
        text_document_position: position_params(uri, line, character),
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
        context: None,
    }
}

fn hover_params(uri: Url, line: u32, character: u32) -> HoverParams {
    HoverParams {
        text_document_position_params: position_params(uri, line, character),
        work_done_progress_params: WorkDoneProgressParams::default(),
    }
}

fn symbol_params(uri: Url) -> DocumentSymbolParams {
    DocumentSymbolParams {
        text_document: document(uri),
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
    }
}

fn formatting_params(uri: Url) -> DocumentFormattingParams {
    DocumentFormattingParams {
        text_document: document(uri),
        options: FormattingOptions {
            tab_size: 4,
            insert_spaces: true,
            properties: HashMap::new(),
            trim_trailing_whitespace: Some(true),
            insert_final_newline: None,
            trim_final_newlines: None,
        },
        work_done_progress_params: WorkDoneProgressParams::default(),
    }
}

fn folding_params(uri: Url) -> FoldingRangeParams {
    FoldingRangeParams {
        text_document: document(uri),
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
    }
}

fn tokens_params(uri: Url) -> SemanticTokensParams {
    SemanticTokensParams {
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
        text_document: document(uri),
    }
}

/// Test: textDocument/semanticTokens/full
/// Purpose: Tokens are delta encoded against the legend
#[tokio::test]
async fn test_semantic_tokens_handler() {
    let handlers = create_handlers("data x;\nrun;");

    let response = handlers.semantic_tokens_full(tokens_params(uri())).await.unwrap();

    let Some(SemanticTokensResult::Tokens(tokens)) = response else {
        panic!("expected full tokens");
    };
    let flat: Vec<[u32; 5]> = tokens
        .data
        .iter()
        .map(|t| [t.delta_line, t.delta_start, t.length, t.token_type, t.token_modifiers_bitset])
        .collect();
    // data (keyword), x (data set, declared), run (keyword)
    assert_eq!(flat, vec![[0, 0, 4, 0, 0], [0, 5, 1, 8, 1], [1, 0, 3, 0, 0]]);
}

/// Test: textDocument/completion
/// Purpose: Items carry kind and a text edit over the typed prefix
#[tokio::test]
async fn test_completion_handler() {
    let handlers = create_handlers("proc so");

    let response = handlers.completion(completion_params(uri(), 0, 7)).await.unwrap();

    let Some(CompletionResponse::List(list)) = response else {
        panic!("expected a completion list");
    };
    assert!(!list.is_incomplete);
    assert_eq!(list.items.len(), 1);
    let item = &list.items[0];
    assert_eq!(item.label, "sort");
    assert_eq!(item.kind, Some(CompletionItemKind::FUNCTION));
    assert_eq!(
        item.text_edit,
        Some(CompletionTextEdit::Edit(TextEdit {
            range: Range::new(Position::new(0, 5), Position::new(0, 7)),
            new_text: "sort".to_string(),
        }))
    );
}

/// Test: textDocument/hover
#[tokio::test]
async fn test_hover_handler() {
    let handlers = create_handlers("%let cutoff = 5;\nx = &cutoff;");

    let hover = handlers.hover(hover_params(uri(), 1, 7)).await.unwrap().expect("hover");

    let HoverContents::Markup(markup) = hover.contents else {
        panic!("expected markdown hover");
    };
    assert_eq!(markup.kind, MarkupKind::Markdown);
    assert!(markup.value.contains("&cutoff"));
    assert!(markup.value.contains("%LET on line 1"));
    assert_eq!(hover.range, Some(Range::new(Position::new(1, 4), Position::new(1, 11))));
}

/// Test: textDocument/documentSymbol, nested and flat
#[tokio::test]
async fn test_document_symbol_handler() {
    let handlers = create_handlers("%macro m;\nproc print; run;\n%mend;");

    let nested = handlers.document_symbol(symbol_params(uri()), true).await.unwrap();
    let Some(DocumentSymbolResponse::Nested(symbols)) = nested else {
        panic!("expected nested symbols");
    };
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "m");
    assert_eq!(symbols[0].children.as_ref().map(Vec::len), Some(1));

    let flat = handlers.document_symbol(symbol_params(uri()), false).await.unwrap();
    let Some(DocumentSymbolResponse::Flat(symbols)) = flat else {
        panic!("expected flat symbols");
    };
    let names: Vec<(&str, Option<&str>)> = symbols
        .iter()
        .map(|s| (s.name.as_str(), s.container_name.as_deref()))
        .collect();
    assert_eq!(names, vec![("m", None), ("print", Some("m"))]);
    assert_eq!(symbols[1].location.uri, uri());
}

/// Test: textDocument/formatting and textDocument/foldingRange
#[tokio::test]
async fn test_formatting_and_folding_handlers() {
    let handlers = create_handlers("data x;  \n  set y;\nrun;");

    let edits = handlers.formatting(formatting_params(uri())).await.unwrap().unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].range, Range::new(Position::new(0, 7), Position::new(0, 9)));

    let folds = handlers.folding_range(folding_params(uri())).await.unwrap().unwrap();
    assert_eq!(folds.len(), 1);
    assert_eq!((folds[0].start_line, folds[0].end_line), (0, 2));
}

/// Test: Requests for unknown documents get neutral responses
#[tokio::test]
async fn test_unknown_document_fallbacks() {
    let handlers = Handlers::new(Arc::new(Workspace::default()));
    let missing = Url::parse("file:///missing.sas").unwrap();

    let tokens = handlers.semantic_tokens_full(tokens_params(missing.clone())).await.unwrap();
    assert_eq!(serde_json::to_value(tokens).unwrap(), json!({ "data": [] }));

    let completion = handlers.completion(completion_params(missing.clone(), 0, 0)).await.unwrap();
    assert_eq!(
        serde_json::to_value(completion).unwrap(),
        json!({ "isIncomplete": false, "items": [] })
    );

    assert_eq!(handlers.hover(hover_params(missing.clone(), 0, 0)).await.unwrap(), None);
    let edits = handlers.formatting(formatting_params(missing.clone())).await.unwrap();
    assert_eq!(edits, Some(vec![]));
    let folds = handlers.folding_range(folding_params(missing.clone())).await.unwrap();
    assert_eq!(folds, Some(vec![]));
    assert!(handlers.symbols(&missing).await.is_empty());
    let symbols = handlers.document_symbol(symbol_params(missing), true).await.unwrap();
    assert_eq!(serde_json::to_value(symbols).unwrap(), json!([]));
}

/// Test: A failing analysis degrades to the same neutral responses
#[tokio::test]
async fn test_analysis_failure_fallbacks() {
    let handlers = create_handlers("data x;\0run;");

    let tokens = handlers.semantic_tokens_full(tokens_params(uri())).await.unwrap();
    assert_eq!(serde_json::to_value(tokens).unwrap(), json!({ "data": [] }));
    assert_eq!(handlers.hover(hover_params(uri(), 0, 1)).await.unwrap(), None);
    // Each request retries the build
    assert_eq!(handlers.stats().failed_builds, 2);
}

/// Test: Changes are visible to the next request, closes remove the document
#[tokio::test]
async fn test_document_sync_handlers() {
    let handlers = create_handlers("data a; run;");

    handlers.did_change(DidChangeTextDocumentParams {
        text_document: VersionedTextDocumentIdentifier { uri: uri(), version: 2 },
        content_changes: vec![TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(0, 5), Position::new(0, 6))),
            range_length: None,
            text: "b".to_string(),
        }],
    });
    let symbols = handlers.symbols(&uri()).await;
    assert_eq!(symbols[0].name, "b");

    handlers.did_close(DidCloseTextDocumentParams { text_document: document(uri()) });
    assert!(handlers.symbols(&uri()).await.is_empty());
    assert_eq!(handlers.stats().document_count, 0);

    // A second close is logged and ignored
    handlers.did_close(DidCloseTextDocumentParams { text_document: document(uri()) });
}
