//! LSP server main loop with request/notification dispatch.
//!
//! Uses `lsp-server` (synchronous, crossbeam-based) for the transport.
//! Linting is synchronous and fast, so every change is linted inline.

use lsp_server::{Connection, Message, Notification, Response};
use lsp_types::notification::{
    DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, DidSaveTextDocument,
    Notification as _, PublishDiagnostics,
};
use lsp_types::request::{Completion, FoldingRangeRequest, HoverRequest};
use lsp_types::{
    CompletionOptions, CompletionResponse, FoldingRangeProviderCapability,
    HoverProviderCapability, PositionEncodingKind, PublishDiagnosticsParams, SaveOptions,
    ServerCapabilities, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Uri,
};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::completion;
use crate::diagnostics;
use crate::document::DocumentState;
use crate::folding;
use crate::hover;
use crate::workspace::{infer_workspace_root, Workspace};

/// Run the LSP server over stdio until shutdown.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, io_threads) = Connection::stdio();

    // ── Initialize handshake ──────────────────────────────────────────
    let server_capabilities = build_capabilities();
    let init_json = serde_json::to_value(&server_capabilities)?;
    let init_params: lsp_types::InitializeParams =
        serde_json::from_value(connection.initialize(init_json)?)?;

    let mut workspace = match extract_workspace_root(&init_params) {
        Some(root) => Workspace::load(&root),
        None => Workspace::unrooted(),
    };
    info!(root = ?workspace.root(), "language server initialised");

    // ── Main loop ─────────────────────────────────────────────────────
    let mut doc_state = DocumentState::new();

    for msg in &connection.receiver {
        match msg {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    break;
                }
                handle_request(&connection, &doc_state, req)?;
            }
            Message::Notification(not) => {
                handle_notification(&connection, &mut doc_state, &mut workspace, not)?;
            }
            Message::Response(_) => {
                // Ignore responses (we don't send requests to the client)
            }
        }
    }

    io_threads.join()?;
    Ok(())
}

/// Extract workspace root path from InitializeParams.
#[allow(deprecated)] // root_path/root_uri are deprecated but still sent by some clients
fn extract_workspace_root(params: &lsp_types::InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return Some(uri_to_path(&folder.uri));
    }
    if let Some(root_uri) = &params.root_uri {
        return Some(uri_to_path(root_uri));
    }
    params
        .root_path
        .as_ref()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

pub fn build_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        position_encoding: Some(PositionEncodingKind::UTF16),
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(false),
                })),
                ..Default::default()
            },
        )),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec!["<".into(), ">".into()]),
            resolve_provider: Some(false),
            ..Default::default()
        }),
        folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
        ..Default::default()
    }
}

fn handle_request(
    connection: &Connection,
    doc_state: &DocumentState,
    req: lsp_server::Request,
) -> Result<(), Box<dyn std::error::Error>> {
    use lsp_types::request::Request as _;

    let resp = if req.method == HoverRequest::METHOD {
        let params: lsp_types::HoverParams = serde_json::from_value(req.params)?;
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let content = get_document_content(doc_state, uri);
        let result = hover::compute_hover(position, &content);
        Response::new_ok(req.id, serde_json::to_value(result)?)
    } else if req.method == Completion::METHOD {
        let params: lsp_types::CompletionParams = serde_json::from_value(req.params)?;
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let content = get_document_content(doc_state, uri);
        let items = completion::compute_completions(position, &content);
        Response::new_ok(req.id, serde_json::to_value(CompletionResponse::Array(items))?)
    } else if req.method == FoldingRangeRequest::METHOD {
        let params: lsp_types::FoldingRangeParams = serde_json::from_value(req.params)?;
        let content = get_document_content(doc_state, &params.text_document.uri);
        let ranges = folding::compute_folding_ranges(&content);
        Response::new_ok(req.id, serde_json::to_value(Some(ranges))?)
    } else {
        Response::new_err(
            req.id,
            lsp_server::ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        )
    };
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

/// Get document content either from open documents or from disk.
fn get_document_content(doc_state: &DocumentState, uri: &Uri) -> String {
    match doc_state.get(uri.as_str()) {
        Some(doc) => doc.content.clone(),
        None => std::fs::read_to_string(uri_to_path(uri)).unwrap_or_default(),
    }
}

fn handle_notification(
    connection: &Connection,
    doc_state: &mut DocumentState,
    workspace: &mut Workspace,
    not: Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    match not.method.as_str() {
        m if m == DidOpenTextDocument::METHOD => {
            let params: lsp_types::DidOpenTextDocumentParams = serde_json::from_value(not.params)?;
            let uri = params.text_document.uri;
            let path = uri_to_path(&uri);

            // Editors that send no root get one inferred from the first file.
            if workspace.root().is_none() {
                if let Some(root) = infer_workspace_root(&path) {
                    *workspace = Workspace::load(&root);
                }
            }

            let diags = diagnostics::compute_diagnostics(&params.text_document.text, workspace.provider());
            doc_state.open(uri.as_str(), path, params.text_document.version, params.text_document.text);
            publish_diagnostics(connection, uri, diags)?;
        }
        m if m == DidChangeTextDocument::METHOD => {
            let params: lsp_types::DidChangeTextDocumentParams =
                serde_json::from_value(not.params)?;
            let uri = params.text_document.uri;
            // FULL sync: last content change has the entire document
            if let Some(change) = params.content_changes.into_iter().last() {
                if doc_state.change(uri.as_str(), params.text_document.version, change.text) {
                    publish_current(connection, doc_state, workspace, uri)?;
                } else {
                    debug!(uri = uri.as_str(), "ignored stale change");
                }
            }
        }
        m if m == DidSaveTextDocument::METHOD => {
            let params: lsp_types::DidSaveTextDocumentParams = serde_json::from_value(not.params)?;
            // Spec files may have changed alongside the document.
            workspace.refresh();
            publish_current(connection, doc_state, workspace, params.text_document.uri)?;
        }
        m if m == DidCloseTextDocument::METHOD => {
            let params: lsp_types::DidCloseTextDocumentParams = serde_json::from_value(not.params)?;
            doc_state.close(params.text_document.uri.as_str());
            // Clear diagnostics for closed file
            publish_diagnostics(connection, params.text_document.uri, Vec::new())?;
        }
        _ => {
            // Unknown notification -- ignore
        }
    }
    Ok(())
}

/// Lint the tracked content of `uri` and publish the result.
fn publish_current(
    connection: &Connection,
    doc_state: &DocumentState,
    workspace: &Workspace,
    uri: Uri,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = get_document_content(doc_state, &uri);
    let diags = diagnostics::compute_diagnostics(&content, workspace.provider());
    publish_diagnostics(connection, uri, diags)
}

/// Send `textDocument/publishDiagnostics` notification to the client.
fn publish_diagnostics(
    connection: &Connection,
    uri: Uri,
    diagnostics: Vec<lsp_types::Diagnostic>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = PublishDiagnosticsParams {
        uri,
        diagnostics,
        version: None,
    };
    let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
    connection.sender.send(Message::Notification(not))?;
    Ok(())
}

/// Convert an LSP URI to a file system path.
///
/// Handles `file:///path/to/file` URIs by stripping the scheme and authority
/// and percent-decoding (e.g. `%20` → ` `).
pub fn uri_to_path(uri: &Uri) -> PathBuf {
    let s = uri.as_str();
    if let Some(path) = s.strip_prefix("file://") {
        let decoded = percent_decode(path);
        // On Windows: file:///C:/foo -> C:/foo (strip leading /)
        #[cfg(windows)]
        {
            let decoded = decoded.strip_prefix('/').unwrap_or(&decoded);
            PathBuf::from(decoded)
        }
        #[cfg(not(windows))]
        {
            PathBuf::from(decoded)
        }
    } else {
        PathBuf::from(s)
    }
}

/// Decode percent-encoded bytes in a URI path. Multi-byte UTF-8 sequences
/// are reassembled before conversion.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_decoding_handles_utf8_and_malformed_escapes() {
        assert_eq!(percent_decode("/home/a%20b/caf%C3%A9.ics"), "/home/a b/café.ics");
        assert_eq!(percent_decode("/x%zz"), "/x%zz");
        assert_eq!(percent_decode("/x%2"), "/x%2");
    }

    #[cfg(not(windows))]
    #[test]
    fn file_uri_maps_to_path() {
        let uri: Uri = "file:///tmp/hw%201.ics".parse().unwrap();
        assert_eq!(uri_to_path(&uri), PathBuf::from("/tmp/hw 1.ics"));
    }

    #[test]
    fn capabilities_advertise_folding_and_completion() {
        let caps = build_capabilities();
        assert!(caps.folding_range_provider.is_some());
        assert!(caps.completion_provider.is_some());
        assert!(caps.hover_provider.is_some());
    }
}
