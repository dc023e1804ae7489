//! ICS Language Server Protocol implementation for editor integration.
//!
//! Provides lint diagnostics as the document changes, tag and key
//! completion, hover descriptions, folding ranges for matched tag pairs,
//! and document state management for open files. Connects to editors via
//! the `ics lsp` CLI subcommand over stdio.

pub mod completion;
pub mod diagnostics;
pub mod document;
pub mod folding;
pub mod hover;
pub mod server;
pub mod workspace;

/// Run the LSP server over stdio. This is the public entry point
/// called by `ics lsp`.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    server::run()
}
