//! In-process language intelligence, no JSON-RPC and no transport.
//!
//! Pure functions that operate directly on editor buffer content.
//! Uses `lsp-types` for standard data structures (CompletionItem, Position, etc.)
//! and calls them synchronously. No tower-lsp, no async.
//!
//! The editor host wires its completion trigger and hover requests to a
//! `LanguageService` and renders whatever comes back.

pub mod eui;
pub mod vocabulary;

use lsp_types::{CompletionItem, Position};

/// Hover information for a position in the document.
pub struct HoverInfo {
    /// Content to display (plain text or markdown).
    pub content: String,
    /// Optional range the hover applies to.
    pub range: Option<lsp_types::Range>,
}

/// In-process language service. Pure functions, no transport.
pub trait LanguageService {
    /// Compute completions at the given position.
    fn completions(&self, content: &str, pos: Position) -> Vec<CompletionItem>;

    /// Compute hover information at the given position.
    fn hover(&self, content: &str, pos: Position) -> Option<HoverInfo>;
}
