//! EUI authoring support: completion engine and run command.
//!
//! `lsp` answers completion and hover requests for EUI markup as pure
//! functions; `runner` finds a Python interpreter and launches the packaged
//! EUI interpreter script against a document.

pub mod config;
pub mod lsp;
pub mod runner;
