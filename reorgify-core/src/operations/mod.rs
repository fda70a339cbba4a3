//! High-level operations that correspond to CLI commands
//!
//! These modules contain the core business logic for each reorgify
//! operation, separated from CLI concerns like argument parsing and output
//! formatting. Each takes a request shaped like the external interface,
//! validates roots up front (fatal problems return a single failed result
//! before any mutation), and hands the planned operations to the executor.

pub mod dissolve;
pub mod history;
pub mod migrate;
pub mod rename;
pub mod undo;

// Re-export the main operation functions for easy access
pub use dissolve::{dissolve_operation, DissolveRequest};
pub use history::{history_operation, HistoryRequest};
pub use migrate::{migrate_operation, MigrateRequest};
pub use rename::{rename_operation, RenameRequest};
pub use undo::{undo_operation, UndoRequest};
