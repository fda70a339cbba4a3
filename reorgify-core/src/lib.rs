#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod conflict;
pub mod dissolve;
pub mod error;
pub mod executor;
pub mod journal;
pub mod migrate;
pub mod operations;
pub mod output;
pub mod plan;
pub mod progress;
pub mod rename;
pub mod similarity;
pub mod undo;
pub mod walk;

pub use config::Config;
pub use conflict::{free_name, resolve, ConflictPolicy, Resolution};
pub use error::FatalError;
pub use executor::{
    execute_plan, ExecOptions, ExecReport, ItemOutcome, OutcomeStatus, DEFAULT_MAX_CONCURRENCY,
    MAX_CONCURRENCY_CAP,
};
pub use journal::{Batch, Journal, DEFAULT_LIST_LIMIT};
pub use migrate::{plan_migration, MigrateAction, MigrateMode};
pub use operations::{
    dissolve_operation, history_operation, migrate_operation, rename_operation, undo_operation,
    DissolveRequest, HistoryRequest, MigrateRequest, RenameRequest, UndoRequest,
};
pub use output::{
    DissolveResult, HistoryItem, HistoryResult, MigrateResult, OutputFormat, OutputFormatter,
    RenameResult, UndoResult,
};
pub use plan::{generate_plan_id, OpKind, Operation, Plan, PlanMode};
pub use progress::{ChannelLogSink, LogSink, NullSink, ProgressSink, ProgressThrottle, NULL_SINK};
pub use rename::{plan_renames, MetadataMap, RenameTemplate, TemplateOptions};
pub use similarity::{name_similarity, MatchResult, SimilarityGate};
pub use undo::{undo_batch, UndoReport};
pub use walk::parse_exclude_keywords;
