use anyhow::Result;
use reorgify_core::{
    migrate_operation, Config, Journal, MigrateRequest, OutputFormat, OutputFormatter,
};
use std::path::PathBuf;

use crate::cli::args::ConflictArgs;
use crate::cli::types::{ActionArg, MigrateModeArg};
use crate::dissolve::ensure_newline;
use crate::sinks::ConsoleSink;

#[allow(clippy::too_many_arguments)]
pub fn handle_migrate(
    sources: Vec<PathBuf>,
    target: PathBuf,
    mode: MigrateModeArg,
    action: ActionArg,
    exclude: &str,
    max_concurrency: Option<usize>,
    conflicts: &ConflictArgs,
    preview: bool,
    output: OutputFormat,
    quiet: bool,
    config: &Config,
    journal: &Journal,
) -> Result<i32> {
    let req = MigrateRequest {
        sources,
        target,
        mode: mode.into(),
        action: action.into(),
        exclude: exclude.to_string(),
        file_conflict: conflicts.file_conflict.into(),
        dir_conflict: conflicts.dir_conflict.into(),
        preview,
        max_concurrency: max_concurrency.unwrap_or(config.defaults.max_concurrency),
    };

    let sink = ConsoleSink::new(quiet);
    let result = migrate_operation(&req, journal, &sink, &sink)?;
    print!("{}", ensure_newline(&result.format(output)));
    Ok(i32::from(!result.success))
}
