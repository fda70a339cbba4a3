use anyhow::Result;
use reorgify_core::{
    dissolve_operation, Config, DissolveRequest, Journal, OutputFormat, OutputFormatter,
};
use std::path::PathBuf;

use crate::cli::args::ConflictArgs;
use crate::sinks::ConsoleSink;

#[allow(clippy::too_many_arguments)]
#[allow(clippy::fn_params_excessive_bools)]
pub fn handle_dissolve(
    path: PathBuf,
    nested: bool,
    media: bool,
    archive: bool,
    direct: bool,
    exclude: &str,
    threshold: Option<f64>,
    no_similarity: bool,
    max_concurrency: Option<usize>,
    conflicts: &ConflictArgs,
    preview: bool,
    output: OutputFormat,
    quiet: bool,
    config: &Config,
    journal: &Journal,
) -> Result<i32> {
    // With no mode flags, scan for every wrapper shape.
    let all_by_default = !nested && !media && !archive && !direct;

    let req = DissolveRequest {
        path,
        nested: nested || all_by_default,
        media: media || all_by_default,
        archive: archive || all_by_default,
        direct,
        exclude: exclude.to_string(),
        file_conflict: conflicts.file_conflict.into(),
        dir_conflict: conflicts.dir_conflict.into(),
        similarity_threshold: threshold.unwrap_or(config.defaults.similarity_threshold),
        enable_similarity: !no_similarity,
        preview,
        max_concurrency: max_concurrency.unwrap_or(config.defaults.max_concurrency),
    };

    let sink = ConsoleSink::new(quiet);
    let result = dissolve_operation(&req, journal, &sink, &sink)?;
    print!("{}", ensure_newline(&result.format(output)));
    Ok(i32::from(!result.success))
}

pub fn ensure_newline(s: &str) -> String {
    if s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{s}\n")
    }
}
