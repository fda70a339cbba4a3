use anyhow::{Context, Result};
use reorgify_core::{
    rename_operation, Config, Journal, MetadataMap, OutputFormat, OutputFormatter, RenameRequest,
    TemplateOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::ConflictArgs;
use crate::dissolve::ensure_newline;
use crate::sinks::ConsoleSink;

#[allow(clippy::too_many_arguments)]
pub fn handle_rename(
    paths: Vec<PathBuf>,
    template: &str,
    metadata_path: Option<&Path>,
    max_description_len: Option<usize>,
    max_name_len: Option<usize>,
    exclude: &str,
    max_concurrency: Option<usize>,
    conflicts: &ConflictArgs,
    preview: bool,
    output: OutputFormat,
    quiet: bool,
    config: &Config,
    journal: &Journal,
) -> Result<i32> {
    let metadata = match metadata_path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read metadata file: {}", path.display()))?;
            serde_json::from_str::<MetadataMap>(&content)
                .with_context(|| format!("failed to parse metadata file: {}", path.display()))?
        },
        None => MetadataMap::new(),
    };

    let defaults = TemplateOptions::default();
    let req = RenameRequest {
        paths,
        template: template.to_string(),
        metadata,
        options: TemplateOptions {
            max_description_len: max_description_len.unwrap_or(defaults.max_description_len),
            max_name_len: max_name_len.unwrap_or(defaults.max_name_len),
        },
        exclude: exclude.to_string(),
        file_conflict: conflicts.file_conflict.into(),
        dir_conflict: conflicts.dir_conflict.into(),
        preview,
        max_concurrency: max_concurrency.unwrap_or(config.defaults.max_concurrency),
    };

    let sink = ConsoleSink::new(quiet);
    let result = rename_operation(&req, journal, &sink, &sink)?;
    print!("{}", ensure_newline(&result.format(output)));
    Ok(i32::from(!result.success))
}
