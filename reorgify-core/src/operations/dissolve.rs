use crate::conflict::ConflictPolicy;
use crate::dissolve::{plan_archive, plan_direct, plan_media, plan_nested, DissolveOutcome};
use crate::error::FatalError;
use crate::executor::{execute_plan, ExecOptions, DEFAULT_MAX_CONCURRENCY};
use crate::journal::{Batch, Journal};
use crate::output::DissolveResult;
use crate::plan::{Operation, Plan, PlanMode};
use crate::progress::{LogSink, ProgressSink};
use crate::similarity::SimilarityGate;
use crate::walk::parse_exclude_keywords;
use anyhow::Result;
use std::path::PathBuf;

/// Dissolve request - shared shape across the orchestrated use cases
#[derive(Debug, Clone)]
pub struct DissolveRequest {
    pub path: PathBuf,
    /// Collapse nested single-subfolder wrappers
    pub nested: bool,
    /// Collapse single-media-file wrappers
    pub media: bool,
    /// Collapse single-archive wrappers
    pub archive: bool,
    /// Dissolve the given directory itself into its parent
    pub direct: bool,
    /// Comma-separated keywords; matching subtrees are pruned during descent
    pub exclude: String,
    pub file_conflict: ConflictPolicy,
    pub dir_conflict: ConflictPolicy,
    pub similarity_threshold: f64,
    pub enable_similarity: bool,
    pub preview: bool,
    pub max_concurrency: usize,
}

impl Default for DissolveRequest {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            nested: true,
            media: true,
            archive: true,
            direct: false,
            exclude: String::new(),
            file_conflict: ConflictPolicy::Auto,
            dir_conflict: ConflictPolicy::Auto,
            similarity_threshold: 0.8,
            enable_similarity: true,
            preview: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// High-level dissolve operation - equivalent to `reorgify dissolve`
pub fn dissolve_operation(
    req: &DissolveRequest,
    journal: &Journal,
    progress: &dyn ProgressSink,
    log: &dyn LogSink,
) -> Result<DissolveResult> {
    if !req.path.exists() {
        return Ok(DissolveResult::failed(
            FatalError::RootNotFound(req.path.clone()).to_string(),
        ));
    }
    if !req.path.is_dir() {
        return Ok(DissolveResult::failed(
            FatalError::NotADirectory(req.path.clone()).to_string(),
        ));
    }

    let keywords = parse_exclude_keywords(&req.exclude);
    let gate = if req.enable_similarity {
        SimilarityGate::new(req.similarity_threshold)
    } else {
        SimilarityGate::disabled()
    };

    let mut ops: Vec<Operation> = Vec::new();
    let mut modes: Vec<PlanMode> = Vec::new();
    let mut gate_skipped = 0usize;
    let mut nested_count = 0usize;
    let mut media_count = 0usize;
    let mut archive_count = 0usize;
    let mut direct_files = 0usize;
    let mut direct_dirs = 0usize;

    if req.direct {
        // Direct mode dissolves the named directory itself; the other
        // strategies scan beneath it.
        let outcome = plan_direct(&req.path)?;
        direct_files = outcome.files;
        direct_dirs = outcome.dirs;
        ops.extend(outcome.ops);
        modes.push(PlanMode::DissolveDirect);
    } else {
        let mut take = |outcome: DissolveOutcome, count: &mut usize, mode: PlanMode| {
            *count = outcome.dissolved;
            gate_skipped += outcome.gate_skipped;
            if !outcome.ops.is_empty() {
                modes.push(mode);
            }
            ops.extend(outcome.ops);
        };
        if req.media {
            take(
                plan_media(&req.path, &keywords, &gate)?,
                &mut media_count,
                PlanMode::DissolveMedia,
            );
        }
        if req.nested {
            take(
                plan_nested(&req.path, &keywords, &gate)?,
                &mut nested_count,
                PlanMode::DissolveNested,
            );
        }
        if req.archive {
            take(
                plan_archive(&req.path, &keywords, &gate)?,
                &mut archive_count,
                PlanMode::DissolveArchive,
            );
        }
    }

    let mode = match modes.as_slice() {
        [single] => *single,
        _ => PlanMode::Mixed,
    };
    let plan = Plan::new(&req.path, mode, ops);

    if plan.is_empty() {
        let mut result = DissolveResult::failed(FatalError::EmptyPlan.to_string());
        result.skipped_count = gate_skipped;
        result.preview = req.preview;
        return Ok(result);
    }

    let opts = ExecOptions {
        preview: req.preview,
        max_concurrency: req.max_concurrency,
        file_conflict: req.file_conflict,
        dir_conflict: req.dir_conflict,
        progress,
        log,
        log_file: if req.preview {
            None
        } else {
            Some(journal.log_path(&plan.id))
        },
    };
    let report = match execute_plan(&plan, &opts) {
        Ok(report) => report,
        Err(e) => return Ok(DissolveResult::failed(format!("{e:#}"))),
    };

    let mut operation_id = None;
    if !req.preview && report.applied > 0 {
        let batch = Batch::from_applied(&plan, report.applied_ops.clone());
        if let Err(e) = journal.record(&batch) {
            return Ok(DissolveResult::failed(format!(
                "applied {} operations but failed to write the undo journal: {e:#}",
                report.applied
            )));
        }
        operation_id = Some(batch.id);
    }

    let prefix = if req.preview { "preview: " } else { "" };
    let message = if req.direct {
        format!(
            "{prefix}dissolved directly: {direct_files} files, {direct_dirs} directories"
        )
    } else {
        let mut parts = Vec::new();
        if req.nested {
            parts.push(format!("nested {nested_count}"));
        }
        if req.media {
            parts.push(format!("media {media_count}"));
        }
        if req.archive {
            parts.push(format!("archive {archive_count}"));
        }
        format!("{prefix}dissolve complete: {}", parts.join(", "))
    };

    Ok(DissolveResult {
        success: true,
        message,
        nested_count,
        media_count,
        archive_count,
        direct_files,
        direct_dirs,
        skipped_count: gate_skipped + report.skipped,
        error_count: report.failed,
        preview: req.preview,
        operation_id,
    })
}
