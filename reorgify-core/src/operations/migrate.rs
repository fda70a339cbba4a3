use crate::conflict::ConflictPolicy;
use crate::error::FatalError;
use crate::executor::{execute_plan, ExecOptions, OutcomeStatus, DEFAULT_MAX_CONCURRENCY};
use crate::journal::{Batch, Journal};
use crate::migrate::{plan_migration, MigrateAction, MigrateMode};
use crate::output::MigrateResult;
use crate::plan::{OpKind, Plan, PlanMode};
use crate::progress::{LogSink, ProgressSink};
use crate::walk::parse_exclude_keywords;
use anyhow::Result;
use std::path::PathBuf;

/// Migration request
#[derive(Debug, Clone)]
pub struct MigrateRequest {
    pub sources: Vec<PathBuf>,
    pub target: PathBuf,
    pub mode: MigrateMode,
    pub action: MigrateAction,
    pub exclude: String,
    pub file_conflict: ConflictPolicy,
    pub dir_conflict: ConflictPolicy,
    pub preview: bool,
    pub max_concurrency: usize,
}

impl Default for MigrateRequest {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            target: PathBuf::new(),
            mode: MigrateMode::Preserve,
            action: MigrateAction::Move,
            exclude: String::new(),
            file_conflict: ConflictPolicy::Auto,
            dir_conflict: ConflictPolicy::Auto,
            preview: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// High-level migrate operation - equivalent to `reorgify migrate`
pub fn migrate_operation(
    req: &MigrateRequest,
    journal: &Journal,
    progress: &dyn ProgressSink,
    log: &dyn LogSink,
) -> Result<MigrateResult> {
    if req.target.as_os_str().is_empty() {
        return Ok(MigrateResult::failed(FatalError::MissingTarget.to_string()));
    }

    let mut valid = Vec::new();
    let mut missing = 0usize;
    for source in &req.sources {
        if source.exists() {
            valid.push(source.clone());
        } else {
            missing += 1;
            log.on_log(&format!("skipping missing source: {}", source.display()));
        }
    }
    if valid.is_empty() {
        return Ok(MigrateResult::failed(
            FatalError::NoValidSources.to_string(),
        ));
    }

    let keywords = parse_exclude_keywords(&req.exclude);
    let outcome = plan_migration(&valid, &req.target, req.mode, req.action, &keywords)?;

    let plan_mode = match req.mode {
        MigrateMode::Preserve => PlanMode::MigratePreserve,
        MigrateMode::Flat => PlanMode::MigrateFlat,
        MigrateMode::Direct => PlanMode::MigrateDirect,
    };
    // The plan is rooted where the migration originates; the target root
    // may not exist yet (its creation is the plan's first operation).
    let root = valid[0].parent().unwrap_or(&valid[0]).to_path_buf();
    let plan = Plan::new(root, plan_mode, outcome.ops);

    if outcome.planned == 0 {
        let mut result = MigrateResult::failed(FatalError::EmptyPlan.to_string());
        result.skipped_count = missing;
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
        Err(e) => return Ok(MigrateResult::failed(format!("{e:#}"))),
    };

    let mut operation_id = None;
    if !req.preview && report.applied > 0 {
        let batch = Batch::from_applied(&plan, report.applied_ops.clone());
        if let Err(e) = journal.record(&batch) {
            return Ok(MigrateResult::failed(format!(
                "applied {} operations but failed to write the undo journal: {e:#}",
                report.applied
            )));
        }
        operation_id = Some(batch.id);
    }

    let migrated_count = report.count(OutcomeStatus::Applied, &[OpKind::Move, OpKind::Copy]);
    let skipped_count = missing + report.skipped;
    let action_text = match req.action {
        MigrateAction::Move => "move",
        MigrateAction::Copy => "copy",
    };
    let prefix = if req.preview { "preview: " } else { "" };
    let message = format!(
        "{prefix}{action_text} complete: {migrated_count} migrated, {skipped_count} skipped, {} failed",
        report.failed
    );

    Ok(MigrateResult {
        success: true,
        message,
        migrated_count,
        skipped_count,
        error_count: report.failed,
        total_count: outcome.planned + missing,
        preview: req.preview,
        operation_id,
    })
}
