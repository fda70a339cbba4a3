use crate::conflict::ConflictPolicy;
use crate::error::FatalError;
use crate::executor::{execute_plan, ExecOptions, DEFAULT_MAX_CONCURRENCY};
use crate::journal::{Batch, Journal};
use crate::output::RenameResult;
use crate::plan::{Plan, PlanMode};
use crate::progress::{LogSink, ProgressSink};
use crate::rename::{plan_renames, MetadataMap, RenameTemplate, TemplateOptions};
use crate::walk::parse_exclude_keywords;
use anyhow::Result;
use std::path::PathBuf;

/// Batch-rename request
#[derive(Debug, Clone)]
pub struct RenameRequest {
    /// Files, or directories whose immediate file children are renamed
    pub paths: Vec<PathBuf>,
    /// Naming template with `{field}` placeholders
    pub template: String,
    /// Extra fields per item, keyed by current file name
    pub metadata: MetadataMap,
    pub options: TemplateOptions,
    pub exclude: String,
    pub file_conflict: ConflictPolicy,
    pub dir_conflict: ConflictPolicy,
    pub preview: bool,
    pub max_concurrency: usize,
}

impl Default for RenameRequest {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            template: String::new(),
            metadata: MetadataMap::new(),
            options: TemplateOptions::default(),
            exclude: String::new(),
            file_conflict: ConflictPolicy::Auto,
            dir_conflict: ConflictPolicy::Auto,
            preview: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// High-level batch-rename operation - equivalent to `reorgify rename`
pub fn rename_operation(
    req: &RenameRequest,
    journal: &Journal,
    progress: &dyn ProgressSink,
    log: &dyn LogSink,
) -> Result<RenameResult> {
    let template = match RenameTemplate::parse(&req.template) {
        Ok(template) => template,
        Err(e) => return Ok(RenameResult::failed(format!("{e:#}"))),
    };

    let valid: Vec<PathBuf> = req.paths.iter().filter(|p| p.exists()).cloned().collect();
    if valid.is_empty() {
        return Ok(RenameResult::failed(FatalError::NoValidSources.to_string()));
    }

    let keywords = parse_exclude_keywords(&req.exclude);
    let outcome = plan_renames(&valid, &template, &req.options, &req.metadata, &keywords)?;

    let root = if valid[0].is_dir() {
        valid[0].clone()
    } else {
        valid[0]
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| valid[0].clone())
    };
    let plan = Plan::new(root, PlanMode::Rename, outcome.ops);

    if plan.is_empty() {
        let mut result = RenameResult::failed(FatalError::EmptyPlan.to_string());
        result.total_items = outcome.total;
        result.skipped_count = outcome.unchanged;
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
        Err(e) => return Ok(RenameResult::failed(format!("{e:#}"))),
    };

    let mut operation_id = None;
    if !req.preview && report.applied > 0 {
        let batch = Batch::from_applied(&plan, report.applied_ops.clone());
        if let Err(e) = journal.record(&batch) {
            return Ok(RenameResult::failed(format!(
                "applied {} operations but failed to write the undo journal: {e:#}",
                report.applied
            )));
        }
        operation_id = Some(batch.id);
    }

    let prefix = if req.preview { "preview: " } else { "" };
    Ok(RenameResult {
        success: true,
        message: format!(
            "{prefix}rename complete: {} renamed, {} failed",
            report.applied, report.failed
        ),
        total_items: outcome.total,
        renamed_count: report.applied,
        failed_count: report.failed,
        skipped_count: outcome.unchanged + report.skipped,
        preview: req.preview,
        operation_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NULL_SINK;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_bad_template_fails_fast() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let req = RenameRequest {
            paths: vec![temp.path().to_path_buf()],
            template: "{unclosed".to_string(),
            ..RenameRequest::default()
        };
        let result = rename_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
        assert!(!result.success);
        assert!(result.message.contains("unclosed"));
    }

    #[test]
    fn test_rename_directory_children() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let dir = temp.path().join("shots");
        touch(&dir.join("b.png"));
        touch(&dir.join("a.png"));

        let req = RenameRequest {
            paths: vec![dir.clone()],
            template: "shot_{index}".to_string(),
            ..RenameRequest::default()
        };
        let result = rename_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
        assert!(result.success, "{}", result.message);
        assert_eq!(result.renamed_count, 2);
        assert!(dir.join("shot_1.png").exists());
        assert!(dir.join("shot_2.png").exists());
        assert!(result.operation_id.is_some());
    }

    #[test]
    fn test_rename_undoes_via_journal() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let dir = temp.path().join("docs");
        touch(&dir.join("notes.txt"));

        let req = RenameRequest {
            paths: vec![dir.clone()],
            template: "renamed_{stem}".to_string(),
            ..RenameRequest::default()
        };
        let result = rename_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
        let id = result.operation_id.unwrap();
        assert!(dir.join("renamed_notes.txt").exists());

        let report = crate::undo::undo_batch(&journal, Some(&id)).unwrap();
        assert_eq!(report.success_count, 1);
        assert!(dir.join("notes.txt").exists());
        assert!(!dir.join("renamed_notes.txt").exists());
    }

    #[test]
    fn test_all_identity_renames_is_empty_plan() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let file = temp.path().join("same.txt");
        touch(&file);

        let req = RenameRequest {
            paths: vec![file],
            template: "{stem}".to_string(),
            ..RenameRequest::default()
        };
        let result = rename_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
        assert!(!result.success);
        assert_eq!(result.total_items, 1);
        assert_eq!(result.skipped_count, 1);
    }
}
