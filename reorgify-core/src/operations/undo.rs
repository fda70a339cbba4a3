use crate::journal::Journal;
use crate::output::UndoResult;
use crate::progress::LogSink;
use crate::undo::undo_batch;
use anyhow::Result;

/// Undo request: a batch id, or the most recent batch when omitted
#[derive(Debug, Clone, Default)]
pub struct UndoRequest {
    pub batch_id: Option<String>,
}

/// High-level undo operation - equivalent to `reorgify undo`
pub fn undo_operation(
    req: &UndoRequest,
    journal: &Journal,
    log: &dyn LogSink,
) -> Result<UndoResult> {
    let report = match undo_batch(journal, req.batch_id.as_deref()) {
        Ok(report) => report,
        Err(e) => {
            return Ok(UndoResult {
                success: false,
                message: format!("{e:#}"),
                batch_id: req.batch_id.clone().unwrap_or_default(),
                success_count: 0,
                failed_count: 0,
            })
        },
    };

    for error in &report.errors {
        log.on_log(&format!("undo error: {error}"));
    }

    Ok(UndoResult {
        success: true,
        message: format!(
            "undo complete: {} reverted, {} failed",
            report.success_count, report.failed_count
        ),
        batch_id: report.batch_id,
        success_count: report.success_count,
        failed_count: report.failed_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Batch;
    use crate::plan::{Operation, Plan, PlanMode};
    use crate::progress::NULL_SINK;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_unknown_batch_is_failed_result() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let req = UndoRequest {
            batch_id: Some("nope".to_string()),
        };
        let result = undo_operation(&req, &journal, &NULL_SINK).unwrap();
        assert!(!result.success);
        assert!(result.message.contains("not found"));
    }

    #[test]
    fn test_undo_most_recent_by_default() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::open(temp.path().join("journal")).unwrap();
        let root = temp.path().join("d");
        let moved = root.join("b.txt");
        touch(&moved);

        let plan = Plan::new(&root, PlanMode::Rename, vec![]);
        let batch = Batch::from_applied(&plan, vec![Operation::moving(root.join("a.txt"), &moved)]);
        journal.record(&batch).unwrap();

        let result = undo_operation(&UndoRequest::default(), &journal, &NULL_SINK).unwrap();
        assert!(result.success);
        assert_eq!(result.batch_id, batch.id);
        assert_eq!(result.success_count, 1);
        assert!(root.join("a.txt").exists());
    }
}
