use crate::executor::move_path;
use crate::journal::{Batch, Journal};
use crate::plan::OpKind;
use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

/// Per-step tallies from replaying one batch in reverse.
#[derive(Debug, Default)]
pub struct UndoReport {
    pub batch_id: String,
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
}

/// Undo a batch by id, or the most recent one when no id is given.
///
/// Operations are replayed in strict reverse order: a move is undone by
/// moving its destination back to its source (recreating the source's
/// parent as needed), a copy by removing the copy, a directory deletion by
/// recreating the directory (its prior contents are not restorable), a
/// directory creation by removing the directory if it is empty. Each step
/// succeeds or fails independently; the batch record is consumed once the
/// attempt completes, whether or not every step succeeded.
pub fn undo_batch(journal: &Journal, id: Option<&str>) -> Result<UndoReport> {
    let batch = match id {
        Some(id) => journal.load(id)?,
        None => journal
            .latest()?
            .ok_or_else(|| anyhow!("no batches to undo"))?,
    };

    let mut report = UndoReport {
        batch_id: batch.id.clone(),
        ..UndoReport::default()
    };
    for op in batch.operations.iter().rev() {
        match undo_step(&batch, op) {
            Ok(()) => report.success_count += 1,
            Err(e) => {
                report.failed_count += 1;
                report.errors.push(format!("{}: {e:#}", op.src.display()));
            },
        }
    }

    // Consumed wholesale regardless of step failures; a partial undo is
    // not retryable from the journal.
    journal.delete(&batch.id)?;
    Ok(report)
}

fn undo_step(batch: &Batch, op: &crate::plan::Operation) -> Result<()> {
    match op.kind {
        OpKind::Move => {
            let dst = op
                .dst
                .as_deref()
                .ok_or_else(|| anyhow!("move in batch '{}' has no destination", batch.id))?;
            if !dst.exists() {
                return Err(anyhow!("'{}' no longer exists", dst.display()));
            }
            if let Some(parent) = op.src.parent() {
                fs::create_dir_all(parent)?;
            }
            move_path(dst, &op.src)
        },
        OpKind::Copy => {
            let dst = op
                .dst
                .as_deref()
                .ok_or_else(|| anyhow!("copy in batch '{}' has no destination", batch.id))?;
            remove_any(dst)
        },
        OpKind::DeleteDir => {
            fs::create_dir_all(&op.src)?;
            Ok(())
        },
        OpKind::CreateDir => {
            if !op.src.exists() {
                return Ok(());
            }
            // Only an empty directory is safe to take back.
            fs::remove_dir(&op.src)
                .map_err(|e| anyhow!("could not remove '{}': {e}", op.src.display()))
        },
    }
}

fn remove_any(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
