use crate::plan::{Operation, Plan};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Listing returns at most this many batches unless the caller asks for
/// fewer. Older records stay on disk and remain undoable by explicit id.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// The persisted, undoable unit of operations from one apply-mode run.
/// Operations are stored in application order and undone in strict reverse
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub timestamp: String,
    pub mode: String,
    pub path: PathBuf,
    pub operations: Vec<Operation>,
    pub count: usize,
}

impl Batch {
    /// Build the record for a non-preview run from the operations that
    /// were actually applied (with their effective destinations).
    pub fn from_applied(plan: &Plan, applied: Vec<Operation>) -> Self {
        let count = applied.len();
        Self {
            id: plan.id.clone(),
            timestamp: chrono::Local::now().to_rfc3339(),
            mode: plan.mode.to_string(),
            path: plan.root.clone(),
            operations: applied,
            count,
        }
    }
}

/// On-disk journal of applied batches: one `<id>.json` per batch under a
/// fixed per-user directory, plus per-run log files under `logs/`.
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    /// Open (creating if needed) the per-user journal directory.
    pub fn open_default() -> Result<Self> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("could not determine the user data directory"))?;
        Self::open(base.join("reorgify").join("journal"))
    }

    /// Open a journal rooted at an explicit directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create journal directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the executor writes the log for one run.
    pub fn log_path(&self, id: &str) -> PathBuf {
        self.dir.join("logs").join(format!("{id}.log"))
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Persist a batch as `<id>.json`.
    pub fn record(&self, batch: &Batch) -> Result<()> {
        let path = self.record_path(&batch.id);
        let json = serde_json::to_string_pretty(batch)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write batch record: {}", path.display()))?;
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Batch> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(anyhow!("batch '{}' not found", id));
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read batch record: {}", path.display()))?;
        let batch = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse batch record: {}", path.display()))?;
        Ok(batch)
    }

    /// The most recent batch by timestamp, if any.
    pub fn latest(&self) -> Result<Option<Batch>> {
        Ok(self.list(1)?.into_iter().next())
    }

    /// The `limit` most recent batches, most-recent-first by timestamp.
    pub fn list(&self, limit: usize) -> Result<Vec<Batch>> {
        let mut batches = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read journal directory: {}", self.dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // A record that no longer parses should not hide the rest of
            // the journal.
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| serde_json::from_str::<Batch>(&content).map_err(Into::into))
            {
                Ok(batch) => batches.push(batch),
                Err(_) => continue,
            }
        }
        batches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        batches.truncate(limit);
        Ok(batches)
    }

    /// Remove a batch record wholesale. A batch is never partially deleted.
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to delete batch record: {}", path.display()))?;
        }
        Ok(())
    }
}
