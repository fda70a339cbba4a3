use crate::journal::{Journal, DEFAULT_LIST_LIMIT};
use crate::output::{HistoryItem, HistoryResult};
use anyhow::Result;

/// History request
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub limit: usize,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// High-level history operation - equivalent to `reorgify history`.
/// Surfaces at most the most recent 20 batches; older records stay on disk
/// and remain undoable by explicit id.
pub fn history_operation(req: &HistoryRequest, journal: &Journal) -> Result<HistoryResult> {
    let limit = if req.limit == 0 {
        DEFAULT_LIST_LIMIT
    } else {
        req.limit.min(DEFAULT_LIST_LIMIT)
    };
    let entries = journal
        .list(limit)?
        .into_iter()
        .map(|batch| HistoryItem {
            id: batch.id,
            timestamp: batch.timestamp,
            mode: batch.mode,
            path: batch.path,
            count: batch.count,
        })
        .collect();
    Ok(HistoryResult { entries })
}
