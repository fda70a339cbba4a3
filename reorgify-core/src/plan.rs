use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// The kind of a planned filesystem mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Move,
    Copy,
    DeleteDir,
    CreateDir,
}

/// One planned filesystem mutation. `dst` is present iff the kind is
/// `Move` or `Copy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OpKind,
    pub src: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<PathBuf>,
    pub timestamp: String,
}

impl Operation {
    pub fn moving(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            kind: OpKind::Move,
            src: src.into(),
            dst: Some(dst.into()),
            timestamp: now_rfc3339(),
        }
    }

    pub fn copying(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            kind: OpKind::Copy,
            src: src.into(),
            dst: Some(dst.into()),
            timestamp: now_rfc3339(),
        }
    }

    pub fn delete_dir(src: impl Into<PathBuf>) -> Self {
        Self {
            kind: OpKind::DeleteDir,
            src: src.into(),
            dst: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn create_dir(src: impl Into<PathBuf>) -> Self {
        Self {
            kind: OpKind::CreateDir,
            src: src.into(),
            dst: None,
            timestamp: now_rfc3339(),
        }
    }

    /// Same operation with a different destination (after conflict
    /// resolution picked a free name).
    pub fn with_dst(&self, dst: impl Into<PathBuf>) -> Self {
        Self {
            kind: self.kind,
            src: self.src.clone(),
            dst: Some(dst.into()),
            timestamp: now_rfc3339(),
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Which planning strategy (or orchestrated use case) produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    DissolveNested,
    DissolveMedia,
    DissolveArchive,
    DissolveDirect,
    MigratePreserve,
    MigrateFlat,
    MigrateDirect,
    Rename,
    /// Several strategies concatenated into one invocation.
    Mixed,
}

impl fmt::Display for PlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DissolveNested => "dissolve_nested",
            Self::DissolveMedia => "dissolve_media",
            Self::DissolveArchive => "dissolve_archive",
            Self::DissolveDirect => "dissolve_direct",
            Self::MigratePreserve => "migrate_preserve",
            Self::MigrateFlat => "migrate_flat",
            Self::MigrateDirect => "migrate_direct",
            Self::Rename => "rename",
            Self::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// An ordered, immutable sequence of operations bound to a root path and a
/// mode. The executor annotates per-item outcomes in its own report and
/// never reorders or mutates the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub root: PathBuf,
    pub mode: PlanMode,
    pub created_at: String,
    ops: Vec<Operation>,
}

impl Plan {
    pub fn new(root: impl Into<PathBuf>, mode: PlanMode, ops: Vec<Operation>) -> Self {
        Self {
            id: generate_plan_id(),
            root: root.into(),
            mode,
            created_at: now_rfc3339(),
            ops,
        }
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

static PLAN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Timestamp-derived id, monotonic within a process.
pub fn generate_plan_id() -> String {
    let seq = PLAN_SEQ.fetch_add(1, Ordering::SeqCst);
    format!(
        "{}-{:04}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        seq
    )
}
