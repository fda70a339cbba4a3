use crate::conflict::{resolve, ConflictPolicy, Resolution};
use crate::error::FatalError;
use crate::plan::{OpKind, Operation, Plan};
use crate::progress::{LogSink, ProgressSink, ProgressThrottle, NULL_SINK};
use crate::walk::{entry_name, list_dir};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY_CAP: usize = 16;

/// How to run a plan.
pub struct ExecOptions<'a> {
    /// Run every gate and conflict decision, count every would-be
    /// operation, mutate nothing.
    pub preview: bool,
    pub max_concurrency: usize,
    pub file_conflict: ConflictPolicy,
    pub dir_conflict: ConflictPolicy,
    pub progress: &'a dyn ProgressSink,
    pub log: &'a dyn LogSink,
    /// Append-only run log on disk, created with its parents.
    pub log_file: Option<PathBuf>,
}

impl<'a> ExecOptions<'a> {
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            file_conflict: ConflictPolicy::Auto,
            dir_conflict: ConflictPolicy::Auto,
            progress: &NULL_SINK,
            log: &NULL_SINK,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Applied,
    Skipped,
    Failed,
}

/// The executor's annotation for one plan entry. The plan itself is never
/// mutated.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub op_index: usize,
    pub kind: OpKind,
    pub status: OutcomeStatus,
    pub note: Option<String>,
}

/// Aggregated result of one run.
#[derive(Debug, Default)]
pub struct ExecReport {
    pub preview: bool,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<ItemOutcome>,
    /// Operations actually performed, with their effective destinations,
    /// in application order. Empty for previews.
    pub applied_ops: Vec<Operation>,
}

impl ExecReport {
    /// Count outcomes with the given status among the given kinds.
    pub fn count(&self, status: OutcomeStatus, kinds: &[OpKind]) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == status && kinds.contains(&o.kind))
            .count()
    }
}

struct Tally {
    applied: usize,
    skipped: usize,
    failed: usize,
    processed: usize,
    outcomes: Vec<ItemOutcome>,
    applied_ops: Vec<Operation>,
    throttle: ProgressThrottle,
}

struct RunState<'a> {
    opts: &'a ExecOptions<'a>,
    total: usize,
    tally: Mutex<Tally>,
    log_file: Option<Mutex<File>>,
}

impl<'a> RunState<'a> {
    fn new(opts: &'a ExecOptions<'a>, total: usize) -> Result<Self> {
        let log_file = match &opts.log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create log directory: {}", parent.display())
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file: {}", path.display()))?;
                Some(Mutex::new(file))
            },
            None => None,
        };
        Ok(Self {
            opts,
            total,
            tally: Mutex::new(Tally {
                applied: 0,
                skipped: 0,
                failed: 0,
                processed: 0,
                outcomes: Vec::new(),
                applied_ops: Vec::new(),
                throttle: ProgressThrottle::default(),
            }),
            log_file,
        })
    }

    fn log(&self, line: &str) {
        self.opts.log.on_log(line);
        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(
                    file,
                    "[{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    line
                );
            }
        }
    }

    fn complete(
        &self,
        idx: usize,
        op: &Operation,
        status: OutcomeStatus,
        note: Option<String>,
        effective: Option<Operation>,
    ) {
        let mut tally = self.tally.lock().unwrap();
        match status {
            OutcomeStatus::Applied => tally.applied += 1,
            OutcomeStatus::Skipped => tally.skipped += 1,
            OutcomeStatus::Failed => tally.failed += 1,
        }
        if let Some(effective) = effective {
            tally.applied_ops.push(effective);
        }
        tally.outcomes.push(ItemOutcome {
            op_index: idx,
            kind: op.kind,
            status,
            note,
        });
        tally.processed += 1;
        let percent = (tally.processed * 100 / self.total) as u8;
        let message = entry_name(&op.src);
        tally
            .throttle
            .update(self.opts.progress, percent, &message);
    }
}

/// Apply (or preview) a plan.
///
/// Consecutive file-level Move/Copy operations fan out across a bounded
/// worker pool; directory-level operations always run sequentially, in plan
/// order, because they mutate shared parent state and emptiness checks. A
/// missing root or an empty plan is a whole-run failure returned before any
/// mutation; every per-item problem is caught, recorded with a reason, and
/// does not abort the batch.
pub fn execute_plan(plan: &Plan, opts: &ExecOptions) -> Result<ExecReport> {
    if !plan.root().exists() {
        return Err(FatalError::RootNotFound(plan.root().to_path_buf()).into());
    }
    if plan.is_empty() {
        return Err(FatalError::EmptyPlan.into());
    }

    let state = RunState::new(opts, plan.len())?;
    state.log(&format!(
        "{}run {} ({}, {} operations) on {}",
        if opts.preview { "preview " } else { "" },
        plan.id,
        plan.mode,
        plan.len(),
        plan.root().display(),
    ));
    {
        let mut tally = state.tally.lock().unwrap();
        tally.throttle.update(opts.progress, 0, "starting");
    }

    let ops = plan.ops();
    if opts.preview {
        for (idx, op) in ops.iter().enumerate() {
            exec_one(&state, idx, op);
        }
    } else {
        let threads = opts.max_concurrency.clamp(1, MAX_CONCURRENCY_CAP);
        let pool = if threads > 1 && ops.iter().any(|op| is_pooled(op)) {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .context("failed to build worker pool")?,
            )
        } else {
            None
        };

        let mut idx = 0;
        while idx < ops.len() {
            let pooled_end = if is_pooled(&ops[idx]) {
                let mut end = idx;
                while end < ops.len() && is_pooled(&ops[end]) {
                    end += 1;
                }
                end
            } else {
                idx
            };

            if let (Some(pool), true) = (&pool, pooled_end > idx + 1) {
                let chunk = &ops[idx..pooled_end];
                pool.install(|| {
                    chunk
                        .par_iter()
                        .enumerate()
                        .for_each(|(offset, op)| exec_one(&state, idx + offset, op));
                });
                idx = pooled_end;
            } else {
                exec_one(&state, idx, &ops[idx]);
                idx += 1;
            }
        }
    }

    let mut tally = state.tally.lock().unwrap();
    tally.throttle.finish(opts.progress);
    if tally.throttle.last_sent() != Some(100) {
        tally.throttle.update(opts.progress, 100, "complete");
    }
    state.log(&format!(
        "{}done: {} applied, {} skipped, {} failed",
        if opts.preview { "preview " } else { "" },
        tally.applied,
        tally.skipped,
        tally.failed,
    ));

    Ok(ExecReport {
        preview: opts.preview,
        applied: tally.applied,
        skipped: tally.skipped,
        failed: tally.failed,
        outcomes: std::mem::take(&mut tally.outcomes),
        applied_ops: std::mem::take(&mut tally.applied_ops),
    })
}

/// Only file-level transfers are safe to parallelize; they target
/// independent destinations.
fn is_pooled(op: &Operation) -> bool {
    matches!(op.kind, OpKind::Move | OpKind::Copy) && op.src.is_file()
}

fn exec_one(state: &RunState, idx: usize, op: &Operation) {
    let (status, note, effective) = if state.opts.preview {
        preview_one(state, op)
    } else {
        apply_one(state, op)
    };
    state.complete(idx, op, status, note, effective);
}

fn preview_one(state: &RunState, op: &Operation) -> (OutcomeStatus, Option<String>, Option<Operation>) {
    match op.kind {
        OpKind::CreateDir => {
            if op.src.exists() {
                (OutcomeStatus::Skipped, Some("already exists".into()), None)
            } else {
                state.log(&format!("would mkdir {}", op.src.display()));
                (OutcomeStatus::Applied, None, None)
            }
        },
        OpKind::DeleteDir => {
            if op.src.exists() {
                state.log(&format!("would delete {}", op.src.display()));
                (OutcomeStatus::Applied, None, None)
            } else {
                (OutcomeStatus::Skipped, Some("missing".into()), None)
            }
        },
        OpKind::Move | OpKind::Copy => {
            let Some(dst) = op.dst.as_deref() else {
                return (
                    OutcomeStatus::Failed,
                    Some("operation has no destination".into()),
                    None,
                );
            };
            if !op.src.exists() {
                return (
                    OutcomeStatus::Failed,
                    Some("source no longer exists".into()),
                    None,
                );
            }
            match resolve(&op.src, dst, state.opts.file_conflict, state.opts.dir_conflict) {
                Resolution::Skip => {
                    state.log(&format!("would skip (destination exists): {}", dst.display()));
                    (OutcomeStatus::Skipped, Some("destination exists".into()), None)
                },
                Resolution::Renamed(new_dst) => {
                    state.log(&format!(
                        "would {} {} -> {}",
                        verb(op.kind),
                        op.src.display(),
                        new_dst.display()
                    ));
                    (OutcomeStatus::Applied, None, None)
                },
                Resolution::Proceed | Resolution::Replace | Resolution::Merge => {
                    state.log(&format!(
                        "would {} {} -> {}",
                        verb(op.kind),
                        op.src.display(),
                        dst.display()
                    ));
                    (OutcomeStatus::Applied, None, None)
                },
            }
        },
    }
}

fn apply_one(state: &RunState, op: &Operation) -> (OutcomeStatus, Option<String>, Option<Operation>) {
    match try_apply(state, op) {
        Ok(done) => done,
        Err(e) => {
            state.log(&format!("error {}: {e:#}", op.src.display()));
            (OutcomeStatus::Failed, Some(format!("{e:#}")), None)
        },
    }
}

fn try_apply(
    state: &RunState,
    op: &Operation,
) -> Result<(OutcomeStatus, Option<String>, Option<Operation>)> {
    match op.kind {
        OpKind::CreateDir => {
            if op.src.exists() {
                return Ok((OutcomeStatus::Skipped, Some("already exists".into()), None));
            }
            fs::create_dir_all(&op.src)
                .with_context(|| format!("failed to create {}", op.src.display()))?;
            state.log(&format!("mkdir {}", op.src.display()));
            Ok((OutcomeStatus::Applied, None, Some(op.clone())))
        },
        OpKind::DeleteDir => {
            if !op.src.exists() {
                return Ok((OutcomeStatus::Skipped, Some("missing".into()), None));
            }
            // Never delete content that earlier skips left behind.
            if subtree_has_files(&op.src) {
                state.log(&format!("skip delete (not empty): {}", op.src.display()));
                return Ok((OutcomeStatus::Skipped, Some("not empty".into()), None));
            }
            fs::remove_dir_all(&op.src)
                .with_context(|| format!("failed to delete {}", op.src.display()))?;
            state.log(&format!("delete {}", op.src.display()));
            Ok((OutcomeStatus::Applied, None, Some(op.clone())))
        },
        OpKind::Move | OpKind::Copy => {
            let Some(dst) = op.dst.clone() else {
                return Ok((
                    OutcomeStatus::Failed,
                    Some("operation has no destination".into()),
                    None,
                ));
            };
            if !op.src.exists() {
                return Ok((
                    OutcomeStatus::Failed,
                    Some("source no longer exists".into()),
                    None,
                ));
            }
            match resolve(&op.src, &dst, state.opts.file_conflict, state.opts.dir_conflict) {
                Resolution::Skip => {
                    state.log(&format!("skip (destination exists): {}", dst.display()));
                    Ok((OutcomeStatus::Skipped, Some("destination exists".into()), None))
                },
                Resolution::Proceed => {
                    transfer(state, op.kind, &op.src, &dst)?;
                    Ok((OutcomeStatus::Applied, None, Some(op.clone())))
                },
                Resolution::Renamed(new_dst) => {
                    transfer(state, op.kind, &op.src, &new_dst)?;
                    Ok((OutcomeStatus::Applied, None, Some(op.with_dst(new_dst))))
                },
                Resolution::Replace => {
                    let removed = if dst.is_dir() {
                        fs::remove_dir_all(&dst)
                    } else {
                        fs::remove_file(&dst)
                    };
                    removed.with_context(|| format!("failed to replace {}", dst.display()))?;
                    transfer(state, op.kind, &op.src, &dst)?;
                    Ok((OutcomeStatus::Applied, None, Some(op.clone())))
                },
                Resolution::Merge => {
                    merge_directories(
                        &op.src,
                        &dst,
                        op.kind,
                        state.opts.file_conflict,
                        state.opts.dir_conflict,
                    )?;
                    if op.kind == OpKind::Move && !subtree_has_files(&op.src) {
                        fs::remove_dir_all(&op.src).with_context(|| {
                            format!("failed to remove merged source {}", op.src.display())
                        })?;
                    }
                    state.log(&format!("merge {} -> {}", op.src.display(), dst.display()));
                    Ok((OutcomeStatus::Applied, None, Some(op.clone())))
                },
            }
        },
    }
}

fn verb(kind: OpKind) -> &'static str {
    match kind {
        OpKind::Copy => "copy",
        _ => "move",
    }
}

fn transfer(state: &RunState, kind: OpKind, src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    match kind {
        OpKind::Copy => copy_path(src, dst)?,
        _ => move_path(src, dst)?,
    }
    state.log(&format!("{} {} -> {}", verb(kind), src.display(), dst.display()));
    Ok(())
}

/// Rename, falling back to copy-and-remove across filesystems.
pub(crate) fn move_path(src: &Path, dst: &Path) -> Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    copy_path(src, dst)?;
    let removed = if src.is_dir() {
        fs::remove_dir_all(src)
    } else {
        fs::remove_file(src)
    };
    removed.with_context(|| format!("failed to remove {} after copy", src.display()))?;
    Ok(())
}

pub(crate) fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dst)
            .with_context(|| format!("failed to create {}", dst.display()))?;
        let listing = list_dir(src, &[])?;
        for entry in listing.entries() {
            copy_path(&entry, &dst.join(entry_name(&entry)))?;
        }
    } else {
        fs::copy(src, dst).with_context(|| {
            format!("failed to copy {} to {}", src.display(), dst.display())
        })?;
    }
    Ok(())
}

/// True when any file remains anywhere under `dir`.
pub(crate) fn subtree_has_files(dir: &Path) -> bool {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .any(|entry| entry.file_type().is_file())
}

/// Merge `src` into the existing directory `dst`, applying the run's
/// policies to every nested collision: file-level collisions use the file
/// policy, directory-level collisions recurse.
fn merge_directories(
    src: &Path,
    dst: &Path,
    kind: OpKind,
    file_policy: ConflictPolicy,
    dir_policy: ConflictPolicy,
) -> Result<()> {
    let listing = list_dir(src, &[])?;
    for file in &listing.files {
        let target = dst.join(entry_name(file));
        if target.exists() {
            match resolve(file, &target, file_policy, dir_policy) {
                Resolution::Skip => continue,
                Resolution::Renamed(new_target) => {
                    transfer_plain(kind, file, &new_target)?;
                    continue;
                },
                _ => {
                    let removed = if target.is_dir() {
                        fs::remove_dir_all(&target)
                    } else {
                        fs::remove_file(&target)
                    };
                    removed
                        .with_context(|| format!("failed to replace {}", target.display()))?;
                },
            }
        }
        transfer_plain(kind, file, &target)?;
    }
    for sub in &listing.dirs {
        let target = dst.join(entry_name(sub));
        if target.is_dir() {
            merge_directories(sub, &target, kind, file_policy, dir_policy)?;
            if kind == OpKind::Move && !subtree_has_files(sub) {
                let _ = fs::remove_dir(sub);
            }
        } else if target.exists() {
            match resolve(sub, &target, file_policy, dir_policy) {
                Resolution::Skip => continue,
                Resolution::Renamed(new_target) => transfer_plain(kind, sub, &new_target)?,
                _ => {
                    fs::remove_file(&target)
                        .with_context(|| format!("failed to replace {}", target.display()))?;
                    transfer_plain(kind, sub, &target)?;
                },
            }
        } else {
            transfer_plain(kind, sub, &target)?;
        }
    }
    Ok(())
}

fn transfer_plain(kind: OpKind, src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    match kind {
        OpKind::Copy => copy_path(src, dst),
        _ => move_path(src, dst),
    }
}
