use crate::plan::Operation;
use crate::similarity::{MatchResult, SimilarityGate};
use crate::walk::{entry_name, list_dir, DirListing};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Extensions treated as archives by the single-archive dissolve.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso"];

/// Extensions treated as media by the single-media dissolve.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "rmvb",
];

/// Operations plus the planner's decision tallies for one dissolve
/// strategy. Gate rejections are not errors; they feed `skipped_count`.
#[derive(Debug, Default)]
pub struct DissolveOutcome {
    pub ops: Vec<Operation>,
    pub dissolved: usize,
    pub gate_skipped: usize,
    pub matches: Vec<MatchResult>,
}

/// Plan the dissolution of nested single-subfolder wrappers under `root`.
///
/// A proper descendant of `root` with exactly one subdirectory and zero
/// files is a candidate, gated on the similarity of its own name to the
/// lone child's name. On acceptance the chain of lone singleton children is
/// followed to the deepest directory with real content; that directory's
/// entries move up into the candidate and the wrapper chain is deleted.
pub fn plan_nested(root: &Path, keywords: &[String], gate: &SimilarityGate) -> Result<DissolveOutcome> {
    let mut outcome = DissolveOutcome::default();
    let listing = list_dir(root, keywords)?;
    for dir in &listing.dirs {
        visit_nested(dir, keywords, gate, &mut outcome)?;
    }
    Ok(outcome)
}

fn visit_nested(
    dir: &Path,
    keywords: &[String],
    gate: &SimilarityGate,
    outcome: &mut DissolveOutcome,
) -> Result<()> {
    let listing = list_dir(dir, keywords)?;
    if listing.files.is_empty() && listing.dirs.len() == 1 {
        let child = &listing.dirs[0];
        let m = gate.check(&entry_name(dir), &entry_name(child));
        let accepted = m.accepted;
        outcome.matches.push(m);
        if accepted {
            let deepest = follow_singleton_chain(child, keywords)?;
            let content = list_dir(&deepest, keywords)?;
            for entry in content.entries() {
                outcome
                    .ops
                    .push(Operation::moving(&entry, dir.join(entry_name(&entry))));
            }
            outcome.ops.push(Operation::delete_dir(child));
            outcome.dissolved += 1;
            // The whole chain is consumed by this candidate.
            return Ok(());
        }
        outcome.gate_skipped += 1;
    }
    for sub in &listing.dirs {
        visit_nested(sub, keywords, gate, outcome)?;
    }
    Ok(())
}

/// Descend while each level holds exactly one subdirectory and no files.
fn follow_singleton_chain(start: &Path, keywords: &[String]) -> Result<PathBuf> {
    let mut deepest = start.to_path_buf();
    loop {
        let listing = list_dir(&deepest, keywords)?;
        if listing.files.is_empty() && listing.dirs.len() == 1 {
            deepest = listing.dirs[0].clone();
        } else {
            return Ok(deepest);
        }
    }
}

/// Plan the dissolution of single-media-file wrappers under `root`.
pub fn plan_media(root: &Path, keywords: &[String], gate: &SimilarityGate) -> Result<DissolveOutcome> {
    plan_single_file(root, keywords, gate, MEDIA_EXTENSIONS)
}

/// Plan the dissolution of single-archive wrappers under `root`.
pub fn plan_archive(
    root: &Path,
    keywords: &[String],
    gate: &SimilarityGate,
) -> Result<DissolveOutcome> {
    plan_single_file(root, keywords, gate, ARCHIVE_EXTENSIONS)
}

/// Shared machinery for the single-file dissolves.
///
/// Walks bottom-up and tracks each directory's simulated contents (what it
/// will hold after the operations planned so far), so an inner wrapper's
/// file can qualify its parent as the next candidate within the same plan.
/// The emitted operation order is post-order: inner moves execute before
/// outer ones.
fn plan_single_file(
    root: &Path,
    keywords: &[String],
    gate: &SimilarityGate,
    extensions: &[&str],
) -> Result<DissolveOutcome> {
    let mut outcome = DissolveOutcome::default();
    visit_single_file(root, keywords, gate, extensions, &mut outcome)?;
    Ok(outcome)
}

/// Simulated post-plan contents of one directory.
struct SimContents {
    files: Vec<PathBuf>,
    dirs: usize,
}

fn visit_single_file(
    dir: &Path,
    keywords: &[String],
    gate: &SimilarityGate,
    extensions: &[&str],
    outcome: &mut DissolveOutcome,
) -> Result<SimContents> {
    let listing: DirListing = list_dir(dir, keywords)?;
    let mut files = listing.files;
    let mut dirs = 0usize;

    for sub in &listing.dirs {
        let sim = visit_single_file(sub, keywords, gate, extensions, outcome)?;
        if sim.dirs == 0 && sim.files.len() == 1 && has_extension(&sim.files[0], extensions) {
            let file = &sim.files[0];
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let m = gate.check(&entry_name(sub), &stem);
            let accepted = m.accepted;
            outcome.matches.push(m);
            if accepted {
                let dst = dir.join(entry_name(file));
                outcome.ops.push(Operation::moving(file, &dst));
                outcome.ops.push(Operation::delete_dir(sub));
                outcome.dissolved += 1;
                // The file arrives here once the wrapper dissolves.
                files.push(dst);
                continue;
            }
            outcome.gate_skipped += 1;
        }
        dirs += 1;
    }

    Ok(SimContents { files, dirs })
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Counts for a direct dissolve, which moves a directory's entries into its
/// parent as-is.
#[derive(Debug, Default)]
pub struct DirectOutcome {
    pub ops: Vec<Operation>,
    pub files: usize,
    pub dirs: usize,
}

/// Plan the direct dissolution of `dir` into its parent: one move per
/// top-level entry, then delete the emptied directory. Exclude keywords do
/// not apply here; the directory is dissolved wholesale.
pub fn plan_direct(dir: &Path) -> Result<DirectOutcome> {
    let mut outcome = DirectOutcome::default();
    let Some(parent) = dir.parent() else {
        return Ok(outcome);
    };
    let listing = list_dir(dir, &[])?;
    for entry in listing.entries() {
        if entry.is_dir() {
            outcome.dirs += 1;
        } else {
            outcome.files += 1;
        }
        outcome
            .ops
            .push(Operation::moving(&entry, parent.join(entry_name(&entry))));
    }
    outcome.ops.push(Operation::delete_dir(dir));
    Ok(outcome)
}
