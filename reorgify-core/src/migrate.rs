use crate::plan::Operation;
use crate::walk::{entry_name, is_excluded, list_dir};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Layout strategy for a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrateMode {
    /// Keep each source's directory structure under the target root,
    /// anchored at the source's parent.
    Preserve,
    /// Immediate child files only, flattened into the target root.
    Flat,
    /// Each source moves as one unit to `target_root/name`.
    Direct,
}

/// Whether migrated items are moved or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrateAction {
    Move,
    Copy,
}

impl Default for MigrateAction {
    fn default() -> Self {
        Self::Move
    }
}

#[derive(Debug, Default)]
pub struct MigrateOutcome {
    pub ops: Vec<Operation>,
    /// Planned file/item transfers, excluding the target-root creation.
    pub planned: usize,
}

/// Plan a migration of `sources` into `target_root`.
///
/// Sources must already be validated to exist. The walk is sorted by name,
/// and subtrees whose path contains an exclude keyword are pruned during
/// descent.
pub fn plan_migration(
    sources: &[PathBuf],
    target_root: &Path,
    mode: MigrateMode,
    action: MigrateAction,
    keywords: &[String],
) -> Result<MigrateOutcome> {
    let mut outcome = MigrateOutcome::default();
    if !target_root.exists() {
        outcome.ops.push(Operation::create_dir(target_root));
    }

    for source in sources {
        match mode {
            MigrateMode::Preserve => plan_preserve(source, target_root, action, keywords, &mut outcome)?,
            MigrateMode::Flat => plan_flat(source, target_root, action, keywords, &mut outcome)?,
            MigrateMode::Direct => {
                push_transfer(
                    &mut outcome,
                    action,
                    source,
                    target_root.join(entry_name(source)),
                );
            },
        }
    }
    Ok(outcome)
}

fn plan_preserve(
    source: &Path,
    target_root: &Path,
    action: MigrateAction,
    keywords: &[String],
    outcome: &mut MigrateOutcome,
) -> Result<()> {
    if source.is_file() {
        push_transfer(outcome, action, source, target_root.join(entry_name(source)));
        return Ok(());
    }

    // Relative to the source's parent, so the source directory's own name
    // is part of the migrated layout.
    let anchor = source.parent().unwrap_or(source).to_path_buf();
    let keywords = keywords.to_vec();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry.path(), &keywords));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(&anchor)
            .with_context(|| format!("path escapes its source root: {}", entry.path().display()))?;
        push_transfer(outcome, action, entry.path(), target_root.join(relative));
    }
    Ok(())
}

fn plan_flat(
    source: &Path,
    target_root: &Path,
    action: MigrateAction,
    keywords: &[String],
    outcome: &mut MigrateOutcome,
) -> Result<()> {
    if source.is_file() {
        push_transfer(outcome, action, source, target_root.join(entry_name(source)));
        return Ok(());
    }
    let listing = list_dir(source, keywords)?;
    for file in &listing.files {
        push_transfer(outcome, action, file, target_root.join(entry_name(file)));
    }
    Ok(())
}

fn push_transfer(
    outcome: &mut MigrateOutcome,
    action: MigrateAction,
    src: impl Into<PathBuf>,
    dst: impl Into<PathBuf>,
) {
    let op = match action {
        MigrateAction::Move => Operation::moving(src, dst),
        MigrateAction::Copy => Operation::copying(src, dst),
    };
    outcome.ops.push(op);
    outcome.planned += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::OpKind;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_preserve_keeps_structure_from_source_parent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("photos");
        touch(&src.join("2020/jan/a.jpg"));
        touch(&src.join("top.jpg"));
        let target = temp.path().join("library");

        let outcome = plan_migration(
            &[src.clone()],
            &target,
            MigrateMode::Preserve,
            MigrateAction::Move,
            &[],
        )
        .unwrap();

        assert_eq!(outcome.ops[0].kind, OpKind::CreateDir);
        let dsts: Vec<&Path> = outcome
            .ops
            .iter()
            .filter_map(|op| op.dst.as_deref())
            .collect();
        assert!(dsts.contains(&&*target.join("photos/2020/jan/a.jpg")));
        assert!(dsts.contains(&&*target.join("photos/top.jpg")));
        assert_eq!(outcome.planned, 2);
    }

    #[test]
    fn test_flat_takes_immediate_files_only() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("inbox");
        touch(&src.join("a.txt"));
        touch(&src.join("deep/b.txt"));
        let target = temp.path().join("out");

        let outcome = plan_migration(
            &[src],
            &target,
            MigrateMode::Flat,
            MigrateAction::Move,
            &[],
        )
        .unwrap();

        assert_eq!(outcome.planned, 1);
        assert_eq!(
            outcome.ops.last().unwrap().dst.as_deref(),
            Some(&*target.join("a.txt"))
        );
    }

    #[test]
    fn test_direct_moves_sources_as_units() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("bundle");
        touch(&src_dir.join("x.txt"));
        let src_file = temp.path().join("loose.txt");
        touch(&src_file);
        let target = temp.path().join("dest");

        let outcome = plan_migration(
            &[src_dir.clone(), src_file.clone()],
            &target,
            MigrateMode::Direct,
            MigrateAction::Move,
            &[],
        )
        .unwrap();

        assert_eq!(outcome.planned, 2);
        assert_eq!(outcome.ops[1].src, src_dir);
        assert_eq!(outcome.ops[1].dst.as_deref(), Some(&*target.join("bundle")));
        assert_eq!(outcome.ops[2].dst.as_deref(), Some(&*target.join("loose.txt")));
    }

    #[test]
    fn test_copy_action_plans_copy_ops() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        touch(&src);
        let target = temp.path().join("out");

        let outcome = plan_migration(
            &[src],
            &target,
            MigrateMode::Flat,
            MigrateAction::Copy,
            &[],
        )
        .unwrap();
        assert_eq!(outcome.ops.last().unwrap().kind, OpKind::Copy);
    }

    #[test]
    fn test_preserve_prunes_excluded_subtrees() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("data");
        touch(&src.join("keep/a.txt"));
        touch(&src.join("cache/b.txt"));
        let target = temp.path().join("out");

        let outcome = plan_migration(
            &[src],
            &target,
            MigrateMode::Preserve,
            MigrateAction::Move,
            &["cache".to_string()],
        )
        .unwrap();
        assert_eq!(outcome.planned, 1);
        assert!(outcome.ops.last().unwrap().src.ends_with("keep/a.txt"));
    }

    #[test]
    fn test_existing_target_root_not_recreated() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        touch(&src);
        let target = temp.path().join("out");
        fs::create_dir(&target).unwrap();

        let outcome = plan_migration(
            &[src],
            &target,
            MigrateMode::Flat,
            MigrateAction::Move,
            &[],
        )
        .unwrap();
        assert!(outcome.ops.iter().all(|op| op.kind != OpKind::CreateDir));
    }
}
