use reorgify_core::{
    dissolve_operation, migrate_operation, DissolveRequest, Journal, MigrateMode, MigrateRequest,
    NULL_SINK,
};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "content").unwrap();
}

/// Hash of every path and file body under `root`, in sorted order.
fn tree_hash(root: &Path) -> String {
    let mut hasher = Sha256::new();
    let mut entries: Vec<_> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));
    for entry in entries {
        let relative = entry.path().strip_prefix(root).unwrap();
        hasher.update(relative.to_string_lossy().as_bytes());
        if entry.file_type().is_file() {
            hasher.update(fs::read(entry.path()).unwrap());
        }
    }
    format!("{:x}", hasher.finalize())
}

#[test]
fn test_dissolve_preview_is_idempotent_and_pure() {
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let root = temp.path().join("root");
    touch(&root.join("A/A/file.txt"));
    touch(&root.join("Movie (2020)/Movie.zip"));
    touch(&root.join("keep/other.txt"));

    let before = tree_hash(&root);
    let req = DissolveRequest {
        path: root.clone(),
        similarity_threshold: 0.0,
        preview: true,
        ..DissolveRequest::default()
    };

    let first = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    let second = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();

    assert!(first.success);
    assert_eq!(first.nested_count, second.nested_count);
    assert_eq!(first.archive_count, second.archive_count);
    assert_eq!(first.media_count, second.media_count);
    assert_eq!(first.skipped_count, second.skipped_count);
    assert_eq!(first.error_count, second.error_count);
    assert!(first.operation_id.is_none());
    assert!(second.operation_id.is_none());

    // The tree is untouched byte for byte.
    assert_eq!(tree_hash(&root), before);
    assert!(journal.latest().unwrap().is_none());
}

#[test]
fn test_migrate_preview_is_idempotent_and_pure() {
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let src = temp.path().join("src");
    touch(&src.join("a/x.txt"));
    touch(&src.join("y.txt"));
    let target = temp.path().join("target");

    let before = tree_hash(temp.path());
    let req = MigrateRequest {
        sources: vec![src],
        target,
        mode: MigrateMode::Preserve,
        preview: true,
        ..MigrateRequest::default()
    };

    let first = migrate_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    let second = migrate_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();

    assert!(first.success);
    assert_eq!(first.migrated_count, 2);
    assert_eq!(first.migrated_count, second.migrated_count);
    assert_eq!(first.skipped_count, second.skipped_count);
    assert_eq!(tree_hash(temp.path()), before);
}
