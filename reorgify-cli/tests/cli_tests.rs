use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "content").unwrap();
}

fn reorgify(journal: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reorgify").unwrap();
    cmd.env("REORGIFY_JOURNAL_DIR", journal);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("reorgify")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dissolve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("rename"))
        .stdout(predicate::str::contains("undo"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_dissolve_preview_json_and_pure() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");
    let root = temp.path().join("root");
    touch(&root.join("A/A/file.txt"));

    let assert = reorgify(&journal)
        .args([
            "dissolve",
            "--threshold",
            "0",
            "--output",
            "json",
            "--preview",
            "--quiet",
        ])
        .arg(&root)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["preview"], true);
    assert_eq!(parsed["summary"]["nested_count"], 1);
    assert!(parsed.get("operation_id").map_or(true, |v| v.is_null()));

    // Preview never mutates.
    assert!(root.join("A/A/file.txt").exists());
}

#[test]
fn test_dissolve_apply_undo_cycle() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");
    let root = temp.path().join("root");
    touch(&root.join("A/A/file.txt"));

    let assert = reorgify(&journal)
        .args(["dissolve", "--threshold", "0", "--output", "json", "--quiet"])
        .arg(&root)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let id = parsed["operation_id"].as_str().unwrap().to_string();
    assert!(root.join("A/file.txt").exists());
    assert!(!root.join("A/A").exists());

    reorgify(&journal)
        .args(["history", "--output", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));

    reorgify(&journal)
        .args(["undo", "--quiet"])
        .arg(&id)
        .assert()
        .success()
        .stdout(predicate::str::contains("undo complete"));
    assert!(root.join("A/A/file.txt").exists());
}

#[test]
fn test_undo_with_empty_journal_fails() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");

    reorgify(&journal)
        .arg("undo")
        .assert()
        .failure()
        .stdout(predicate::str::contains("no batches"));
}

#[test]
fn test_migrate_flat_moves_files() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");
    let src = temp.path().join("inbox");
    touch(&src.join("a.txt"));
    touch(&src.join("b.txt"));
    let target = temp.path().join("sorted");

    reorgify(&journal)
        .args(["migrate", "--mode", "flat", "--quiet", "--output", "json"])
        .arg(&src)
        .arg("--target")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"migrated_count\":2"));

    assert!(target.join("a.txt").exists());
    assert!(target.join("b.txt").exists());
}

#[test]
fn test_rename_with_template() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");
    let dir = temp.path().join("shots");
    touch(&dir.join("b.png"));
    touch(&dir.join("a.png"));

    reorgify(&journal)
        .args(["rename", "--template", "shot_{index}", "--quiet"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("rename complete"));

    assert!(dir.join("shot_1.png").exists());
    assert!(dir.join("shot_2.png").exists());
}

#[test]
fn test_missing_root_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    let journal = temp.path().join("journal");

    reorgify(&journal)
        .arg("dissolve")
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not exist"));
}
