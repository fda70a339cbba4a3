use reorgify_core::{
    dissolve_operation, undo_operation, ConflictPolicy, DissolveRequest, Journal, UndoRequest,
    NULL_SINK,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "content").unwrap();
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_nested_dissolve_round_trip() {
    // Scenario: root/A/A where the outer A holds only the inner A.
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let root = temp.path().join("root");
    touch(&root.join("A/A/file1.txt"));
    touch(&root.join("A/A/file2.txt"));

    let req = DissolveRequest {
        path: root.clone(),
        similarity_threshold: 0.0,
        ..DissolveRequest::default()
    };
    let result = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    assert!(result.success, "{}", result.message);
    assert_eq!(result.nested_count, 1);
    assert_eq!(sorted_names(&root.join("A")), vec!["file1.txt", "file2.txt"]);

    // Undo restores root/A/A with its contents.
    let undo_req = UndoRequest {
        batch_id: result.operation_id.clone(),
    };
    let undo = undo_operation(&undo_req, &journal, &NULL_SINK).unwrap();
    assert!(undo.success);
    assert_eq!(undo.failed_count, 0);
    assert_eq!(sorted_names(&root.join("A")), vec!["A"]);
    assert_eq!(
        sorted_names(&root.join("A/A")),
        vec!["file1.txt", "file2.txt"]
    );

    // The batch was consumed, so a second undo finds nothing.
    let again = undo_operation(&undo_req, &journal, &NULL_SINK).unwrap();
    assert!(!again.success);
}

#[test]
fn test_single_archive_dissolve_scenario() {
    // Scenario: root/Movie (2020)/Movie.zip with threshold 0.5.
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let root = temp.path().join("root");
    touch(&root.join("Movie (2020)/Movie.zip"));

    let req = DissolveRequest {
        path: root.clone(),
        nested: false,
        media: false,
        similarity_threshold: 0.5,
        ..DissolveRequest::default()
    };
    let result = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    assert!(result.success, "{}", result.message);
    assert_eq!(result.archive_count, 1);
    assert!(root.join("Movie.zip").exists());
    assert!(!root.join("Movie (2020)").exists());
    assert!(result.operation_id.is_some());
}

#[test]
fn test_similarity_gate_controls_dissolve() {
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let root = temp.path().join("root");
    touch(&root.join("Foo/Foo_v2/file.txt"));
    touch(&root.join("Other/Unrelated/file.txt"));

    let req = DissolveRequest {
        path: root.clone(),
        media: false,
        archive: false,
        similarity_threshold: 0.8,
        ..DissolveRequest::default()
    };
    let result = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    assert!(result.success, "{}", result.message);
    // Foo/Foo_v2 clears the gate and dissolves.
    assert_eq!(result.nested_count, 1);
    assert!(root.join("Foo/file.txt").exists());
    // Other/Unrelated stays, counted as skipped.
    assert_eq!(result.skipped_count, 1);
    assert!(root.join("Other/Unrelated/file.txt").exists());
}

#[test]
fn test_conflict_rename_suffixes_through_dissolve() {
    // The wrapper's file collides with a sibling already at the parent.
    let temp = TempDir::new().unwrap();
    let journal = Journal::open(temp.path().join("journal")).unwrap();
    let root = temp.path().join("root");
    touch(&root.join("A/a.txt"));
    fs::create_dir_all(root.join("A/A")).unwrap();
    fs::write(root.join("A/A/a.txt"), "inner").unwrap();

    // A has a file, so nested does not fire; use direct dissolve of A/A.
    let req = DissolveRequest {
        path: root.join("A/A"),
        direct: true,
        file_conflict: ConflictPolicy::Rename,
        ..DissolveRequest::default()
    };
    let result = dissolve_operation(&req, &journal, &NULL_SINK, &NULL_SINK).unwrap();
    assert!(result.success, "{}", result.message);
    assert!(root.join("A/a_1.txt").exists());
    assert_eq!(fs::read_to_string(root.join("A/a_1.txt")).unwrap(), "inner");
    assert!(!root.join("A/A").exists());
}

#[test]
fn test_planner_determinism_across_runs() {
    use reorgify_core::similarity::SimilarityGate;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    touch(&root.join("B/B/one.txt"));
    touch(&root.join("A/A/two.txt"));
    touch(&root.join("C/C/three.txt"));

    let gate = SimilarityGate::disabled();
    let first = reorgify_core::dissolve::plan_nested(&root, &[], &gate).unwrap();
    let second = reorgify_core::dissolve::plan_nested(&root, &[], &gate).unwrap();

    let shape = |ops: &[reorgify_core::Operation]| {
        ops.iter()
            .map(|op| (op.kind, op.src.clone(), op.dst.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first.ops), shape(&second.ops));
    assert_eq!(first.dissolved, 3);
}
