//! Checkpoint pipeline localization and persistence
//!
//! Run with: cargo test -p format-verifier --test checkpoints

#[path = "common/fixtures.rs"]
mod fixtures;

use fixtures::{init_tracing, DocxFixture};
use format_verifier::report::{format_checkpoint, format_checkpoint_report};
use format_verifier::{
    compare_checkpoints, create_checkpoint, CheckpointManager, FormatCategory, OutputFormat,
    Reporter, VerifyConfig, VerifyError,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// A→B keeps all five revisions, B→C flattens them
fn three_stage_pipeline() -> (TempDir, [PathBuf; 3]) {
    let dir = tempfile::tempdir().unwrap();
    let original = DocxFixture::five_revisions();
    let a = original.write(dir.path(), "a.docx");
    let b = original.clone().text("appended by stage two").write(dir.path(), "b.docx");
    let c = original.flattened().write(dir.path(), "c.docx");
    (dir, [a, b, c])
}

#[test]
fn test_failure_is_localized_to_transition() {
    init_tracing();
    let (_dir, [a, b, c]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&a, "A").unwrap();
    manager.add_checkpoint(&b, "B").unwrap();
    manager.add_checkpoint(&c, "C").unwrap();

    let pipeline = manager.verify_all_checkpoints();
    assert_eq!(pipeline.labels().collect::<Vec<_>>(), vec!["A→B", "B→C"]);

    let ab = pipeline.get("A→B").unwrap();
    assert!(ab.iter().all(|r| r.passed));
    assert_eq!(ab[0].category, FormatCategory::TrackChanges);
    assert_eq!(ab[0].details.after_count, 5);

    let bc = pipeline.get("B→C").unwrap();
    assert!(!bc[0].passed);
    assert!(bc[0].is_catastrophic());

    let failed: Vec<_> = pipeline.failed_transitions().map(|t| t.label.as_str()).collect();
    assert_eq!(failed, vec!["B→C"]);

    let report = format_checkpoint_report(&pipeline);
    assert!(report.contains("Loss introduced at: B→C"));
}

#[test]
fn test_checkpoint_errors() {
    let (dir, [a, _, _]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&a, "A").unwrap();

    assert!(matches!(
        manager.add_checkpoint(&a, "A"),
        Err(VerifyError::DuplicateName(_))
    ));
    assert!(matches!(
        manager.add_checkpoint(dir.path().join("nowhere.docx"), "Z"),
        Err(VerifyError::FileNotFound(_))
    ));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_adhoc_comparison_leaves_manager_untouched() {
    let (_dir, [a, b, c]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&a, "A").unwrap();
    manager.add_checkpoint(&b, "B").unwrap();

    let previous = manager.get("B").unwrap().clone();
    let results = manager.compare_checkpoints(&c, &previous);
    assert!(!results[0].passed);
    assert_eq!(manager.len(), 2);
    assert!(manager.get("C").is_none());

    let standalone = create_checkpoint(&b, "B").unwrap();
    assert_eq!(compare_checkpoints(&c, &standalone), results);
}

#[test]
fn test_in_place_overwrite_after_capture_is_detected() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = DocxFixture::five_revisions().write(dir.path(), "doc.docx");
    let checkpoint = create_checkpoint(&path, "before").unwrap();

    DocxFixture::five_revisions()
        .flattened()
        .write(dir.path(), "doc.docx");
    assert!(!checkpoint.is_unchanged_on_disk());

    let results = compare_checkpoints(&path, &checkpoint);
    let changes = &results[0];
    assert_eq!(changes.category, FormatCategory::TrackChanges);
    assert!(!changes.passed);
    assert_eq!(changes.details.before_count, 5);
    assert_eq!(changes.details.after_count, 0);
    assert!(changes.is_catastrophic());
}

#[test]
fn test_pipeline_stage_rewriting_in_place_fails_its_transition() {
    let dir = tempfile::tempdir().unwrap();
    let original = DocxFixture::five_revisions();
    let path = original.write(dir.path(), "doc.docx");
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&path, "A").unwrap();

    original.flattened().write(dir.path(), "doc.docx");
    manager.add_checkpoint(&path, "B").unwrap();

    let pipeline = manager.verify_all_checkpoints();
    assert!(!pipeline.get("A→B").unwrap()[0].passed);
    let failed: Vec<_> = pipeline.failed_transitions().map(|t| t.label.as_str()).collect();
    assert_eq!(failed, vec!["A→B"]);
}

#[test]
fn test_deleted_checkpoint_file_still_verifies() {
    let (_dir, [a, b, c]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&a, "A").unwrap();
    manager.add_checkpoint(&b, "B").unwrap();
    manager.add_checkpoint(&c, "C").unwrap();
    std::fs::remove_file(&b).unwrap();

    let pipeline = manager.verify_all_checkpoints();
    assert!(pipeline.get("A→B").unwrap().iter().all(|r| r.passed));
    assert!(!pipeline.get("B→C").unwrap()[0].passed);

    let previous = manager.get("A").unwrap();
    let results = manager.compare_checkpoints(&b, previous);
    assert!(results.iter().all(|r| !r.passed));
    assert!(results[0].message.contains("After file not found"));
}

#[test]
fn test_comparison_covers_captured_categories() {
    let (_dir, [a, _, _]) = three_stage_pipeline();
    let checkpoint = CheckpointManager::new(
        VerifyConfig::default().with_categories([FormatCategory::TrackChanges]),
    )
    .add_checkpoint(&a, "A")
    .unwrap()
    .clone();

    let facade = compare_checkpoints(&a, &checkpoint);
    assert_eq!(facade.len(), 1);
    assert!(facade[0].passed);

    let managed = CheckpointManager::default().compare_checkpoints(&a, &checkpoint);
    assert_eq!(managed.len(), 2);
    assert!(managed[0].passed);
    assert_eq!(managed[1].category, FormatCategory::Comments);
    assert!(!managed[1].passed);
    assert!(managed[1].message.contains("not in checkpoint 'A'"));
}

#[test]
fn test_verify_between_named_checkpoints() {
    let (_dir, [a, b, c]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    for (path, name) in [(&a, "A"), (&b, "B"), (&c, "C")] {
        manager.add_checkpoint(path, name).unwrap();
    }

    let results = manager.verify_between("A", "C").unwrap();
    assert!(!results[0].passed);
    assert!(matches!(
        manager.verify_between("A", "D"),
        Err(VerifyError::CheckpointNotFound(name)) if name == "D"
    ));
}

#[test]
fn test_persistence_survives_restart() {
    let (dir, [a, b, c]) = three_stage_pipeline();
    let state = dir.path().join("checkpoints.json");
    {
        let mut manager = CheckpointManager::new(
            VerifyConfig::default().with_categories([FormatCategory::TrackChanges]),
        );
        manager.add_checkpoint(&a, "A").unwrap();
        manager.add_checkpoint(&b, "B").unwrap();
        manager.save(&state).unwrap();
    }

    let mut restored = CheckpointManager::load(&state).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(
        restored.get("A").unwrap().captured_count(FormatCategory::TrackChanges),
        Some(5)
    );
    assert_eq!(restored.config().categories.len(), 1);

    restored.add_checkpoint(&c, "C").unwrap();
    let pipeline = restored.verify_all_checkpoints();
    assert!(pipeline.get("A→B").unwrap()[0].passed);
    assert!(!pipeline.get("B→C").unwrap()[0].passed);

    let audit = format_checkpoint(restored.get("A").unwrap());
    assert!(audit.contains("Checkpoint: A"));
    assert!(audit.contains("track_changes: 5 items"));

    assert!(matches!(
        CheckpointManager::load(dir.path().join("absent.json")),
        Err(VerifyError::FileNotFound(_))
    ));
}

#[test]
fn test_pipeline_report_files() {
    let (dir, [a, b, c]) = three_stage_pipeline();
    let mut manager = CheckpointManager::default();
    manager.add_checkpoint(&a, "A").unwrap();
    manager.add_checkpoint(&b, "B").unwrap();
    manager.add_checkpoint(&c, "C").unwrap();
    let pipeline = manager.verify_all_checkpoints();

    let text_path = dir.path().join("pipeline.txt");
    Reporter::default()
        .write_pipeline_to_file(&pipeline, &text_path)
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(&text_path).unwrap(),
        format_checkpoint_report(&pipeline)
    );

    let json_path = dir.path().join("pipeline.json");
    Reporter::new(OutputFormat::JsonPretty)
        .write_pipeline_to_file(&pipeline, &json_path)
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["transitions"][1]["label"], "B→C");
    assert_eq!(value["summary"]["catastrophic"], 1);
}
