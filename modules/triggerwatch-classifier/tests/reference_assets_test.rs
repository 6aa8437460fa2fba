//! Loads the shipped worked examples and exercises the loader's failure modes.

use std::fs;
use std::path::PathBuf;

use triggerwatch_classifier::{PromptAssembler, PromptLimits, ReferenceError, ReferenceSet};
use triggerwatch_common::VocabularyViolation;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn copy_vocabulary(dir: &std::path::Path) {
    fs::copy(
        data_dir().join("trigger_vocabulary.json"),
        dir.join("trigger_vocabulary.json"),
    )
    .unwrap();
}

#[test]
fn shipped_examples_load_and_validate() {
    let reference = ReferenceSet::load(&data_dir()).unwrap();

    let titles: Vec<&str> = reference.examples().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Joker (2019)", "Whiplash (2014)", "Midsommar (2019)"]);
    for example in reference.examples() {
        assert_eq!(example.labels.len(), reference.vocabulary().len());
        assert!(!example.summary.is_empty());
        assert!(!example.script.is_empty(), "{} has no script text", example.title);
    }
}

#[test]
fn shipped_system_instruction_holds_every_label() {
    let reference = ReferenceSet::load(&data_dir()).unwrap();
    let prompts = PromptAssembler::new(&reference, PromptLimits::default());

    for label in reference.vocabulary().labels() {
        let key = serde_json::to_string(label).unwrap();
        assert_eq!(
            prompts.system_instruction().matches(&format!("{key}:")).count(),
            3,
            "label {label} should appear once per example"
        );
    }
}

#[test]
fn missing_script_pdf_falls_back_to_excerpt() {
    let dir = tempfile::tempdir().unwrap();
    copy_vocabulary(dir.path());

    let shipped = fs::read_to_string(data_dir().join("worked_examples.json")).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&shipped).unwrap();
    for example in doc["examples"].as_array_mut().unwrap() {
        example["script_pdf"] = serde_json::json!("scripts/does_not_exist.pdf");
        example["script_excerpt"] = serde_json::json!("INT. FALLBACK - DAY");
    }
    fs::write(dir.path().join("worked_examples.json"), doc.to_string()).unwrap();

    let reference = ReferenceSet::load(dir.path()).unwrap();
    assert!(reference
        .examples()
        .iter()
        .all(|e| e.script == "INT. FALLBACK - DAY"));
}

#[test]
fn example_with_missing_label_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    copy_vocabulary(dir.path());

    let shipped = fs::read_to_string(data_dir().join("worked_examples.json")).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&shipped).unwrap();
    doc["examples"][1]["labels"]
        .as_object_mut()
        .unwrap()
        .remove("a cat dies");
    fs::write(dir.path().join("worked_examples.json"), doc.to_string()).unwrap();

    let err = ReferenceSet::load(dir.path()).unwrap_err();
    match err {
        ReferenceError::Labels { title, violation } => {
            assert_eq!(title, "Whiplash (2014)");
            assert_eq!(
                violation,
                VocabularyViolation::Missing(vec!["a cat dies".to_string()])
            );
        }
        other => panic!("expected Labels error, got {other:?}"),
    }
}

#[test]
fn wrong_example_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    copy_vocabulary(dir.path());

    let shipped = fs::read_to_string(data_dir().join("worked_examples.json")).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&shipped).unwrap();
    doc["examples"].as_array_mut().unwrap().pop();
    fs::write(dir.path().join("worked_examples.json"), doc.to_string()).unwrap();

    assert!(matches!(
        ReferenceSet::load(dir.path()),
        Err(ReferenceError::Count { expected: 3, found: 2 })
    ));
}

#[test]
fn shipped_script_paths_exist() {
    let shipped = fs::read_to_string(data_dir().join("worked_examples.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&shipped).unwrap();

    for example in doc["examples"].as_array().unwrap() {
        assert!(
            !example["script_excerpt"].as_str().unwrap_or("").trim().is_empty(),
            "{} has no excerpt",
            example["title"]
        );
        if let Some(path) = example["script_pdf"].as_str() {
            assert!(
                data_dir().join(path).is_file(),
                "{} points at missing {path}",
                example["title"]
            );
        }
    }
}

#[test]
fn example_with_repeated_label_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    copy_vocabulary(dir.path());

    let shipped = fs::read_to_string(data_dir().join("worked_examples.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&shipped).unwrap();
    let repeated = doc
        .to_string()
        .replacen("\"labels\":{", "\"labels\":{\"a cat dies\":1,", 1);
    fs::write(dir.path().join("worked_examples.json"), repeated).unwrap();

    match ReferenceSet::load(dir.path()).unwrap_err() {
        ReferenceError::Parse { source, .. } => {
            assert!(source.to_string().contains("duplicate trigger label `a cat dies`"));
        }
        other => panic!("expected Parse error, got {other:?}"),
    }
}
