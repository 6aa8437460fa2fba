//! Classifier behavior against a scripted backend.

use triggerwatch_classifier::testing::{labels_with, reference_set, MockBackend, TEST_LABELS};
use triggerwatch_classifier::{ClassifyError, PromptAssembler, PromptLimits, TriggerClassifier};
use triggerwatch_common::{Presence, Script, Summary, SummaryError};

fn classifier(backend: &MockBackend) -> TriggerClassifier {
    let prompts = PromptAssembler::new(&reference_set(), PromptLimits::default());
    TriggerClassifier::new(Box::new(backend.clone()), prompts)
}

fn summary() -> Summary {
    [("Plot".to_string(), "Dani travels to a midsummer festival.".to_string())]
        .into_iter()
        .collect()
}

fn script() -> Script {
    Script {
        source: "sfy.ru".into(),
        url: "https://sfy.ru/script/midsommar".into(),
        text: "EXT. HARGA - DAY\nTwo elders jump from the cliff.".into(),
    }
}

#[tokio::test]
async fn parses_mapping_from_single_call() {
    let backend = MockBackend::new().respond(
        r#"{"a cat dies": 0, "someone is stabbed": 0, "there's blood": 1, "someone dies by suicide": 1}"#,
    );

    let map = classifier(&backend)
        .classify("Midsommar", &Ok(summary()), Some(&script()))
        .await
        .unwrap();

    assert_eq!(map, labels_with(&["there's blood", "someone dies by suicide"]));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn prompts_carry_examples_target_and_self_check() {
    let backend = MockBackend::new().respond("{}");
    classifier(&backend)
        .classify("Midsommar", &Ok(summary()), Some(&script()))
        .await
        .unwrap();

    let (system, user) = backend.prompts().remove(0);

    assert!(system.contains("## Example 1: Joker (2019)"));
    assert!(system.contains("## Example 3: Midsommar (2019)"));
    assert!(system.contains("\"someone is stabbed\": 1"));
    // Examples render labels in vocabulary order.
    let positions: Vec<usize> = TEST_LABELS
        .iter()
        .map(|l| system.find(&format!("\"{l}\"")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert!(!user.contains("Joker"));
    assert!(user.contains("# Movie: Midsommar"));
    assert!(user.contains("## Plot\nDani travels to a midsummer festival."));
    assert!(user.contains("Two elders jump from the cliff."));
    assert!(user.contains("Change any 1 that neither source supports to 0"));
}

#[tokio::test]
async fn partial_context_still_classifies() {
    let backend = MockBackend::new().respond(r#"{"a cat dies": 0}"#);

    let map = classifier(&backend)
        .classify("Unknown Film", &Err(SummaryError::NoPageFound), None)
        .await
        .unwrap();
    assert_eq!(map.get("a cat dies"), Some(&Presence::Absent));

    let (_, user) = backend.prompts().remove(0);
    assert!(user.contains("(no summary available: no page found)"));
    assert!(user.contains("(no script available)"));
}

#[tokio::test]
async fn nested_object_response_is_malformed_without_retry() {
    let raw = r#"Explanation: here it is {"a cat dies": 0, "nested": {"x":1}}"#;
    let backend = MockBackend::new().respond(raw).respond("{}");

    let err = classifier(&backend)
        .classify("Joker", &Ok(summary()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifyError::Malformed { raw: ref r, .. } if r == raw));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn backend_failure_is_reported() {
    let backend = MockBackend::new().fail("quota exceeded");

    let err = classifier(&backend)
        .classify("Joker", &Ok(summary()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifyError::Backend(_)));
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn long_inputs_are_capped() {
    let backend = MockBackend::new().respond("{}");
    let prompts = PromptAssembler::new(
        &reference_set(),
        PromptLimits {
            max_script_chars: 64,
            max_summary_chars: 32,
        },
    );
    let classifier = TriggerClassifier::new(Box::new(backend.clone()), prompts);

    let mut long_script = script();
    long_script.text = "INT. HARGA - DAY\n".repeat(500);
    classifier
        .classify("Midsommar", &Ok(summary()), Some(&long_script))
        .await
        .unwrap();

    let (_, user) = backend.prompts().remove(0);
    assert_eq!(user.matches("[... truncated ...]").count(), 2);
    assert!(user.len() < 1_000);
}
