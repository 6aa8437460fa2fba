// Test mocks for the classifier.
//
// - MockBackend (GenerativeBackend): canned responses, records prompts
// - reference_set(): small three-example reference data over a short vocabulary

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use triggerwatch_common::{Presence, Summary, TriggerMap, TriggerVocabulary};

use crate::classifier::GenerativeBackend;
use crate::reference::{ReferenceSet, WorkedExample};

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Answers each call with the next queued response. An empty queue is an error.
/// Clones share the queue and the prompt log.
#[derive(Clone, Default)]
pub struct MockBackend {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// `(system, user)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => bail!("MockBackend: {message}"),
            None => bail!("MockBackend: no response queued"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference data helpers
// ---------------------------------------------------------------------------

pub const TEST_LABELS: [&str; 4] = [
    "a cat dies",
    "someone is stabbed",
    "there's blood",
    "someone dies by suicide",
];

pub fn test_vocabulary() -> TriggerVocabulary {
    TriggerVocabulary::from_labels(1, TEST_LABELS).unwrap()
}

/// Full mapping over [`TEST_LABELS`] with the given labels present.
pub fn labels_with(present: &[&str]) -> TriggerMap {
    TEST_LABELS
        .iter()
        .map(|l| (l.to_string(), Presence::from(present.contains(l))))
        .collect()
}

pub fn worked_example(title: &str, present: &[&str]) -> WorkedExample {
    let summary: Summary = [("Plot".to_string(), format!("Plot of {title}."))]
        .into_iter()
        .collect();
    WorkedExample {
        title: title.to_string(),
        director: None,
        external_id: "tt0000000".to_string(),
        summary,
        script: format!("INT. {} - DAY", title.to_uppercase()),
        labels: labels_with(present),
    }
}

pub fn reference_set() -> ReferenceSet {
    ReferenceSet::from_parts(
        1,
        test_vocabulary(),
        vec![
            worked_example("Joker (2019)", &["there's blood", "someone is stabbed"]),
            worked_example("Whiplash (2014)", &["there's blood"]),
            worked_example("Midsommar (2019)", &["there's blood", "someone dies by suicide"]),
        ],
    )
    .unwrap()
}
