use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SummaryError;

// --- Query ---

/// One movie to analyze. Built per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieQuery {
    pub title: String,
    /// IMDb-style identifier, e.g. `tt7286456`.
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
}

impl MovieQuery {
    pub fn new(title: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            external_id: external_id.into(),
            director: None,
        }
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }
}

/// Canonical `tt`-prefixed form of an IMDb-style identifier.
///
/// Accepts `tt0298203`, `0298203` and surrounding whitespace. Returns `None`
/// when there are no digits to work with.
pub fn normalize_external_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("tt")
        .or_else(|| trimmed.strip_prefix("TT"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("tt{digits}"))
}

// --- Sections ---

/// One entry in a page's section index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub index: u32,
    pub heading: String,
}

/// A section whose rendered markup has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: u32,
    pub heading: String,
    pub raw_html: String,
}

// --- Summary ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub heading: String,
    pub text: String,
}

/// Heading → cleaned text, in page order, headings unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary {
    sections: Vec<SummarySection>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section. A repeated heading keeps its first position and
    /// takes the newer text.
    pub fn insert(&mut self, heading: impl Into<String>, text: impl Into<String>) {
        let heading = heading.into();
        let text = text.into();
        match self.sections.iter_mut().find(|s| s.heading == heading) {
            Some(existing) => existing.text = text,
            None => self.sections.push(SummarySection { heading, text }),
        }
    }

    pub fn get(&self, heading: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.heading == heading)
            .map(|s| s.text.as_str())
    }

    pub fn sections(&self) -> &[SummarySection] {
        &self.sections
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.heading.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Plain-text rendering used inside prompts.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("## {}\n{}", s.heading, s.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .sections
            .iter()
            .map(|s| (s.heading.clone(), serde_json::Value::String(s.text.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(String, String)> for Summary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut summary = Summary::new();
        for (heading, text) in iter {
            summary.insert(heading, text);
        }
        summary
    }
}

pub type SummaryResult = Result<Summary, SummaryError>;

/// JSON form of a summary lookup: the heading map, or `{"error": "..."}`.
pub fn summary_to_json(result: &SummaryResult) -> serde_json::Value {
    match result {
        Ok(summary) => summary.to_json(),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

// --- Script ---

/// Extracted screenplay text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub source: String,
    pub url: String,
    pub text: String,
}

// --- Triggers ---

/// Binary presence of one trigger label. Serialized as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Presence {
    Absent,
    Present,
}

impl Presence {
    pub fn as_u8(self) -> u8 {
        match self {
            Presence::Absent => 0,
            Presence::Present => 1,
        }
    }

    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

impl From<bool> for Presence {
    fn from(present: bool) -> Self {
        if present {
            Presence::Present
        } else {
            Presence::Absent
        }
    }
}

impl Serialize for Presence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Presence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PresenceVisitor;

        impl Visitor<'_> for PresenceVisitor {
            type Value = Presence;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("0 or 1")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Presence, E> {
                match v {
                    0 => Ok(Presence::Absent),
                    1 => Ok(Presence::Present),
                    other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Presence, E> {
                match v {
                    0 => Ok(Presence::Absent),
                    1 => Ok(Presence::Present),
                    other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
                }
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Presence, E> {
                Ok(Presence::from(v))
            }
        }

        deserializer.deserialize_any(PresenceVisitor)
    }
}

/// Trigger label → presence. Untrusted until checked with
/// [`TriggerVocabulary::validate`](crate::TriggerVocabulary::validate).
pub type TriggerMap = BTreeMap<String, Presence>;

/// Deserialize a [`TriggerMap`], rejecting any label that appears more than once.
///
/// A plain map deserialization keeps the last duplicate silently, which would
/// let a repeated label pass the key-set check.
pub fn deserialize_trigger_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<TriggerMap, D::Error> {
    struct TriggerMapVisitor;

    impl<'de> Visitor<'de> for TriggerMapVisitor {
        type Value = TriggerMap;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping trigger labels to 0 or 1")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TriggerMap, A::Error> {
            let mut map = TriggerMap::new();
            while let Some((label, presence)) = access.next_entry::<String, Presence>()? {
                if map.contains_key(&label) {
                    return Err(de::Error::custom(format!("duplicate trigger label `{label}`")));
                }
                map.insert(label, presence);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(TriggerMapVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_normalization() {
        assert_eq!(normalize_external_id("tt0298203").as_deref(), Some("tt0298203"));
        assert_eq!(normalize_external_id(" 0298203 ").as_deref(), Some("tt0298203"));
        assert_eq!(normalize_external_id("tt"), None);
        assert_eq!(normalize_external_id("tt12ab"), None);
    }

    #[test]
    fn summary_keeps_first_position_for_repeated_heading() {
        let mut summary = Summary::new();
        summary.insert("Plot", "first");
        summary.insert("Themes", "themes");
        summary.insert("Plot", "second");

        assert_eq!(summary.headings().collect::<Vec<_>>(), vec!["Plot", "Themes"]);
        assert_eq!(summary.get("Plot"), Some("second"));
    }

    #[test]
    fn summary_json_preserves_page_order() {
        let summary: Summary = vec![
            ("Synopsis".to_string(), "b".to_string()),
            ("Analysis".to_string(), "a".to_string()),
        ]
        .into_iter()
        .collect();

        let json = summary_to_json(&Ok(summary));
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Synopsis", "Analysis"]);
    }

    #[test]
    fn summary_error_renders_sentinel() {
        let json = summary_to_json(&Err(SummaryError::NoPageFound));
        assert_eq!(json, serde_json::json!({"error": "no page found"}));
    }

    #[test]
    fn presence_accepts_only_binary_values() {
        let map: TriggerMap =
            serde_json::from_str(r#"{"a cat dies": 0, "someone dies": 1, "a car crashes": true}"#)
                .unwrap();
        assert_eq!(map["a cat dies"], Presence::Absent);
        assert_eq!(map["someone dies"], Presence::Present);
        assert_eq!(map["a car crashes"], Presence::Present);

        assert!(serde_json::from_str::<TriggerMap>(r#"{"a cat dies": 2}"#).is_err());
        assert!(serde_json::from_str::<TriggerMap>(r#"{"a cat dies": "1"}"#).is_err());
        assert!(serde_json::from_str::<TriggerMap>(r#"{"nested": {"x": 1}}"#).is_err());
    }

    #[test]
    fn repeated_label_is_rejected() {
        let parse = |raw: &str| deserialize_trigger_map(&mut serde_json::Deserializer::from_str(raw));

        let err = parse(r#"{"a cat dies": 1, "someone dies": 0, "a cat dies": 0}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate trigger label `a cat dies`"));

        let map = parse(r#"{"a cat dies": 1, "someone dies": 0}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a cat dies"], Presence::Present);
        assert!(parse(r#"["a cat dies"]"#).is_err());
    }

    #[test]
    fn presence_serializes_as_integer() {
        let mut map = TriggerMap::new();
        map.insert("someone is stabbed".to_string(), Presence::Present);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"someone is stabbed":1}"#
        );
    }
}
