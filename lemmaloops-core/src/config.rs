//! JSON run configuration: lemma allow/deny lists and fact annotations.
//!
//! ```json
//! {
//!   "lemma_allow_list": ["secrecy", "auth"],
//!   "lemma_deny_list": [],
//!   "global_annotations": { "important_facts": ["Key"], "unimportant_facts": ["Log"] },
//!   "lemma_annotations": [
//!     { "lemma_name": "auth", "neutral_facts": ["Key"] }
//!   ]
//! }
//! ```
//!
//! Every field is optional and defaults to empty.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Facts annotated in one scope (globally, or for one lemma).
///
/// The three lists are expected to be disjoint, but nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactAnnotationSet {
    pub important_facts: Vec<String>,
    pub unimportant_facts: Vec<String>,
    pub neutral_facts: Vec<String>,
}

impl FactAnnotationSet {
    /// Whether `fact` is annotated in any of the three categories.
    pub fn annotates(&self, fact: &str) -> bool {
        [
            &self.important_facts,
            &self.unimportant_facts,
            &self.neutral_facts,
        ]
        .iter()
        .any(|facts| facts.iter().any(|f| f == fact))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct LemmaAnnotationEntry {
    lemma_name: String,
    #[serde(flatten)]
    facts: FactAnnotationSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct RawConfig {
    lemma_allow_list: Vec<String>,
    lemma_deny_list: Vec<String>,
    global_annotations: FactAnnotationSet,
    lemma_annotations: Vec<LemmaAnnotationEntry>,
}

/// Read-only configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationConfig {
    pub global_annotations: FactAnnotationSet,
    pub lemma_annotations: HashMap<String, FactAnnotationSet>,
    pub lemma_allow_list: Vec<String>,
    pub lemma_deny_list: Vec<String>,
}

impl AnnotationConfig {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;
        let mut lemma_annotations = HashMap::new();
        // A later entry for the same lemma replaces an earlier one.
        for entry in raw.lemma_annotations {
            lemma_annotations.insert(entry.lemma_name, entry.facts);
        }
        Ok(Self {
            global_annotations: raw.global_annotations,
            lemma_annotations,
            lemma_allow_list: raw.lemma_allow_list,
            lemma_deny_list: raw.lemma_deny_list,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| Error::ConfigJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Annotations that apply to `lemma_name` only (empty when none).
    pub fn local_annotations(&self, lemma_name: &str) -> Option<&FactAnnotationSet> {
        self.lemma_annotations.get(lemma_name)
    }

    /// Whether `fact` is annotated (in any category) specifically for `lemma_name`.
    pub fn fact_is_annotated_locally(&self, fact: &str, lemma_name: &str) -> bool {
        self.local_annotations(lemma_name)
            .is_some_and(|set| set.annotates(fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_empty_config() {
        let cfg = AnnotationConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, AnnotationConfig::default());
    }

    #[test]
    fn full_config_parses() {
        let cfg = AnnotationConfig::from_json_str(
            r#"{
                "lemma_allow_list": ["a", "b"],
                "lemma_deny_list": ["c"],
                "global_annotations": {"important_facts": ["Key"], "unimportant_facts": ["Log"]},
                "lemma_annotations": [
                    {"lemma_name": "a", "neutral_facts": ["Key"]},
                    {"lemma_name": "b", "important_facts": ["Nonce"], "unimportant_facts": ["Key"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.lemma_allow_list, vec!["a", "b"]);
        assert_eq!(cfg.lemma_deny_list, vec!["c"]);
        assert_eq!(cfg.global_annotations.important_facts, vec!["Key"]);
        assert_eq!(cfg.global_annotations.neutral_facts, Vec::<String>::new());
        assert!(cfg.fact_is_annotated_locally("Key", "a"));
        assert!(cfg.fact_is_annotated_locally("Key", "b"));
        assert!(!cfg.fact_is_annotated_locally("Log", "a"));
        assert!(!cfg.fact_is_annotated_locally("Key", "unknown"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AnnotationConfig::from_json_str("{\"lemma_allow_list\": 3}").is_err());
        assert!(AnnotationConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let td = tempfile::tempdir().unwrap();
        let err = AnnotationConfig::load(&td.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigIo { .. }));
    }

    #[test]
    fn load_reads_file() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("cfg.json");
        std::fs::write(&p, r#"{"lemma_deny_list": ["slow"]}"#).unwrap();
        let cfg = AnnotationConfig::load(&p).unwrap();
        assert_eq!(cfg.lemma_deny_list, vec!["slow"]);
    }
}
