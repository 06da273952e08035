//! Which facts get a bias prefix for a given lemma.

use crate::config::AnnotationConfig;
use serde::{Deserialize, Serialize};

/// Facts to rename before proving one lemma, in directive order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactsToRewrite {
    pub important: Vec<String>,
    pub unimportant: Vec<String>,
}

impl FactsToRewrite {
    pub fn is_empty(&self) -> bool {
        self.important.is_empty() && self.unimportant.is_empty()
    }
}

/// Resolve global and per-lemma annotations for `lemma_name`.
///
/// A global annotation is dropped when the lemma annotates the same fact
/// locally, in any category (a local `neutral_facts` entry cancels a global
/// bias). Local annotations are appended after the surviving global ones.
/// Duplicates are kept as written.
pub fn facts_to_rewrite(lemma_name: &str, config: &AnnotationConfig) -> FactsToRewrite {
    let global = &config.global_annotations;
    let not_shadowed =
        |fact: &&String| !config.fact_is_annotated_locally(fact.as_str(), lemma_name);

    let mut important: Vec<String> = global
        .important_facts
        .iter()
        .filter(not_shadowed)
        .cloned()
        .collect();
    let mut unimportant: Vec<String> = global
        .unimportant_facts
        .iter()
        .filter(not_shadowed)
        .cloned()
        .collect();

    if let Some(local) = config.local_annotations(lemma_name) {
        important.extend(local.important_facts.iter().cloned());
        unimportant.extend(local.unimportant_facts.iter().cloned());
    }

    FactsToRewrite {
        important,
        unimportant,
    }
}
