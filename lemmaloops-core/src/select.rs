//! Which lemmas to run: discovery, allow/deny lists, starting lemma.

use crate::config::AnnotationConfig;
use crate::edit_distance::closest_match;
use crate::prover::{Prover, ProverRequest};
use crate::report::extract_all_lemma_names;
use std::path::Path;
use tracing::{info, warn};

/// All lemmas declared in `theory_path`, in the prover's report order.
///
/// A prover that cannot even list the lemmas yields an empty list.
pub async fn discover_lemmas(prover: &dyn Prover, theory_path: &Path) -> Vec<String> {
    match prover.invoke(&ProverRequest::discovery(theory_path)).await {
        Ok(report) => {
            let names = extract_all_lemma_names(&report.text);
            if names.is_empty() {
                warn!(
                    "no lemmas found in the prover output for {}",
                    theory_path.display()
                );
            }
            names
        }
        Err(e) => {
            warn!("lemma discovery failed for {}: {e}", theory_path.display());
            Vec::new()
        }
    }
}

/// Keep discovered lemmas that are on the allow list, warning about entries
/// the theory does not declare.
pub fn apply_allow_list(lemmas: Vec<String>, allow_list: &[String]) -> Vec<String> {
    for name in allow_list {
        if !lemmas.contains(name) {
            warn!("lemma '{name}' is not declared in the Tamarin theory");
        }
    }
    lemmas
        .into_iter()
        .filter(|l| allow_list.contains(l))
        .collect()
}

pub fn apply_deny_list(lemmas: Vec<String>, deny_list: &[String]) -> Vec<String> {
    lemmas
        .into_iter()
        .filter(|l| !deny_list.contains(l))
        .collect()
}

/// Drop every lemma before the one closest to `starting_lemma`.
pub fn start_at(lemmas: Vec<String>, starting_lemma: &str) -> Vec<String> {
    let Ok(start) = closest_match(&lemmas, starting_lemma) else {
        warn!("no lemma matching '{starting_lemma}' left to start from");
        return Vec::new();
    };
    if start != starting_lemma {
        info!("starting at lemma '{start}' (closest to '{starting_lemma}')");
    }
    let idx = lemmas.iter().position(|l| *l == start).unwrap_or(0);
    lemmas.into_iter().skip(idx).collect()
}

/// Filter `discovered` down to the lemmas to run. The result is always a
/// subsequence of `discovered`.
pub fn select(
    discovered: Vec<String>,
    allow_list: &[String],
    deny_list: &[String],
    starting_lemma: &str,
) -> Vec<String> {
    let mut lemmas = discovered;
    if !allow_list.is_empty() {
        lemmas = apply_allow_list(lemmas, allow_list);
    }
    if !deny_list.is_empty() {
        lemmas = apply_deny_list(lemmas, deny_list);
    }
    if !starting_lemma.is_empty() {
        lemmas = start_at(lemmas, starting_lemma);
    }
    lemmas
}

/// Discover the lemmas of `theory_path` and apply the configured filters.
pub async fn select_lemmas(
    prover: &dyn Prover,
    theory_path: &Path,
    config: &AnnotationConfig,
    starting_lemma: &str,
) -> Vec<String> {
    let discovered = discover_lemmas(prover, theory_path).await;
    select(
        discovered,
        &config.lemma_allow_list,
        &config.lemma_deny_list,
        starting_lemma,
    )
}
