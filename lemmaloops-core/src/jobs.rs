//! Turning a theory into the list of prover invocations to make.

use crate::config::AnnotationConfig;
use crate::edit_distance::closest_match;
use crate::prover::Prover;
use crate::select::{discover_lemmas, select_lemmas};
use crate::{Heuristic, LemmaJob};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait JobGenerator: Send + Sync {
    async fn generate(&self) -> Vec<LemmaJob>;
}

/// One job per selected lemma, with Tamarin's default heuristic.
pub struct DefaultJobs {
    prover: Arc<dyn Prover>,
    theory_path: PathBuf,
    config: Arc<AnnotationConfig>,
    starting_lemma: String,
}

impl DefaultJobs {
    pub fn new(
        prover: Arc<dyn Prover>,
        theory_path: impl Into<PathBuf>,
        config: Arc<AnnotationConfig>,
        starting_lemma: impl Into<String>,
    ) -> Self {
        Self {
            prover,
            theory_path: theory_path.into(),
            config,
            starting_lemma: starting_lemma.into(),
        }
    }
}

#[async_trait]
impl JobGenerator for DefaultJobs {
    async fn generate(&self) -> Vec<LemmaJob> {
        select_lemmas(
            self.prover.as_ref(),
            &self.theory_path,
            &self.config,
            &self.starting_lemma,
        )
        .await
        .into_iter()
        .map(|lemma| LemmaJob::new(&self.theory_path, lemma))
        .collect()
    }
}

/// The same lemma once per heuristic, in [`Heuristic::PENETRATION_ORDER`].
///
/// The lemma is whichever declared lemma is closest to the hint; allow and
/// deny lists do not apply.
pub struct PenetrationJobs {
    prover: Arc<dyn Prover>,
    theory_path: PathBuf,
    hint: String,
}

impl PenetrationJobs {
    pub fn new(
        prover: Arc<dyn Prover>,
        theory_path: impl Into<PathBuf>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            prover,
            theory_path: theory_path.into(),
            hint: hint.into(),
        }
    }

    /// The declared lemma the hint resolves to.
    pub async fn resolve_target(&self) -> Option<String> {
        let discovered = discover_lemmas(self.prover.as_ref(), &self.theory_path).await;
        match closest_match(&discovered, &self.hint) {
            Ok(lemma) => {
                info!("penetrating lemma '{lemma}' (requested '{}')", self.hint);
                Some(lemma)
            }
            Err(_) => {
                warn!(
                    "no lemmas in {} to match '{}' against",
                    self.theory_path.display(),
                    self.hint
                );
                None
            }
        }
    }
}

#[async_trait]
impl JobGenerator for PenetrationJobs {
    async fn generate(&self) -> Vec<LemmaJob> {
        let Some(lemma) = self.resolve_target().await else {
            return Vec::new();
        };
        Heuristic::PENETRATION_ORDER
            .iter()
            .map(|&h| LemmaJob::with_heuristic(&self.theory_path, lemma.as_str(), h))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover::{ProverReport, ProverRequest};
    use crate::Result;
    use std::path::Path;

    /// Answers every request with the same listing.
    struct Listing(Vec<&'static str>);

    #[async_trait]
    impl Prover for Listing {
        async fn invoke(&self, _request: &ProverRequest<'_>) -> Result<ProverReport> {
            let mut text = String::from("=====\nsummary of summaries:\n\nanalyzed: t.spthy\n\n");
            for name in &self.0 {
                text.push_str(&format!("  {name} (all-traces): analysis incomplete (1 steps)\n"));
            }
            text.push('\n');
            Ok(ProverReport {
                text,
                ..Default::default()
            })
        }
    }

    fn listing(names: &[&'static str]) -> Arc<dyn Prover> {
        Arc::new(Listing(names.to_vec()))
    }

    #[tokio::test]
    async fn default_jobs_follow_selection() {
        let config = AnnotationConfig {
            lemma_deny_list: vec!["b".into()],
            ..Default::default()
        };
        let gen = DefaultJobs::new(listing(&["a", "b", "c"]), "t.spthy", Arc::new(config), "");
        let jobs = gen.generate().await;
        let names: Vec<_> = jobs.iter().map(|j| j.lemma_name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(jobs.iter().all(|j| j.heuristic() == Heuristic::None));
        assert!(jobs.iter().all(|j| j.theory_path() == Path::new("t.spthy")));
    }

    #[tokio::test]
    async fn penetration_tries_every_heuristic_in_order() {
        let lemmas = listing(&["secrecy", "authentication"]);
        let gen = PenetrationJobs::new(lemmas, "t.spthy", "authentcation");
        let jobs = gen.generate().await;
        assert_eq!(jobs.len(), 8);
        assert!(jobs.iter().all(|j| j.lemma_name() == "authentication"));
        let hs: Vec<_> = jobs.iter().map(|j| j.heuristic()).collect();
        assert_eq!(hs, Heuristic::PENETRATION_ORDER.to_vec());
    }

    #[tokio::test]
    async fn exact_hint_resolves_to_itself() {
        let gen = PenetrationJobs::new(listing(&["secrecy"]), "t.spthy", "secrecy");
        assert_eq!(gen.resolve_target().await.as_deref(), Some("secrecy"));
    }

    #[tokio::test]
    async fn penetration_without_lemmas_has_no_jobs() {
        let gen = PenetrationJobs::new(listing(&[]), "t.spthy", "auth");
        assert!(gen.generate().await.is_empty());
    }
}
