//! Running a single job to an outcome.
//!
//! [`ProverRunner`] does the work; [`ProgressRunner`] wraps any runner and
//! keeps an elapsed-time ticker on the terminal while it waits.

use crate::prover::{Prover, ProverRequest};
use crate::report::extract_verdict;
use crate::reporter::Reporter;
use crate::{ExecutionOutcome, LemmaJob, Verdict};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

#[async_trait]
pub trait LemmaRunner: Send + Sync {
    /// Never fails: anything that prevents a verdict is `Inconclusive`.
    async fn run(&self, job: &LemmaJob) -> ExecutionOutcome;
}

#[async_trait]
impl<R: LemmaRunner + ?Sized> LemmaRunner for Arc<R> {
    async fn run(&self, job: &LemmaJob) -> ExecutionOutcome {
        (**self).run(job).await
    }
}

pub struct ProverRunner {
    prover: Arc<dyn Prover>,
    timeout_secs: u64,
}

impl ProverRunner {
    pub fn new(prover: Arc<dyn Prover>, timeout_secs: u64) -> Self {
        Self {
            prover,
            timeout_secs,
        }
    }
}

#[async_trait]
impl LemmaRunner for ProverRunner {
    async fn run(&self, job: &LemmaJob) -> ExecutionOutcome {
        let request = ProverRequest {
            theory_path: job.theory_path(),
            lemma: Some(job.lemma_name()),
            heuristic: job.heuristic(),
            timeout_secs: self.timeout_secs,
        };
        match self.prover.invoke(&request).await {
            Ok(report) => {
                let verdict = if report.timed_out {
                    Verdict::Inconclusive
                } else {
                    extract_verdict(&report.text, job.lemma_name())
                };
                ExecutionOutcome {
                    verdict,
                    duration_secs: report.duration_secs,
                }
            }
            Err(e) => {
                warn!("prover failed on lemma '{}': {e}", job.lemma_name());
                ExecutionOutcome::inconclusive()
            }
        }
    }
}

/// Ticks `<lemma> MM:SS` once per second until the wrapped runner finishes.
pub struct ProgressRunner<R> {
    inner: R,
    reporter: Arc<Reporter>,
}

impl<R: LemmaRunner> ProgressRunner<R> {
    pub fn new(inner: R, reporter: Arc<Reporter>) -> Self {
        Self { inner, reporter }
    }
}

fn progress_label(job: &LemmaJob) -> String {
    match job.heuristic().code() {
        Some(code) => format!("{} heuristic={code}", job.lemma_name()),
        None => job.lemma_name().to_string(),
    }
}

#[async_trait]
impl<R: LemmaRunner> LemmaRunner for ProgressRunner<R> {
    async fn run(&self, job: &LemmaJob) -> ExecutionOutcome {
        let label = progress_label(job);
        let start = Instant::now();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let work = self.inner.run(job);
        tokio::pin!(work);
        loop {
            tokio::select! {
                biased;
                outcome = &mut work => return outcome,
                _ = ticker.tick() => {
                    self.reporter.progress(&label, start.elapsed().as_secs());
                }
            }
        }
    }
}
