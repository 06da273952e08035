//! Sequential job execution with fail-fast policies.

use crate::reporter::Reporter;
use crate::rewrite::TheoryPreprocessor;
use crate::runner::LemmaRunner;
use crate::{ExecutionOutcome, Heuristic, LemmaJob, RunSummary, Verdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// When to stop before the job list is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop after the first job that is not proved when `true`.
    AbortOnFailure(bool),
    /// Stop after the first proved job. A run succeeds if any job proved.
    UntilFirstProof,
}

impl StopPolicy {
    fn stops_after(self, verdict: Verdict) -> bool {
        match self {
            StopPolicy::AbortOnFailure(abort) => abort && verdict != Verdict::Proved,
            StopPolicy::UntilFirstProof => verdict == Verdict::Proved,
        }
    }
}

/// One executed job, as recorded for the JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub lemma_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<Heuristic>,
    pub verdict: Verdict,
    pub duration_secs: u64,
}

impl JobRecord {
    fn new(job: &LemmaJob, outcome: &ExecutionOutcome) -> Self {
        Self {
            lemma_name: job.lemma_name().to_string(),
            heuristic: job.heuristic().code().map(|_| job.heuristic()),
            verdict: outcome.verdict,
            duration_secs: outcome.duration_secs,
        }
    }
}

pub struct Orchestrator<R> {
    runner: R,
    preprocessor: Option<Arc<dyn TheoryPreprocessor>>,
    reporter: Arc<Reporter>,
    policy: StopPolicy,
}

impl<R: LemmaRunner> Orchestrator<R> {
    pub fn new(runner: R, reporter: Arc<Reporter>, policy: StopPolicy) -> Self {
        Self {
            runner,
            preprocessor: None,
            reporter,
            policy,
        }
    }

    /// Rewrite the theory for each job before running it.
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn TheoryPreprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub async fn run(&self, jobs: &[LemmaJob]) -> RunSummary {
        self.run_recorded(jobs).await.0
    }

    /// Run `jobs` in order, printing one line per job and the summary footer.
    pub async fn run_recorded(&self, jobs: &[LemmaJob]) -> (RunSummary, Vec<JobRecord>) {
        let mut summary = RunSummary::default();
        let mut records = Vec::with_capacity(jobs.len());

        for (i, job) in jobs.iter().enumerate() {
            let outcome = self.execute(job).await;
            self.reporter.job_line(i + 1, jobs.len(), job, &outcome);
            summary.record(&outcome);
            records.push(JobRecord::new(job, &outcome));

            if self.policy.stops_after(outcome.verdict) {
                if i + 1 < jobs.len() {
                    debug!("stopping after {} of {} jobs", i + 1, jobs.len());
                }
                break;
            }
        }

        if self.policy == StopPolicy::UntilFirstProof {
            summary.success = summary.proved > 0;
        }
        self.reporter.footer(&summary);
        (summary, records)
    }

    async fn execute(&self, job: &LemmaJob) -> ExecutionOutcome {
        let Some(preprocessor) = &self.preprocessor else {
            return self.runner.run(job).await;
        };
        match preprocessor.rewrite(job.theory_path(), job.lemma_name()).await {
            Ok(rewritten) => {
                let outcome = self.runner.run(&job.with_theory_path(rewritten.path())).await;
                drop(rewritten);
                outcome
            }
            Err(e) => {
                warn!("preprocessing for lemma '{}' failed: {e}", job.lemma_name());
                ExecutionOutcome::inconclusive()
            }
        }
    }
}
