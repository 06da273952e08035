//! `lemmaloops-core`: run the Tamarin prover lemma by lemma.
//!
//! Scope:
//! - discover the lemmas of a `.spthy` theory and pick which ones to run
//!   (allow/deny lists, fuzzy starting lemma)
//! - bias Tamarin's search per lemma by rewriting fact names through `m4`
//! - run one `tamarin-prover --prove=<lemma>` per job with a timeout, show a
//!   live elapsed-time ticker, stop early on failure
//! - classify the textual report into verified / falsified / inconclusive and
//!   print a summary
//!
//! Entrypoints:
//! - the CLI binary lives in `lemmaloops-core/src/bin/lemmaloops.rs`
//! - library callers compose a [`jobs::JobGenerator`], a [`runner::LemmaRunner`]
//!   and an [`orchestrator::Orchestrator`]
//!
//! Environment:
//! - `TAMARIN_PROVER`: prover executable (default `tamarin-prover`)
//! - `M4`: macro tool executable (default `m4`)
//! - `RUST_LOG`: log filter for the binary (logs go to stderr)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod annotations;
pub mod config;
pub mod edit_distance;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod prover;
pub mod report;
pub mod reporter;
pub mod rewrite;
pub mod runner;
pub mod scratch;
pub mod select;

pub use error::{Error, Result};

/// Tamarin's search heuristics. Upper and lower case select different
/// variants of the same ranking, so the variant names keep Tamarin's letters.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    S,
    s,
    C,
    c,
    I,
    i,
    P,
    p,
    None,
}

impl Heuristic {
    /// Order in which penetration mode tries the heuristics.
    pub const PENETRATION_ORDER: [Heuristic; 8] = [
        Heuristic::S,
        Heuristic::s,
        Heuristic::I,
        Heuristic::i,
        Heuristic::C,
        Heuristic::c,
        Heuristic::P,
        Heuristic::p,
    ];

    /// The `--heuristic=` argument, or `None` for Tamarin's default.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Heuristic::S => Some("S"),
            Heuristic::s => Some("s"),
            Heuristic::C => Some("C"),
            Heuristic::c => Some("c"),
            Heuristic::I => Some("I"),
            Heuristic::i => Some("i"),
            Heuristic::P => Some("P"),
            Heuristic::p => Some("p"),
            Heuristic::None => None,
        }
    }
}

/// One prover invocation: a lemma of a theory, optionally with a heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LemmaJob {
    theory_path: PathBuf,
    lemma_name: String,
    heuristic: Heuristic,
}

impl LemmaJob {
    pub fn new(theory_path: impl Into<PathBuf>, lemma_name: impl Into<String>) -> Self {
        Self::with_heuristic(theory_path, lemma_name, Heuristic::None)
    }

    pub fn with_heuristic(
        theory_path: impl Into<PathBuf>,
        lemma_name: impl Into<String>,
        heuristic: Heuristic,
    ) -> Self {
        Self {
            theory_path: theory_path.into(),
            lemma_name: lemma_name.into(),
            heuristic,
        }
    }

    pub fn theory_path(&self) -> &Path {
        &self.theory_path
    }

    pub fn lemma_name(&self) -> &str {
        &self.lemma_name
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Same lemma and heuristic against another (rewritten) theory file.
    pub fn with_theory_path(&self, theory_path: impl Into<PathBuf>) -> Self {
        Self {
            theory_path: theory_path.into(),
            lemma_name: self.lemma_name.clone(),
            heuristic: self.heuristic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Proved,
    Disproved,
    /// Timeout, crash, or a report that says neither "verified" nor "falsified".
    Inconclusive,
}

impl Verdict {
    /// Word used in the per-lemma lines and the summary footer.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Proved => "verified",
            Verdict::Disproved => "false",
            Verdict::Inconclusive => "timeout",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub verdict: Verdict,
    pub duration_secs: u64,
}

impl ExecutionOutcome {
    pub fn inconclusive() -> Self {
        Self {
            verdict: Verdict::Inconclusive,
            duration_secs: 0,
        }
    }
}

/// Aggregate of a run. `success` turns false at the first non-proved
/// outcome and stays false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub proved: usize,
    pub disproved: usize,
    pub inconclusive: usize,
    pub total_duration_secs: u64,
    pub success: bool,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            proved: 0,
            disproved: 0,
            inconclusive: 0,
            total_duration_secs: 0,
            success: true,
        }
    }
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ExecutionOutcome) {
        match outcome.verdict {
            Verdict::Proved => self.proved += 1,
            Verdict::Disproved => self.disproved += 1,
            Verdict::Inconclusive => self.inconclusive += 1,
        }
        self.total_duration_secs += outcome.duration_secs;
        if outcome.verdict != Verdict::Proved {
            self.success = false;
        }
    }

    pub fn jobs_executed(&self) -> usize {
        self.proved + self.disproved + self.inconclusive
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        match verdict {
            Verdict::Proved => self.proved,
            Verdict::Disproved => self.disproved,
            Verdict::Inconclusive => self.inconclusive,
        }
    }
}

/// `"1 second"`, `"5 seconds"`.
pub fn seconds_string(secs: u64) -> String {
    format!("{secs} second{}", if secs == 1 { "" } else { "s" })
}

/// `MM:SS` for the progress ticker.
pub fn clock_string(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tracks_failures() {
        let mut s = RunSummary::default();
        assert!(s.success);
        s.record(&ExecutionOutcome {
            verdict: Verdict::Proved,
            duration_secs: 3,
        });
        assert!(s.success);
        s.record(&ExecutionOutcome {
            verdict: Verdict::Inconclusive,
            duration_secs: 10,
        });
        s.record(&ExecutionOutcome {
            verdict: Verdict::Proved,
            duration_secs: 1,
        });
        assert!(!s.success);
        assert_eq!(s.proved, 2);
        assert_eq!(s.inconclusive, 1);
        assert_eq!(s.jobs_executed(), 3);
        assert_eq!(s.total_duration_secs, 14);
    }

    #[test]
    fn time_strings() {
        assert_eq!(seconds_string(1), "1 second");
        assert_eq!(seconds_string(0), "0 seconds");
        assert_eq!(seconds_string(42), "42 seconds");
        assert_eq!(clock_string(0), "00:00");
        assert_eq!(clock_string(75), "01:15");
        assert_eq!(clock_string(6001), "100:01");
    }

    #[test]
    fn rewritten_job_keeps_identity() {
        let job = LemmaJob::with_heuristic("a.spthy", "secrecy", Heuristic::C);
        let moved = job.with_theory_path("/tmp/x.spthy");
        assert_eq!(job.theory_path(), Path::new("a.spthy"));
        assert_eq!(moved.theory_path(), Path::new("/tmp/x.spthy"));
        assert_eq!(moved.lemma_name(), "secrecy");
        assert_eq!(moved.heuristic(), Heuristic::C);
    }

    #[test]
    fn heuristic_codes() {
        assert_eq!(Heuristic::None.code(), None);
        let codes: Vec<_> = Heuristic::PENETRATION_ORDER
            .iter()
            .filter_map(|h| h.code())
            .collect();
        assert_eq!(codes, vec!["S", "s", "I", "i", "C", "c", "P", "p"]);
    }
}
