//! Human-readable run report, written to every sink at once.
//!
//! ```text
//! Tamarin Tests for file 'protocol.spthy':
//! Timeout: 600 seconds per lemma
//!
//! secrecy (1/2) verified (12 seconds)
//! auth (2/2) false (3 seconds)
//!
//! Summary:
//! verified: 1, false: 1, timeout: 0
//! Overall duration: 15 seconds
//! ```
//!
//! Interactive sinks (a terminal) additionally get coloured verdicts and the
//! `\r`-overwritten progress ticker; everything else gets plain text.

use crate::{clock_string, seconds_string, ExecutionOutcome, LemmaJob, RunSummary, Verdict};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub struct Sink {
    writer: Box<dyn Write + Send>,
    interactive: bool,
}

impl Sink {
    pub fn new(writer: impl Write + Send + 'static, interactive: bool) -> Self {
        Self {
            writer: Box::new(writer),
            interactive,
        }
    }

    /// Stdout, interactive when it is a terminal.
    pub fn stdout() -> Self {
        let interactive = io::stdout().is_terminal();
        Self::new(io::stdout(), interactive)
    }
}

fn color_code(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Proved => "32",
        Verdict::Disproved => "31",
        Verdict::Inconclusive => "33",
    }
}

#[derive(Default)]
pub struct Reporter {
    sinks: Mutex<Vec<Sink>>,
}

impl Reporter {
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self {
            sinks: Mutex::new(sinks),
        }
    }

    /// Write `render(interactive)` to each sink. Write errors are logged and
    /// otherwise ignored: a closed pipe must not stop the run.
    fn emit(&self, render: impl Fn(bool) -> Option<String>) {
        let mut sinks = match self.sinks.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        for sink in sinks.iter_mut() {
            let Some(text) = render(sink.interactive) else {
                continue;
            };
            let res = sink
                .writer
                .write_all(text.as_bytes())
                .and_then(|()| sink.writer.flush());
            if let Err(e) = res {
                debug!("report write failed: {e}");
            }
        }
    }

    pub fn header(&self, theory_path: &Path, timeout_secs: u64) {
        let name = theory_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| theory_path.display().to_string());
        let timeout = if timeout_secs == 0 {
            "no timeout".to_string()
        } else {
            seconds_string(timeout_secs)
        };
        let text = format!("Tamarin Tests for file '{name}':\nTimeout: {timeout} per lemma\n\n");
        self.emit(|_| Some(text.clone()));
    }

    pub fn penetration_header(&self, lemma_name: &str, timeout_secs: u64) {
        let text = format!(
            "Penetrating lemma '{lemma_name}' with a per-heuristic timeout of {}.\n\n",
            seconds_string(timeout_secs)
        );
        self.emit(|_| Some(text.clone()));
    }

    /// `\r<label> MM:SS `, interactive sinks only.
    pub fn progress(&self, label: &str, elapsed_secs: u64) {
        let text = format!("\r{label} {} ", clock_string(elapsed_secs));
        self.emit(|interactive| interactive.then(|| text.clone()));
    }

    /// `<lemma> (<i>/<n>) <verdict> (<d>)[ heuristic=<h>]`, `index` counting from 1.
    pub fn job_line(&self, index: usize, total: usize, job: &LemmaJob, outcome: &ExecutionOutcome) {
        let prefix = format!("{} ({index}/{total}) ", job.lemma_name());
        let mut suffix = format!(" ({})", seconds_string(outcome.duration_secs));
        if let Some(code) = job.heuristic().code() {
            suffix.push_str(&format!(" heuristic={code}"));
        }
        let verdict = outcome.verdict;
        self.emit(|interactive| {
            Some(if interactive {
                format!(
                    "\r{prefix}\x1b[{}m{verdict}\x1b[m{suffix}\n",
                    color_code(verdict)
                )
            } else {
                format!("{prefix}{verdict}{suffix}\n")
            })
        });
    }

    pub fn footer(&self, summary: &RunSummary) {
        let text = format!(
            "\nSummary: \n{}: {}, {}: {}, {}: {}\nOverall duration: {}\n",
            Verdict::Proved,
            summary.proved,
            Verdict::Disproved,
            summary.disproved,
            Verdict::Inconclusive,
            summary.inconclusive,
            seconds_string(summary.total_duration_secs),
        );
        self.emit(|_| Some(text.clone()));
    }

    /// Discovered lemma names, one per line.
    pub fn lemma_list(&self, lemmas: &[String]) {
        let mut text = String::new();
        for l in lemmas {
            text.push_str(l);
            text.push('\n');
        }
        self.emit(|_| Some(text.clone()));
    }
}
