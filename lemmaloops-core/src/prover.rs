//! Running `tamarin-prover`.

use crate::error::{Error, Result};
use crate::scratch::{Scratch, ScratchFile};
use crate::Heuristic;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// What to ask the prover for.
#[derive(Debug, Clone, Copy)]
pub struct ProverRequest<'a> {
    pub theory_path: &'a Path,
    /// `None` only lists the lemmas (no `--prove`).
    pub lemma: Option<&'a str>,
    pub heuristic: Heuristic,
    /// `0` disables the timeout.
    pub timeout_secs: u64,
}

impl<'a> ProverRequest<'a> {
    /// A listing-only request used to discover the lemmas of a theory.
    pub fn discovery(theory_path: &'a Path) -> Self {
        Self {
            theory_path,
            lemma: None,
            heuristic: Heuristic::None,
            timeout_secs: 0,
        }
    }
}

/// Raw prover output plus wall-clock duration (whole seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProverReport {
    pub text: String,
    pub duration_secs: u64,
    pub exit_code: Option<i32>,
    /// The prover was killed at the timeout; `text` is whatever it wrote so far.
    pub timed_out: bool,
}

#[async_trait]
pub trait Prover: Send + Sync {
    async fn invoke(&self, request: &ProverRequest<'_>) -> Result<ProverReport>;
}

/// A program and its arguments, printable for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// Prover executable: `$TAMARIN_PROVER`, else `tamarin-prover` from `PATH`.
pub fn resolve_tamarin() -> PathBuf {
    if let Ok(p) = std::env::var("TAMARIN_PROVER") {
        let p = p.trim();
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    PathBuf::from("tamarin-prover")
}

/// The real prover. It is a direct child of this process, so dropping an
/// in-flight [`Prover::invoke`] kills it.
pub struct TamarinProver {
    executable: PathBuf,
    proof_directory: Option<PathBuf>,
    scratch: Arc<Scratch>,
}

impl TamarinProver {
    pub fn new(executable: impl Into<PathBuf>, scratch: Arc<Scratch>) -> Self {
        Self {
            executable: executable.into(),
            proof_directory: None,
            scratch,
        }
    }

    /// Store each proof as `<dir>/<lemma>.spthy` (`--output=`).
    pub fn with_proof_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.proof_directory = dir.filter(|d| !d.as_os_str().is_empty());
        self
    }

    pub fn command_line(&self, request: &ProverRequest<'_>) -> CommandLine {
        let program = self.executable.display().to_string();
        let mut args = Vec::new();
        if let Some(lemma) = request.lemma {
            args.push(format!("--prove={lemma}"));
        }
        if let Some(code) = request.heuristic.code() {
            args.push(format!("--heuristic={code}"));
        }
        if let (Some(dir), Some(lemma)) = (&self.proof_directory, request.lemma) {
            args.push(format!("--output={}", dir.join(format!("{lemma}.spthy")).display()));
        }
        args.push(request.theory_path.display().to_string());
        CommandLine { program, args }
    }
}

#[async_trait]
impl Prover for TamarinProver {
    async fn invoke(&self, request: &ProverRequest<'_>) -> Result<ProverReport> {
        let cmdline = self.command_line(request);
        debug!("calling tamarin: {cmdline}");

        let report = ScratchFile::new(self.scratch.report_path());
        let stdout = std::fs::File::create(report.path())
            .map_err(|e| Error::scratch(report.path(), e))?;

        let mut cmd = Command::new(&cmdline.program);
        cmd.args(&cmdline.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| Error::spawn(&cmdline.program, e))?;
        let waited = if request.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(request.timeout_secs), child.wait()).await
        } else {
            Ok(child.wait().await)
        };
        let (status, timed_out) = match waited {
            Ok(status) => {
                let status = status.map_err(|e| Error::spawn(&cmdline.program, e))?;
                (Some(status), false)
            }
            Err(_) => {
                debug!(timeout_secs = request.timeout_secs, "tamarin timed out, killing it");
                if let Err(e) = child.kill().await {
                    warn!("failed to kill tamarin after timeout: {e}");
                }
                (None, true)
            }
        };
        let duration_secs = start.elapsed().as_secs();
        let exit_code = status.and_then(|s| s.code());
        debug!(code = ?exit_code, duration_secs, timed_out, "tamarin finished");

        let bytes = tokio::fs::read(report.path())
            .await
            .map_err(|e| Error::scratch(report.path(), e))?;
        Ok(ProverReport {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            duration_secs,
            exit_code,
            timed_out,
        })
    }
}
