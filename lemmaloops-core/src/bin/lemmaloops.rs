use anyhow::Context;
use clap::{ArgAction, Parser};
use lemmaloops_core as llc;
use llc::config::AnnotationConfig;
use llc::jobs::{DefaultJobs, JobGenerator, PenetrationJobs};
use llc::orchestrator::{JobRecord, Orchestrator, StopPolicy};
use llc::prover::{resolve_tamarin, Prover, TamarinProver};
use llc::reporter::{Reporter, Sink};
use llc::rewrite::{resolve_m4, M4Rewriter};
use llc::runner::{ProgressRunner, ProverRunner};
use llc::scratch::Scratch;
use llc::RunSummary;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Run the Tamarin prover on the lemmas of a theory, one at a time.
#[derive(Debug, Parser)]
#[command(name = "lemmaloops", version)]
struct Cli {
    /// Tamarin theory (.spthy)
    #[arg(value_parser = existing_file)]
    theory_file: PathBuf,

    /// JSON config with allow/deny lists and fact annotations
    #[arg(short, long, value_parser = existing_file)]
    config_file: Option<PathBuf>,

    /// Also write the report to this file (uncoloured)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// First lemma to verify; the closest declared name is used
    #[arg(short, long, default_value = "")]
    start: String,

    /// Try every heuristic on this lemma until one proves it
    #[arg(long)]
    penetration_lemma: Option<String>,

    /// Directory where Tamarin stores the proofs
    #[arg(short, long)]
    proof_directory: Option<PathBuf>,

    /// Per-lemma timeout in seconds (0 means no timeout)
    #[arg(short, long, default_value_t = 600)]
    timeout: u64,

    /// Stop at the first lemma that is not verified
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    abort_after_failure: bool,

    /// Log prover command lines and fact annotations
    #[arg(short, long)]
    verbose: bool,

    /// Prover executable [default: $TAMARIN_PROVER or tamarin-prover]
    #[arg(long)]
    tamarin_path: Option<PathBuf>,

    /// Macro tool executable [default: $M4 or m4]
    #[arg(long)]
    m4_path: Option<PathBuf>,

    /// Print the lemmas declared in the theory and exit
    #[arg(long)]
    list_lemmas: bool,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if p.is_file() {
        Ok(p)
    } else {
        Err(format!("file does not exist: {s}"))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn write_summary_json(
    path: &Path,
    mode: &str,
    summary: &RunSummary,
    records: &[JobRecord],
) -> anyhow::Result<()> {
    let v = json!({
        "mode": mode,
        "summary": summary,
        "jobs": records,
    });
    let s = serde_json::to_string_pretty(&v).context("json encode")?;
    std::fs::write(path, s + "\n").with_context(|| format!("write {}", path.display()))
}

/// `Ok(true)` when the run succeeded.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match &cli.config_file {
        Some(p) => AnnotationConfig::load(p)?,
        None => AnnotationConfig::default(),
    };
    let config = Arc::new(config);
    let scratch = Arc::new(Scratch::new().context("create scratch directory")?);

    if let Some(dir) = &cli.proof_directory {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create proof directory {}", dir.display()))?;
    }
    let tamarin = cli.tamarin_path.clone().unwrap_or_else(resolve_tamarin);
    let prover: Arc<dyn Prover> = Arc::new(
        TamarinProver::new(tamarin, scratch.clone())
            .with_proof_directory(cli.proof_directory.clone()),
    );

    let mut sinks = vec![Sink::stdout()];
    if let Some(path) = &cli.output_file {
        let f = std::fs::File::create(path)
            .with_context(|| format!("create output file {}", path.display()))?;
        sinks.push(Sink::new(f, false));
    }
    let reporter = Arc::new(Reporter::new(sinks));

    if cli.list_lemmas {
        let lemmas = llc::select::discover_lemmas(prover.as_ref(), &cli.theory_file).await;
        reporter.lemma_list(&lemmas);
        return Ok(true);
    }

    let runner = ProgressRunner::new(
        ProverRunner::new(prover.clone(), cli.timeout),
        reporter.clone(),
    );

    let (mode, summary, records) = match &cli.penetration_lemma {
        Some(hint) => {
            let jobs = PenetrationJobs::new(prover.clone(), &cli.theory_file, hint.as_str())
                .generate()
                .await;
            if let Some(first) = jobs.first() {
                reporter.penetration_header(first.lemma_name(), cli.timeout);
            }
            let orchestrator =
                Orchestrator::new(runner, reporter.clone(), StopPolicy::UntilFirstProof);
            let (summary, records) = orchestrator.run_recorded(&jobs).await;
            ("penetration", summary, records)
        }
        None => {
            reporter.header(&cli.theory_file, cli.timeout);
            let jobs = DefaultJobs::new(
                prover.clone(),
                &cli.theory_file,
                config.clone(),
                cli.start.as_str(),
            )
            .generate()
            .await;
            let m4 = cli.m4_path.clone().unwrap_or_else(resolve_m4);
            let orchestrator = Orchestrator::new(
                runner,
                reporter.clone(),
                StopPolicy::AbortOnFailure(cli.abort_after_failure),
            )
            .with_preprocessor(Arc::new(M4Rewriter::new(m4, config.clone(), scratch.clone())));
            let (summary, records) = orchestrator.run_recorded(&jobs).await;
            ("default", summary, records)
        }
    };

    if let Some(path) = &cli.summary_json {
        if let Err(e) = write_summary_json(path, mode, &summary, &records) {
            tracing::error!("summary json: {e:#}");
        }
    }
    Ok(summary.success)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tokio::select! {
        res = run(cli) => match res {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(1),
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::from(2)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // Dropping `run` kills the prover and removes the scratch directory.
            eprintln!("\ninterrupted");
            ExitCode::from(130)
        }
    }
}
