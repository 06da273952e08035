//! Per-lemma fact renaming through `m4`.
//!
//! Tamarin ranks goals partly by fact name: facts prefixed with `F_` are
//! solved early, facts prefixed with `L_` late. Instead of editing the theory
//! by hand for every lemma, we prepend one `define` per annotated fact and let
//! `m4` rename every occurrence, keeping the argument list:
//!
//! ```text
//! changequote(<!,!>)
//! changecom(<!/*!>, <!*/!>)
//! define(Key, F_Key($*))
//! define(Log, L_Log($*))
//! theory Example begin ...
//! ```
//!
//! The two quoting directives keep `'` and `` ` `` in the theory (Tamarin uses
//! them for constants) away from m4's default quote characters.

use crate::annotations::facts_to_rewrite;
use crate::config::AnnotationConfig;
use crate::error::{Error, Result};
use crate::scratch::{Scratch, ScratchFile};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

pub const IMPORTANT_PREFIX: &str = "F_";
pub const UNIMPORTANT_PREFIX: &str = "L_";

pub const QUOTING_DIRECTIVES: [&str; 2] = ["changequote(<!,!>)", "changecom(<!/*!>, <!*/!>)"];

/// `define(F, <prefix>F($*))`
pub fn prefix_directive(prefix: &str, fact: &str) -> String {
    format!("define({fact}, {prefix}{fact}($*))")
}

/// Rename directives for `lemma_name`: important facts first, then unimportant.
pub fn macro_directives(lemma_name: &str, config: &AnnotationConfig) -> Vec<String> {
    let facts = facts_to_rewrite(lemma_name, config);
    facts
        .important
        .iter()
        .map(|f| prefix_directive(IMPORTANT_PREFIX, f))
        .chain(
            facts
                .unimportant
                .iter()
                .map(|f| prefix_directive(UNIMPORTANT_PREFIX, f)),
        )
        .collect()
}

/// Full macro-tool input: quoting directives, rename directives, then the
/// theory verbatim (one line each, newline-terminated).
pub fn macro_input(directives: &[String], theory: &str) -> String {
    let mut out = String::with_capacity(theory.len() + 64 * (directives.len() + 2));
    for line in QUOTING_DIRECTIVES
        .iter()
        .copied()
        .chain(directives.iter().map(String::as_str))
        .chain(theory.lines())
    {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Macro tool executable: `$M4`, else `m4` from `PATH`.
pub fn resolve_m4() -> PathBuf {
    if let Ok(p) = std::env::var("M4") {
        let p = p.trim();
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    PathBuf::from("m4")
}

/// A rewritten theory file; removed when dropped.
#[derive(Debug)]
pub struct RewrittenTheory {
    file: ScratchFile,
}

impl RewrittenTheory {
    /// Take ownership of `path`; it is removed when this guard is dropped.
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            file: ScratchFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
pub trait TheoryPreprocessor: Send + Sync {
    /// Produce the theory the prover should see for `lemma_name`.
    async fn rewrite(&self, theory_path: &Path, lemma_name: &str) -> Result<RewrittenTheory>;
}

pub struct M4Rewriter {
    m4: PathBuf,
    config: Arc<AnnotationConfig>,
    scratch: Arc<Scratch>,
}

impl M4Rewriter {
    pub fn new(
        m4: impl Into<PathBuf>,
        config: Arc<AnnotationConfig>,
        scratch: Arc<Scratch>,
    ) -> Self {
        Self {
            m4: m4.into(),
            config,
            scratch,
        }
    }
}

#[async_trait]
impl TheoryPreprocessor for M4Rewriter {
    async fn rewrite(&self, theory_path: &Path, lemma_name: &str) -> Result<RewrittenTheory> {
        let directives = macro_directives(lemma_name, &self.config);
        if !directives.is_empty() {
            debug!("fact annotations for {lemma_name}:\n{}", directives.join("\n"));
        }

        let theory = tokio::fs::read_to_string(theory_path)
            .await
            .map_err(|source| Error::TheoryIo {
                path: theory_path.to_path_buf(),
                source,
            })?;

        let input = ScratchFile::new(self.scratch.macro_input_path());
        tokio::fs::write(input.path(), macro_input(&directives, &theory))
            .await
            .map_err(|e| Error::scratch(input.path(), e))?;

        // Owned from here on so a failing m4 run still cleans up.
        let rewritten = RewrittenTheory::new(self.scratch.rewritten_path());
        let stdout = std::fs::File::create(rewritten.path())
            .map_err(|e| Error::scratch(rewritten.path(), e))?;

        let program = self.m4.display().to_string();
        let status = Command::new(&self.m4)
            .arg(input.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| Error::spawn(&program, e))?;
        if !status.success() {
            return Err(Error::MacroTool {
                program,
                status: status.to_string(),
            });
        }
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactAnnotationSet;

    fn config() -> AnnotationConfig {
        let mut cfg = AnnotationConfig::default();
        cfg.global_annotations.important_facts = vec!["Key".into()];
        cfg.global_annotations.unimportant_facts = vec!["Log".into()];
        cfg.lemma_annotations.insert(
            "auth".into(),
            FactAnnotationSet {
                unimportant_facts: vec!["Key".into()],
                ..Default::default()
            },
        );
        cfg
    }

    #[test]
    fn directive_shape() {
        assert_eq!(prefix_directive("F_", "Key"), "define(Key, F_Key($*))");
    }

    #[test]
    fn directives_follow_annotations() {
        assert_eq!(
            macro_directives("secrecy", &config()),
            vec!["define(Key, F_Key($*))", "define(Log, L_Log($*))"]
        );
        assert_eq!(
            macro_directives("auth", &config()),
            vec!["define(Log, L_Log($*))", "define(Key, L_Key($*))"]
        );
    }

    #[test]
    fn input_starts_with_quoting_directives() {
        let text = macro_input(&["define(A, F_A($*))".to_string()], "theory T\nbegin\nend");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "changequote(<!,!>)",
                "changecom(<!/*!>, <!*/!>)",
                "define(A, F_A($*))",
                "theory T",
                "begin",
                "end"
            ]
        );
        assert!(text.ends_with("end\n"));
    }

    // `cat` plays the macro tool: the output is the macro input itself.
    #[cfg(unix)]
    #[tokio::test]
    async fn rewrite_runs_tool_and_owns_output() {
        let td = tempfile::tempdir().unwrap();
        let theory = td.path().join("t.spthy");
        std::fs::write(
            &theory,
            "theory T begin\nrule R: [ Key(k) ] --> [ Log(k) ]\nend\n",
        )
        .unwrap();
        let scratch = Arc::new(Scratch::new().unwrap());
        let rw = M4Rewriter::new("cat", Arc::new(config()), scratch.clone());

        let out = rw.rewrite(&theory, "secrecy").await.unwrap();
        let text = std::fs::read_to_string(out.path()).unwrap();
        assert!(text.starts_with("changequote(<!,!>)\n"));
        assert!(text.contains("define(Key, F_Key($*))\n"));
        assert!(text.ends_with("end\n"));
        assert!(!scratch.macro_input_path().exists());

        let p = out.path().to_path_buf();
        drop(out);
        assert!(!p.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_annotations_still_rewrite() {
        let td = tempfile::tempdir().unwrap();
        let theory = td.path().join("t.spthy");
        std::fs::write(&theory, "theory T begin end\n").unwrap();
        let scratch = Arc::new(Scratch::new().unwrap());
        let rw = M4Rewriter::new("cat", Arc::new(AnnotationConfig::default()), scratch);

        let out = rw.rewrite(&theory, "any").await.unwrap();
        let text = std::fs::read_to_string(out.path()).unwrap();
        assert!(text.ends_with("theory T begin end\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_is_an_error_and_cleans_up() {
        let td = tempfile::tempdir().unwrap();
        let theory = td.path().join("t.spthy");
        std::fs::write(&theory, "theory T begin end\n").unwrap();
        let scratch = Arc::new(Scratch::new().unwrap());
        let rw = M4Rewriter::new("false", Arc::new(config()), scratch.clone());

        let err = rw.rewrite(&theory, "auth").await.unwrap_err();
        assert!(matches!(err, Error::MacroTool { .. }));
        assert!(!scratch.rewritten_path().exists());
        assert!(!scratch.macro_input_path().exists());
    }

    #[tokio::test]
    async fn missing_theory_is_an_error() {
        let scratch = Arc::new(Scratch::new().unwrap());
        let rw = M4Rewriter::new("cat", Arc::new(config()), scratch);
        let err = rw
            .rewrite(Path::new("/nonexistent/t.spthy"), "auth")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TheoryIo { .. }));
    }
}
