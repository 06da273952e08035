//! Parsing of the prover's textual report.
//!
//! Tamarin ends its output with a summary block:
//!
//! ```text
//! ==============================================================================
//! summary of summaries:
//!
//! analyzed: theory.spthy
//!
//!   secrecy (all-traces): verified (12 steps)
//!   auth (all-traces): falsified - found trace (8 steps)
//!
//! ==============================================================================
//! ```
//!
//! Everything here is best-effort: a truncated or missing report (the prover
//! crashed or was killed by the timeout) yields no names and an inconclusive
//! verdict instead of an error.

use crate::Verdict;

const DELIMITER: &str = "=====";
const HEADER_LINES: usize = 4;

/// Lines of the lemma-listing section, positioned right after the header.
fn listing_lines(report: &str) -> impl Iterator<Item = &str> {
    let mut lines = report.lines();
    for line in lines.by_ref() {
        if line.starts_with(DELIMITER) {
            break;
        }
    }
    lines.skip(HEADER_LINES)
}

/// First whitespace-delimited token of a listing line.
pub fn leading_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// All lemma names listed in the report, in report order.
pub fn extract_all_lemma_names(report: &str) -> Vec<String> {
    listing_lines(report)
        .take_while(|line| !line.trim().is_empty())
        .map(|line| leading_token(line).to_string())
        .collect()
}

/// The prover's verdict for `lemma_name`.
pub fn extract_verdict(report: &str, lemma_name: &str) -> Verdict {
    let Some(line) = listing_lines(report).find(|line| leading_token(line) == lemma_name) else {
        return Verdict::Inconclusive;
    };
    if line.contains("falsified") {
        Verdict::Disproved
    } else if line.contains("verified") {
        Verdict::Proved
    } else {
        Verdict::Inconclusive
    }
}
