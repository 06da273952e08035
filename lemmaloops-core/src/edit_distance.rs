//! Levenshtein distance and fuzzy lemma-name resolution.

use crate::error::{Error, Result};

/// Minimum number of single-character insertions, deletions and substitutions
/// turning `a` into `b`.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    // prev[j] is the distance between the prefix of `a` seen so far and `b[..j]`.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            let delete = prev[j + 1] + 1;
            let insert = cur[j] + 1;
            cur[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Pick the candidate closest to `target`.
///
/// Ties go to the candidate that appears first; callers rely on this to make
/// typo'd lemma names resolve deterministically.
pub fn closest_match<S: AsRef<str>>(candidates: &[S], target: &str) -> Result<String> {
    let mut best: Option<(usize, &str)> = None;
    for cand in candidates {
        let cand = cand.as_ref();
        let d = distance(target, cand);
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, cand));
        }
    }
    best.map(|(_, s)| s.to_string())
        .ok_or_else(|| Error::NoMatchFound {
            target: target.to_string(),
        })
}
