//! Fuzzy "did you mean" suggestions and mechanical variant hints for
//! unresolved lookup keys.
//!
//! Suggestion computation is best-effort diagnostics only: it never fails,
//! and identical inputs always produce identical output.

use strsim::normalized_levenshtein;

/// Candidates whose similarity ratio falls below this are never suggested.
const SIMILARITY_CUTOFF: f64 = 0.6;

/// Project prefix of a key, when the key carries a `::` separator.
fn project_prefix(key: &str) -> Option<&str> {
    key.split_once("::")
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
}

/// Rank index keys by edit-distance similarity to an unresolved key.
///
/// When the key names a project (`prefix::rest`), candidates are restricted
/// to keys under the same `prefix::`; if none exist (or the key has no
/// prefix) the full key set is considered. Candidates are scored by
/// normalized Levenshtein similarity against a fixed cutoff, ordered by
/// score descending, ties broken alphabetically, truncated to `limit`.
pub fn suggest_keys<'a, I>(candidates: I, key: &str, limit: usize) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let key = key.trim();
    if key.is_empty() || limit == 0 {
        return Vec::new();
    }

    let all: Vec<&str> = candidates.collect();
    let restricted: Vec<&str> = match project_prefix(key) {
        Some(prefix) => {
            let scoped = format!("{prefix}::");
            let scoped: Vec<&str> = all
                .iter()
                .copied()
                .filter(|candidate| candidate.starts_with(&scoped))
                .collect();
            if scoped.is_empty() { all } else { scoped }
        },
        None => all,
    };

    let mut scored: Vec<(f64, &str)> = restricted
        .into_iter()
        .filter_map(|candidate| {
            let score = normalized_levenshtein(candidate, key);
            (score >= SIMILARITY_CUTOFF).then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Mechanical variant hints derived from the key's separators.
///
/// Emits a dotted form (slash separators collapsed to periods) and, when the
/// key carries a project prefix, a slash-restored form (`prefix::` kept
/// intact, periods in the rest turned back into slashes). Hints equal to the
/// key itself are dropped and duplicates within the list removed, order
/// preserved. Overlap with the fuzzy suggestions is deliberate; both
/// diagnostics fire independently.
pub fn variant_hints(key: &str) -> Vec<String> {
    let mut hints = Vec::new();

    let dotted = key.replace("//", ".").replace('/', ".");
    if dotted != key {
        hints.push(dotted);
    }

    if let Some((prefix, rest)) = key.split_once("::") {
        let slashed = format!("{prefix}::{}", rest.replace('.', "/"));
        if slashed != key && !hints.contains(&slashed) {
            hints.push(slashed);
        }
    }

    hints
}
