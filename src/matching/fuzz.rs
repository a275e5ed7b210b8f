//! Fuzzy string similarity in the rapidfuzz style.
//!
//! All measures return a value in `[0, 100]`. `ratio` is rapidfuzz's
//! normalized Indel similarity, `2 * LCS / (len_a + len_b)`, over chars. The
//! partial and token variants are composed on top of it here; the token
//! variants tokenize on whitespace and expect normalized input.

use rapidfuzz::fuzz;
use std::collections::BTreeSet;

/// Scale applied to token based ratios inside `wratio`
const UNBASE_SCALE: f64 = 0.95;

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.iter().copied(), b.iter().copied())
}

/// Normalized Indel similarity of the two strings
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.chars(), b.chars())
}

/// Best `ratio` of `short` against every alignment with `long`, including
/// the ones hanging over either edge
fn partial_alignment(short: &[char], long: &[char]) -> f64 {
    let n = short.len();
    let mut best = 0.0f64;

    for end in 1..n.min(long.len() + 1) {
        best = best.max(ratio_chars(short, &long[..end]));
    }
    for start in 0..=(long.len() - n) {
        best = best.max(ratio_chars(short, &long[start..start + n]));
        if best >= 100.0 {
            return best;
        }
    }
    for start in (long.len() - n + 1)..long.len() {
        best = best.max(ratio_chars(short, &long[start..]));
    }
    best
}

/// Best `ratio` of the shorter string against the substrings of the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let best = partial_alignment(&short, &long);
    if short.len() == long.len() {
        best.max(partial_alignment(&long, &short))
    } else {
        best
    }
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_nonempty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{} {}", left, right),
    }
}

/// `ratio` after sorting the whitespace separated tokens of both strings
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compares the shared token set against each side's full token set.
///
/// A string whose tokens are all contained in the other scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let combined_ab = join_nonempty(&sect, &diff_ab.join(" "));
    let combined_ba = join_nonempty(&sect, &diff_ba.join(" "));

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.intersection(&tokens_b).next().is_some() {
        return 100.0;
    }

    let sorted = partial_ratio(&sorted_tokens(a), &sorted_tokens(b));
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();
    sorted.max(partial_ratio(&diff_ab.join(" "), &diff_ba.join(" ")))
}

/// Weighted combination of the other measures, picked by the length ratio
pub fn wratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let end_ratio = ratio(a, b);

    if len_ratio < 1.5 {
        let token_ratio = token_set_ratio(a, b).max(token_sort_ratio(a, b));
        return end_ratio.max(token_ratio * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let end_ratio = end_ratio.max(partial_ratio(a, b) * partial_scale);
    end_ratio.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}
