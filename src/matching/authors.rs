use log::debug;
use std::collections::BTreeSet;

use crate::common::Author;

use super::fuzz::token_sort_ratio;
use super::normalize::normalize_text;

/// Product of remaining list sizes above which pairwise matching is replaced by
/// a single family-name comparison
pub const DEFAULT_AUTHOR_PAIR_LIMIT: usize = 625;

/// Score given to two authors with matching family names but no usable variants
const FAMILY_ONLY_SCORE: f64 = 0.3;

/// Names with equal family names scoring above this get a small boost
const FAMILY_BOOST_THRESHOLD: f64 = 0.6;
const FAMILY_BOOST_FACTOR: f64 = 1.1;

/// Normalized view of an `Author`, with its name variants computed once
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAuthor {
    pub family: String,
    pub given: String,
    pub initials: String,
    pub orcid: Option<String>,
    pub variants: Vec<String>,
}

impl NormalizedAuthor {
    /// Returns None when nothing identifying survives normalization
    pub fn from_author(author: &Author) -> Option<Self> {
        let family = normalize_text(&author.family);
        let given = normalize_text(author.given.as_deref().unwrap_or(""));
        let orcid = author.orcid.clone();

        if family.is_empty() && given.is_empty() && orcid.is_none() {
            return None;
        }

        let initials: String = given
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter_map(|part| part.chars().next())
            .collect();
        let variants = name_variants(&family, &given, &initials);

        Some(Self {
            family,
            given,
            initials,
            orcid,
            variants,
        })
    }
}

pub fn normalize_authors(authors: &[Author]) -> Vec<NormalizedAuthor> {
    authors
        .iter()
        .filter_map(NormalizedAuthor::from_author)
        .collect()
}

/// Spellings an author may appear under: "smith", "john smith", "smith j", "j r smith", ...
fn name_variants(family: &str, given: &str, initials: &str) -> Vec<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();

    if family.chars().count() > 1 {
        names.insert(family.to_string());
    }

    if !given.is_empty() && !family.is_empty() {
        names.insert(format!("{} {}", given, family));
        names.insert(format!("{} {}", family, given));
    }

    if !initials.is_empty() && !family.is_empty() {
        let spaced = spaced_initials(initials);
        names.insert(format!("{} {}", initials, family));
        names.insert(format!("{} {}", spaced, family));
        names.insert(format!("{} {}", family, initials));
        names.insert(format!("{} {}", family, spaced));

        if let Some(first) = initials.chars().next() {
            names.insert(format!("{} {}", first, family));
            names.insert(format!("{} {}", family, first));
        }
    }

    if given.chars().count() > 1 && given != family {
        names.insert(given.to_string());
    }

    if initials.chars().count() > 1 {
        names.insert(initials.to_string());
        names.insert(spaced_initials(initials));
    }

    let mut variants: Vec<String> = names
        .into_iter()
        .filter(|name| name.chars().count() > 1)
        .collect();

    if variants.is_empty() {
        if family.chars().count() == 1 && given.is_empty() {
            variants.push(family.to_string());
        } else if given.chars().count() == 1 && family.is_empty() {
            variants.push(given.to_string());
        }
    }

    variants
}

fn spaced_initials(initials: &str) -> String {
    initials
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two individual authors in [0, 1]
pub fn pair_similarity(a: &NormalizedAuthor, b: &NormalizedAuthor) -> f64 {
    if let (Some(orcid_a), Some(orcid_b)) = (&a.orcid, &b.orcid) {
        return if orcid_a == orcid_b { 1.0 } else { 0.0 };
    }

    let same_family = !a.family.is_empty() && a.family == b.family;

    if a.variants.is_empty() || b.variants.is_empty() {
        return if same_family { FAMILY_ONLY_SCORE } else { 0.0 };
    }

    let mut best = 0.0f64;
    'outer: for name_a in &a.variants {
        for name_b in &b.variants {
            best = best.max(token_sort_ratio(name_a, name_b) / 100.0);
            if best >= 0.999 {
                break 'outer;
            }
        }
    }

    if same_family && best > FAMILY_BOOST_THRESHOLD {
        best = (best * FAMILY_BOOST_FACTOR).min(1.0);
    }
    best
}

/// Author list similarity in [0, 1].
///
/// Authors sharing a canonical ORCID are paired first. The rest are paired
/// greedily by best similarity, or, when `|a| * |c|` exceeds `pair_limit`,
/// compared once as sorted family-name strings. The matched sum is scaled by
/// `2 / (|article| + |candidate|)`, so two identical lists score 1.0.
pub fn author_score(
    article: &[NormalizedAuthor],
    candidate: &[NormalizedAuthor],
    pair_limit: usize,
) -> f64 {
    let total_authors = article.len() + candidate.len();
    if total_authors == 0 {
        return 0.0;
    }

    let mut remaining_article: Vec<&NormalizedAuthor> = article.iter().collect();
    let mut remaining_candidate: Vec<&NormalizedAuthor> = candidate.iter().collect();
    let mut score_sum = 0.0;

    let mut i = 0;
    while i < remaining_article.len() {
        let orcid_match = remaining_article[i].orcid.as_deref().and_then(|orcid| {
            remaining_candidate
                .iter()
                .position(|c| c.orcid.as_deref() == Some(orcid))
        });
        match orcid_match {
            Some(j) => {
                score_sum += 1.0;
                remaining_article.remove(i);
                remaining_candidate.remove(j);
            }
            None => i += 1,
        }
    }

    if !remaining_article.is_empty() && !remaining_candidate.is_empty() {
        let pairs = remaining_article.len().saturating_mul(remaining_candidate.len());
        if pairs > pair_limit {
            debug!(
                "Using family name comparison for large author lists ({} x {})",
                remaining_article.len(),
                remaining_candidate.len()
            );
            let block_size = (remaining_article.len() + remaining_candidate.len()) as f64;
            score_sum += family_block_score(&remaining_article, &remaining_candidate) * block_size
                / 2.0;
        } else {
            score_sum += greedy_pair_sum(&remaining_article, &remaining_candidate);
        }
    }

    ((2.0 * score_sum) / total_authors as f64).clamp(0.0, 1.0)
}

fn greedy_pair_sum(article: &[&NormalizedAuthor], candidate: &[&NormalizedAuthor]) -> f64 {
    let similarities: Vec<Vec<f64>> = article
        .iter()
        .map(|a| candidate.iter().map(|c| pair_similarity(a, c)).collect())
        .collect();

    let mut used_article = vec![false; article.len()];
    let mut used_candidate = vec![false; candidate.len()];
    let mut sum = 0.0;

    for _ in 0..article.len().min(candidate.len()) {
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, row) in similarities.iter().enumerate() {
            if used_article[i] {
                continue;
            }
            for (j, &score) in row.iter().enumerate() {
                if used_candidate[j] {
                    continue;
                }
                if best.map_or(true, |(_, _, top)| score > top) {
                    best = Some((i, j, score));
                }
            }
        }

        match best {
            Some((i, j, score)) => {
                sum += score;
                used_article[i] = true;
                used_candidate[j] = true;
            }
            None => break,
        }
    }

    sum
}

fn family_block_score(article: &[&NormalizedAuthor], candidate: &[&NormalizedAuthor]) -> f64 {
    let joined_families = |authors: &[&NormalizedAuthor]| {
        let mut families: Vec<&str> = authors
            .iter()
            .map(|a| a.family.as_str())
            .filter(|f| !f.is_empty())
            .collect();
        families.sort_unstable();
        families.join(" ")
    };

    let article_families = joined_families(article);
    let candidate_families = joined_families(candidate);
    if article_families.is_empty() || candidate_families.is_empty() {
        return 0.0;
    }
    token_sort_ratio(&article_families, &candidate_families) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORCID_A: &str = "0000-0002-1825-0097";
    const ORCID_B: &str = "0000-0001-5109-3700";

    fn norm(authors: &[Author]) -> Vec<NormalizedAuthor> {
        normalize_authors(authors)
    }

    #[test]
    fn test_name_variants() {
        let author = NormalizedAuthor::from_author(&Author::new("Smith", Some("John Ronald"))).unwrap();
        assert_eq!(author.initials, "jr");
        for expected in ["smith", "john ronald smith", "smith jr", "j r smith", "j smith", "smith j", "jr"] {
            assert!(
                author.variants.iter().any(|v| v == expected),
                "missing variant {:?} in {:?}",
                expected,
                author.variants
            );
        }
    }

    #[test]
    fn test_transliterated_names_match() {
        let cyrillic = NormalizedAuthor::from_author(&Author::new("Иванов", Some("Пётр"))).unwrap();
        let latin = NormalizedAuthor::from_author(&Author::new("Ivanov", Some("P"))).unwrap();
        assert_eq!(cyrillic.family, "ivanov");
        assert!((pair_similarity(&cyrillic, &latin) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hyphenated_given_name_initials() {
        let author = NormalizedAuthor::from_author(&Author::new("Sartre", Some("Jean-Paul"))).unwrap();
        assert_eq!(author.initials, "jp");
    }

    #[test]
    fn test_empty_author_is_dropped() {
        assert!(NormalizedAuthor::from_author(&Author::new("  ", None)).is_none());
        let orcid_only = Author::new("", None).with_orcid(ORCID_A);
        assert!(NormalizedAuthor::from_author(&orcid_only).is_some());
    }

    #[test]
    fn test_identical_lists_with_orcids_score_one() {
        let authors = vec![
            Author::new("Smith", Some("John")).with_orcid(ORCID_A),
            Author::new("Doe", Some("Jane")).with_orcid(ORCID_B),
        ];
        let score = author_score(&norm(&authors), &norm(&authors), DEFAULT_AUTHOR_PAIR_LIMIT);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orcid_match_ignores_name_spelling() {
        let article = vec![Author::new("Müller", Some("Hans")).with_orcid(ORCID_A)];
        let candidate = vec![Author::new("Mueller-Schmidt", Some("H.")).with_orcid(ORCID_A)];
        let score = author_score(&norm(&article), &norm(&candidate), DEFAULT_AUTHOR_PAIR_LIMIT);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_conflicting_orcids_score_zero() {
        let article = vec![Author::new("Smith", Some("John")).with_orcid(ORCID_A)];
        let candidate = vec![Author::new("Smith", Some("John")).with_orcid(ORCID_B)];
        let score = author_score(&norm(&article), &norm(&candidate), DEFAULT_AUTHOR_PAIR_LIMIT);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_empty_lists_do_not_divide_by_zero() {
        assert_eq!(author_score(&[], &[], DEFAULT_AUTHOR_PAIR_LIMIT), 0.0);
        let one = norm(&[Author::new("Smith", Some("John"))]);
        assert_eq!(author_score(&one, &[], DEFAULT_AUTHOR_PAIR_LIMIT), 0.0);
        assert_eq!(author_score(&[], &one, DEFAULT_AUTHOR_PAIR_LIMIT), 0.0);
    }

    #[test]
    fn test_initial_matches_full_given_name() {
        let article = norm(&[Author::new("Smith", Some("J"))]);
        let candidate = norm(&[Author::new("Smith", Some("John"))]);
        let score = author_score(&article, &candidate, DEFAULT_AUTHOR_PAIR_LIMIT);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_pairing_is_order_independent() {
        let article = norm(&[Author::new("Smith", Some("John")), Author::new("Doe", Some("Jane"))]);
        let candidate = norm(&[Author::new("Doe", Some("Jane")), Author::new("Smith", Some("John"))]);
        let score = author_score(&article, &candidate, DEFAULT_AUTHOR_PAIR_LIMIT);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_extra_authors_lower_the_score() {
        let article = norm(&[Author::new("Smith", Some("John"))]);
        let candidate = norm(&[
            Author::new("Smith", Some("John")),
            Author::new("Zhang", Some("Wei")),
            Author::new("Okafor", Some("Chidi")),
        ]);
        let score = author_score(&article, &candidate, DEFAULT_AUTHOR_PAIR_LIMIT);
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pair_limit_switches_to_family_comparison() {
        let article = norm(&[Author::new("Smith", Some("John")), Author::new("Doe", Some("Jane"))]);
        let candidate = norm(&[Author::new("Smith", Some("John")), Author::new("Roe", Some("Richard"))]);

        // 2 x 2 = 4 pairs: at the limit greedy matching is used, above it the fallback
        let greedy = author_score(&article, &candidate, 4);
        let fallback = author_score(&article, &candidate, 3);

        let expected_fallback = token_sort_ratio("doe smith", "roe smith") / 100.0;
        assert!((fallback - expected_fallback).abs() < 1e-9);
        assert!((greedy - fallback).abs() > 1e-6);
    }
}
