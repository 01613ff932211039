//! Approximate string matching for genre labels.
//!
//! The recommender only needs "best candidate and its score" over a small
//! vocabulary, so matching is a capability behind [`ApproximateMatcher`]. The
//! default [`WeightedRatio`] scorer blends whole-string, best-window,
//! sorted-token and token-set comparisons built on the Indel similarity
//! `2 * lcs / (len_a + len_b)`, reporting integer-valued scores on a 0-100
//! scale.

use std::collections::BTreeSet;

/// Best candidate found for a query
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub label: String,
    /// Closeness on a 0-100 scale, higher is closer
    pub score: f64,
}

/// Capability for picking the closest candidate label to a free-text query
#[cfg_attr(test, mockall::automock)]
pub trait ApproximateMatcher: Send + Sync {
    /// Returns the highest-scoring candidate, or `None` when there are no candidates.
    /// Ties go to the earliest candidate.
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<FuzzyMatch>;
}

/// Weighted-ratio scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

/// Discount applied to the token-based comparisons
const TOKEN_SCALE: f64 = 0.95;

impl WeightedRatio {
    pub fn score(&self, query: &str, candidate: &str) -> f64 {
        let a = preprocess(query);
        let b = preprocess(candidate);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let len_a = a.chars().count() as f64;
        let len_b = b.chars().count() as f64;
        let length_ratio = len_a.max(len_b) / len_a.min(len_b);

        let base = ratio(&a, &b);

        let best = if length_ratio < 1.5 {
            let token_sort = ratio(&sort_tokens(&a), &sort_tokens(&b)) * TOKEN_SCALE;
            let token_set = token_set_ratio(&a, &b, ratio) * TOKEN_SCALE;
            base.max(token_sort).max(token_set)
        } else {
            let scale = if length_ratio < 8.0 { 0.9 } else { 0.6 };
            let partial = partial_ratio(&a, &b) * scale;
            let token_sort =
                partial_ratio(&sort_tokens(&a), &sort_tokens(&b)) * TOKEN_SCALE * scale;
            let token_set = token_set_ratio(&a, &b, partial_ratio) * TOKEN_SCALE * scale;
            base.max(partial).max(token_sort).max(token_set)
        };

        best.round()
    }
}

impl ApproximateMatcher for WeightedRatio {
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<FuzzyMatch> {
        let mut best: Option<FuzzyMatch> = None;

        for candidate in candidates {
            let score = self.score(query, candidate);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(FuzzyMatch {
                    label: candidate.clone(),
                    score,
                });
            }
        }

        best
    }
}

/// Lowercases and turns every non-alphanumeric character into a space
fn preprocess(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.trim().to_lowercase()
}

fn sort_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two char slices
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let total = (a.len() + b.len()) as f64;
    2.0 * lcs_len(a, b) as f64 / total * 100.0
}

/// Indel similarity on a 0-100 scale; 0 when either side is empty
fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Best ratio of the shorter string against every equally long window of the longer
fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return 0.0;
    }

    longer
        .windows(shorter.len())
        .map(|window| indel_ratio(&shorter, window))
        .fold(0.0, f64::max)
}

/// Compares the shared tokens against each side's full token set
fn token_set_ratio(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));

    let combined_a = format!("{} {}", shared, only_a).trim().to_string();
    let combined_b = format!("{} {}", shared, only_b).trim().to_string();

    scorer(&shared, &combined_a)
        .max(scorer(&shared, &combined_b))
        .max(scorer(&combined_a, &combined_b))
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens.copied().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_strings_score_100() {
        assert_eq!(WeightedRatio.score("Comedy", "comedy"), 100.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(WeightedRatio.score("", "Comedy"), 0.0);
        assert_eq!(WeightedRatio.score("|||", "Comedy"), 0.0);
    }

    #[test]
    fn test_typos_score_above_threshold() {
        // lcs 5 of 11 chars
        assert_eq!(WeightedRatio.score("Comdy", "Comedy"), 91.0);
        // lcs 4 of 9 chars
        assert_eq!(WeightedRatio.score("Drma", "Drama"), 89.0);
        // transposition: lcs 5 of 12 chars
        assert_eq!(WeightedRatio.score("Comdey", "Comedy"), 83.0);
    }

    #[test]
    fn test_embedded_label_uses_partial_window() {
        // "zzyzx comedy" vs "comedy": whole-string ratio is 67, best window is 100 * 0.9
        assert_eq!(WeightedRatio.score("Zzyzx|Comedy", "Comedy"), 90.0);
    }

    #[test]
    fn test_reordered_tokens_use_token_comparisons() {
        assert_eq!(WeightedRatio.score("fi sci", "Sci-Fi"), 95.0);
    }

    #[test]
    fn test_token_set_ignores_duplicate_tokens() {
        // sets are equal, so the shared tokens match both sides
        assert_eq!(token_set_ratio("war war drama", "drama war", ratio), 100.0);
    }

    #[test]
    fn test_unrelated_text_scores_low() {
        assert!(WeightedRatio.score("Western", "Animation") < 80.0);
    }

    #[test]
    fn test_lcs_len() {
        let a: Vec<char> = "comdey".chars().collect();
        let b: Vec<char> = "comedy".chars().collect();
        assert_eq!(lcs_len(&a, &b), 5);
        assert_eq!(lcs_len(&a, &[]), 0);
    }

    #[test]
    fn test_best_match_picks_highest_score() {
        let vocabulary = labels(&["Drama", "Comedy", "Crime"]);
        let found = WeightedRatio.best_match("comedie", &vocabulary).unwrap();
        assert_eq!(found.label, "Comedy");
    }

    #[test]
    fn test_best_match_ties_go_to_first_candidate() {
        let vocabulary = labels(&["Action", "action"]);
        let found = WeightedRatio.best_match("ACTION", &vocabulary).unwrap();
        assert_eq!(found.label, "Action");
        assert_eq!(found.score, 100.0);
    }

    #[test]
    fn test_best_match_without_candidates() {
        assert!(WeightedRatio.best_match("Comedy", &[]).is_none());
    }
}
