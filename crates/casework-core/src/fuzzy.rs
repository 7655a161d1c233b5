//! Weighted approximate-substring matcher.
//!
//! Scores follow the convention of Bitap-style fuzzy search libraries:
//! `0.0` is a perfect match and `1.0` is no similarity at all.
//!
//! # Field scoring
//!
//! For each field the matcher looks for the window of the (lowercased) text
//! with the smallest Levenshtein distance to the (lowercased) pattern:
//!
//! ```text
//! field_score = errors / pattern_len + location / distance
//! ```
//!
//! A field is a hit when `field_score <= threshold`. An exact match at
//! offset 0 is floored at `0.001` so that a hit never scores zero.
//!
//! # Record scoring
//!
//! Field hits are combined multiplicatively:
//!
//! ```text
//! record_score = Π field_score ^ (weight × norm)
//! norm         = 1 / sqrt(token_count)   (3 decimals)
//! ```
//!
//! Weights are normalized by their sum, so only their ratios matter. Short
//! fields (few tokens) get a larger exponent and therefore pull the score
//! down harder than long ones.

/// Lowest score a hit can receive.
const MIN_SCORE: f64 = 0.001;

/// Tunables for the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyOptions {
    /// Maximum field score that still counts as a hit, in `(0, 1]`.
    pub threshold: f64,
    /// How many characters away from the start of a field a match can sit
    /// before its location penalty alone reaches `1.0`.
    pub distance: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            distance: 100,
        }
    }
}

/// Where and how well a pattern matched a single field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    pub score: f64,
    /// Character offset of the best window.
    pub location: usize,
    /// Edit distance between the pattern and the best window.
    pub errors: usize,
}

/// Score `pattern` against `text`, returning `None` when no window scores
/// within the threshold.
pub fn match_field(pattern: &str, text: &str, options: &FuzzyOptions) -> Option<FieldMatch> {
    let pattern = pattern.to_lowercase();
    let pattern_len = pattern.chars().count();
    if pattern_len == 0 {
        return None;
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();
    if text.is_empty() {
        return None;
    }

    let distance = options.distance.max(1) as f64;
    let max_errors = (options.threshold * pattern_len as f64).floor() as usize;
    let min_window = pattern_len.saturating_sub(max_errors).max(1);
    let max_window = pattern_len + max_errors;

    let mut best: Option<FieldMatch> = None;

    for start in 0..text.len() {
        let location_penalty = start as f64 / distance;
        if location_penalty > options.threshold {
            break;
        }
        if let Some(b) = best {
            if b.score <= location_penalty {
                break;
            }
        }

        for len in min_window..=max_window {
            let end = start + len;
            if end > text.len() {
                break;
            }
            let window: String = text[start..end].iter().collect();
            let errors = strsim::levenshtein(&pattern, &window);
            if errors > max_errors {
                continue;
            }
            let score = (errors as f64 / pattern_len as f64 + location_penalty).max(MIN_SCORE);
            if score > options.threshold {
                continue;
            }
            let better = match best {
                Some(b) => score < b.score,
                None => true,
            };
            if better {
                best = Some(FieldMatch {
                    score,
                    location: start,
                    errors,
                });
            }
        }
    }

    best
}

/// Field-length norm: `1 / sqrt(tokens)` rounded to three decimals.
pub fn field_norm(text: &str) -> f64 {
    let tokens = text.split_whitespace().count().max(1) as f64;
    (1000.0 / tokens.sqrt()).round() / 1000.0
}

/// Result of scoring one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMatch<K> {
    /// Combined score in `(0, 1]`; lower is better.
    pub score: f64,
    /// Keys of the fields that were hits. A key appears once per matching
    /// value, so list fields may repeat.
    pub hits: Vec<K>,
}

/// Scores records made of keyed text fields against a pattern.
#[derive(Debug, Clone)]
pub struct WeightedMatcher<K> {
    keys: Vec<(K, f64)>,
    options: FuzzyOptions,
}

impl<K: Copy + PartialEq> WeightedMatcher<K> {
    /// Build a matcher from `(key, weight)` pairs. Weights are normalized by
    /// their sum; non-positive weights are treated as `1.0`.
    pub fn new(keys: &[(K, f64)], options: FuzzyOptions) -> Self {
        let keys: Vec<(K, f64)> = keys
            .iter()
            .map(|&(k, w)| (k, if w > 0.0 { w } else { 1.0 }))
            .collect();
        let total: f64 = keys.iter().map(|(_, w)| w).sum();
        let keys = keys.into_iter().map(|(k, w)| (k, w / total)).collect();
        Self { keys, options }
    }

    pub fn options(&self) -> &FuzzyOptions {
        &self.options
    }

    fn weight(&self, key: K) -> Option<f64> {
        self.keys.iter().find(|(k, _)| *k == key).map(|(_, w)| *w)
    }

    /// Score one record. Fields whose key was not registered are ignored.
    /// Returns `None` when no field is a hit.
    pub fn score_record<'a, I>(&self, pattern: &str, fields: I) -> Option<RecordMatch<K>>
    where
        I: IntoIterator<Item = (K, &'a str)>,
    {
        let mut total = 1.0_f64;
        let mut hits = Vec::new();

        for (key, text) in fields {
            let Some(weight) = self.weight(key) else {
                continue;
            };
            if let Some(m) = match_field(pattern, text, &self.options) {
                total *= m.score.powf(weight * field_norm(text));
                hits.push(key);
            }
        }

        if hits.is_empty() {
            None
        } else {
            Some(RecordMatch { score: total, hits })
        }
    }
}
