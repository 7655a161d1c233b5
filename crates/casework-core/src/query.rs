//! Case-study query engine: filter, rank, paginate.
//!
//! The engine operates entirely through the [`ContentStore`] trait. The
//! HTTP handler and the `casework search` command both delegate here.
//!
//! # Pipeline
//!
//! 1. Fetch every published case study from the store.
//! 2. Apply the present filters (AND): `industry` and `clientSize` are
//!    case-insensitive equality, `useCase` is case-insensitive substring.
//! 3. If the trimmed query has fewer than 2 characters, return the first
//!    `limit` filtered studies with score `1.0` and no match markers.
//!    `total` is the filtered count.
//! 4. Otherwise score each study with the weighted fuzzy matcher
//!    (title 0.4, excerpt 0.3, industry 0.1, useCase 0.1, tags 0.1),
//!    sort ascending by score, and keep the first `limit`. `total` is
//!    the number of ranked matches before truncation.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fuzzy::{FuzzyOptions, WeightedMatcher};
use crate::models::{eq_ignore_case, CaseStudy};
use crate::store::ContentStore;

/// Page size used when `limit` is missing or unparsable.
pub const DEFAULT_LIMIT: usize = 10;

/// Shortest trimmed query that activates ranking.
pub const MIN_QUERY_CHARS: usize = 2;

/// Placeholder score for unranked results.
pub const UNRANKED_SCORE: f64 = 1.0;

/// Case-study fields the matcher looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Excerpt,
    Industry,
    UseCase,
    Tags,
}

/// Relative field weights.
pub const FIELD_WEIGHTS: [(SearchField, f64); 5] = [
    (SearchField::Title, 0.4),
    (SearchField::Excerpt, 0.3),
    (SearchField::Industry, 0.1),
    (SearchField::UseCase, 0.1),
    (SearchField::Tags, 0.1),
];

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub fuzzy: FuzzyOptions,
    pub default_limit: usize,
    /// Optional clamp on `limit`. `None` leaves page size unbounded.
    pub max_limit: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            fuzzy: FuzzyOptions::default(),
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

impl SearchParams {
    /// Turn a raw `limit` parameter into an effective page size.
    ///
    /// Missing, unparsable, zero, or negative values fall back to
    /// `default_limit`; the result is then clamped to `max_limit` if set.
    pub fn resolve_limit(&self, raw: Option<&str>) -> usize {
        let limit = raw
            .and_then(leading_integer)
            .filter(|&n| n > 0)
            .unwrap_or(self.default_limit);
        match self.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        }
    }
}

/// Read the leading run of ASCII digits, the way a browser's `parseInt`
/// would: `"5.5"` is 5 and `"25abc"` is 25. A sign or any other leading
/// character yields `None`.
pub fn leading_integer(raw: &str) -> Option<usize> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Optional structured predicates applied before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub industry: Option<String>,
    pub client_size: Option<String>,
    pub use_case: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FilterCriteria {
    pub fn new(
        industry: Option<String>,
        client_size: Option<String>,
        use_case: Option<String>,
    ) -> Self {
        Self {
            industry: non_blank(industry),
            client_size: non_blank(client_size),
            use_case: non_blank(use_case),
        }
    }

    /// True if `study` satisfies every present predicate.
    pub fn matches(&self, study: &CaseStudy) -> bool {
        if let Some(industry) = &self.industry {
            if !eq_ignore_case(&study.industry, industry) {
                return false;
            }
        }
        if let Some(size) = &self.client_size {
            if !eq_ignore_case(&study.client.size, size) {
                return false;
            }
        }
        if let Some(use_case) = &self.use_case {
            if !study
                .use_case
                .to_lowercase()
                .contains(&use_case.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Which fields contributed to a hit. Always serializes all five keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedFields {
    pub title: bool,
    pub excerpt: bool,
    pub content: bool,
    pub tags: bool,
    pub industry: bool,
}

impl MatchedFields {
    fn from_hits(hits: &[SearchField]) -> Self {
        let mut m = MatchedFields::default();
        for hit in hits {
            match hit {
                SearchField::Title => m.title = true,
                SearchField::Excerpt => m.excerpt = true,
                SearchField::Industry => m.industry = true,
                SearchField::Tags => m.tags = true,
                // useCase has no marker of its own.
                SearchField::UseCase => {}
            }
        }
        m
    }

    pub fn any(&self) -> bool {
        self.title || self.excerpt || self.content || self.tags || self.industry
    }
}

/// One annotated result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub study: CaseStudy,
    /// Relevance in `(0, 1]`; lower is better.
    pub score: f64,
    pub matches: MatchedFields,
}

/// A single case-study search invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseStudyQuery {
    /// Trimmed query text, empty if none was given.
    pub query: String,
    pub limit: usize,
    pub filters: FilterCriteria,
}

impl CaseStudyQuery {
    pub fn new(query: Option<&str>, limit: usize, filters: FilterCriteria) -> Self {
        Self {
            query: query.map(str::trim).unwrap_or_default().to_string(),
            limit,
            filters,
        }
    }

    /// The pattern to rank by, if the query is long enough.
    pub fn ranking_pattern(&self) -> Option<&str> {
        if self.query.chars().count() >= MIN_QUERY_CHARS {
            Some(&self.query)
        } else {
            None
        }
    }
}

/// Response body for the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub query: String,
    pub filters: FilterCriteria,
}

fn study_fields(study: &CaseStudy) -> impl Iterator<Item = (SearchField, &str)> {
    [
        (SearchField::Title, study.title.as_str()),
        (SearchField::Excerpt, study.excerpt.as_str()),
        (SearchField::Industry, study.industry.as_str()),
        (SearchField::UseCase, study.use_case.as_str()),
    ]
    .into_iter()
    .chain(study.tags.iter().map(|t| (SearchField::Tags, t.as_str())))
}

/// Run the filter/rank/paginate pipeline over an already-fetched record set.
pub fn rank_case_studies(
    studies: Vec<CaseStudy>,
    query: &CaseStudyQuery,
    fuzzy: &FuzzyOptions,
) -> SearchResponse {
    let filtered: Vec<CaseStudy> = studies
        .into_iter()
        .filter(|s| query.filters.matches(s))
        .collect();

    let (results, total) = match query.ranking_pattern() {
        None => {
            let total = filtered.len();
            let results = filtered
                .into_iter()
                .take(query.limit)
                .map(|study| SearchHit {
                    study,
                    score: UNRANKED_SCORE,
                    matches: MatchedFields::default(),
                })
                .collect();
            (results, total)
        }
        Some(pattern) => {
            let matcher = WeightedMatcher::new(&FIELD_WEIGHTS, *fuzzy);
            let mut ranked: Vec<SearchHit> = filtered
                .into_iter()
                .filter_map(|study| {
                    let m = matcher.score_record(pattern, study_fields(&study))?;
                    Some(SearchHit {
                        matches: MatchedFields::from_hits(&m.hits),
                        score: m.score,
                        study,
                    })
                })
                .collect();
            // Stable: equal scores keep store order.
            ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
            let total = ranked.len();
            ranked.truncate(query.limit);
            (ranked, total)
        }
    };

    SearchResponse {
        results,
        total,
        query: query.query.clone(),
        filters: query.filters.clone(),
    }
}

/// Fetch published case studies from `store` and run the query pipeline.
///
/// Store errors propagate unchanged; no partial results are produced.
pub async fn search_case_studies<S: ContentStore + ?Sized>(
    store: &S,
    query: &CaseStudyQuery,
    params: &SearchParams,
) -> Result<SearchResponse> {
    let studies = store.published_case_studies().await?;
    let response = rank_case_studies(studies, query, &params.fuzzy);
    tracing::debug!(
        query = %response.query,
        total = response.total,
        returned = response.results.len(),
        "case study search"
    );
    Ok(response)
}
