use anyhow::Result;

use casework_core::query::{
    search_case_studies, CaseStudyQuery, FilterCriteria, SearchHit, SearchResponse,
};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Options for `casework search`, mirroring the HTTP query string.
#[derive(Debug, Default, Clone)]
pub struct SearchArgs {
    pub query: Option<String>,
    pub industry: Option<String>,
    pub client_size: Option<String>,
    pub use_case: Option<String>,
    /// Raw limit text; resolved with the same fallback rules as the API.
    pub limit: Option<String>,
    pub json: bool,
}

pub async fn run_search(config: &Config, args: SearchArgs) -> Result<()> {
    let params = config.search.params();
    let query = CaseStudyQuery::new(
        args.query.as_deref(),
        params.resolve_limit(args.limit.as_deref()),
        FilterCriteria::new(args.industry, args.client_size, args.use_case),
    );

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let response = search_case_studies(&store, &query, &params).await;
    pool.close().await;
    let response = response?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_results(&response);
    }
    Ok(())
}

fn print_results(response: &SearchResponse) {
    if response.results.is_empty() {
        println!("No results.");
        return;
    }

    for (i, hit) in response.results.iter().enumerate() {
        let study = &hit.study;
        let date = study
            .published_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        println!("{}. [{:.3}] {}", i + 1, hit.score, study.title);
        println!("    slug: {}", study.slug);
        println!(
            "    client: {} ({}) / {} / {}",
            study.client.name, study.client.size, study.industry, study.use_case
        );
        if !date.is_empty() {
            println!("    published: {}", date);
        }
        let matched = matched_labels(hit);
        if !matched.is_empty() {
            println!("    matched: {}", matched.join(", "));
        }
        println!("    excerpt: \"{}\"", study.excerpt.replace('\n', " ").trim());
        println!();
    }
    println!(
        "{} of {} matching case studies shown.",
        response.results.len(),
        response.total
    );
}

fn matched_labels(hit: &SearchHit) -> Vec<&'static str> {
    let m = &hit.matches;
    [
        (m.title, "title"),
        (m.excerpt, "excerpt"),
        (m.content, "content"),
        (m.tags, "tags"),
        (m.industry, "industry"),
    ]
    .into_iter()
    .filter_map(|(hit, label)| hit.then_some(label))
    .collect()
}
