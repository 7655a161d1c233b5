//! JSON HTTP API for the website front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/case-studies` | Published case studies, newest first |
//! | `GET`  | `/api/case-studies/search` | Filtered, fuzzy-ranked case-study search |
//! | `GET`  | `/api/case-studies/{slug}` | One published case study |
//! | `GET`  | `/api/blog` | Paged published blog posts |
//! | `GET`  | `/api/blog/{slug}` | One published blog post |
//! | `GET`  | `/api/jobs` | Job postings |
//! | `POST` | `/api/jobs` | Create a job posting |
//! | `GET`  | `/api/jobs/{id}` | One job posting |
//! | `PUT`  | `/api/jobs/{id}` | Replace a job posting |
//! | `DELETE` | `/api/jobs/{id}` | Delete a job posting |
//!
//! # Error Contract
//!
//! Every error response is `{ "error": "<message>" }`. Store failures are
//! logged and reported as a generic 500 without internal detail. Listing
//! and search parameters are never rejected: bad numbers fall back to
//! defaults.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the static front end
//! can be served from a different host.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use casework_core::jobs::JobInput;
use casework_core::listing::{
    list_blog_posts, list_case_studies, BlogListParams, BlogPage, CaseStudyList,
    CaseStudyListParams,
};
use casework_core::models::{BlogPost, CaseStudy, JobPosting, JobStatus};
use casework_core::query::{
    leading_integer, search_case_studies, CaseStudyQuery, FilterCriteria, SearchParams,
    SearchResponse,
};
use casework_core::store::{ContentStore, JobFilter};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Content backend, constructed once at startup.
    pub store: Arc<dyn ContentStore>,
    pub params: SearchParams,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, params: SearchParams) -> Self {
        Self { store, params }
    }
}

/// Build the router. Split out from [`run_server`] so tests can serve it
/// over any store.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/case-studies", get(handle_list_case_studies))
        .route("/api/case-studies/search", get(handle_search_case_studies))
        .route("/api/case-studies/{slug}", get(handle_get_case_study))
        .route("/api/blog", get(handle_list_blog))
        .route("/api/blog/{slug}", get(handle_get_blog_post))
        .route("/api/jobs", get(handle_list_jobs).post(handle_create_job))
        .route(
            "/api/jobs/{id}",
            get(handle_get_job)
                .put(handle_update_job)
                .delete(handle_delete_job),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the SQLite pool, makes sure the schema exists, binds to
/// `[server].bind`, and serves until Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;

    let state = AppState::new(
        Arc::new(SqliteStore::new(pool)),
        config.search.params(),
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "listening");
    println!("Casework server listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
    }
}

/// Log the underlying failure, hand the client a generic message.
fn internal(public_message: &str, err: anyhow::Error) -> AppError {
    tracing::error!(error = %format!("{:#}", err), "{}", public_message);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: public_message.to_string(),
    }
}

fn parse_usize(raw: Option<&str>) -> Option<usize> {
    raw.and_then(leading_integer)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Query-string pairs in arrival order.
///
/// Extraction never fails: repeated keys are allowed and the first
/// occurrence wins, so `?q=a&q=b` searches for `a`.
#[derive(Debug, Default)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn first(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryPairs {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<Vec<(String, String)>>::from_request_parts(parts, state).await {
            Ok(Query(pairs)) => Ok(Self(pairs)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "ignoring unreadable query string");
                Ok(Self::default())
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/case-studies/search ============

/// Raw search parameters. Everything is a string so that malformed values
/// fall back to defaults instead of failing the request.
#[derive(Debug, Default)]
pub struct SearchQueryParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub industry: Option<String>,
    pub client_size: Option<String>,
    pub use_case: Option<String>,
}

impl SearchQueryParams {
    pub fn from_pairs(pairs: &QueryPairs) -> Self {
        Self {
            q: pairs.first("q"),
            limit: pairs.first("limit"),
            industry: pairs.first("industry"),
            client_size: pairs.first("clientSize"),
            use_case: pairs.first("useCase"),
        }
    }

    pub fn into_query(self, params: &SearchParams) -> CaseStudyQuery {
        let limit = params.resolve_limit(self.limit.as_deref());
        CaseStudyQuery::new(
            self.q.as_deref(),
            limit,
            FilterCriteria::new(self.industry, self.client_size, self.use_case),
        )
    }
}

async fn handle_search_case_studies(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Result<Json<SearchResponse>, AppError> {
    let query = SearchQueryParams::from_pairs(&pairs).into_query(&state.params);
    let response = search_case_studies(state.store.as_ref(), &query, &state.params)
        .await
        .map_err(|e| internal("Failed to search case studies", e))?;
    Ok(Json(response))
}

// ============ GET /api/case-studies ============

async fn handle_list_case_studies(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Result<Json<CaseStudyList>, AppError> {
    let params = CaseStudyListParams {
        industry: non_blank(pairs.first("industry")),
        featured_only: pairs
            .first("featured")
            .is_some_and(|f| f.trim().eq_ignore_ascii_case("true")),
        limit: state.params.resolve_limit(pairs.first("limit").as_deref()),
        offset: parse_usize(pairs.first("offset").as_deref()).unwrap_or(0),
    };
    let list = list_case_studies(state.store.as_ref(), &params)
        .await
        .map_err(|e| internal("Failed to fetch case studies", e))?;
    Ok(Json(list))
}

// ============ GET /api/case-studies/{slug} ============

async fn handle_get_case_study(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CaseStudy>, AppError> {
    state
        .store
        .published_case_study(&slug)
        .await
        .map_err(|e| internal("Failed to fetch case study", e))?
        .map(Json)
        .ok_or_else(|| not_found(format!("case study not found: {}", slug)))
}

// ============ GET /api/blog ============

async fn handle_list_blog(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Result<Json<BlogPage>, AppError> {
    let params = BlogListParams {
        category: non_blank(pairs.first("category")),
        tag: non_blank(pairs.first("tag")),
        page: parse_usize(pairs.first("page").as_deref())
            .filter(|&p| p > 0)
            .unwrap_or(1),
        limit: state.params.resolve_limit(pairs.first("limit").as_deref()),
    };
    let page = list_blog_posts(state.store.as_ref(), &params)
        .await
        .map_err(|e| internal("Failed to fetch blog posts", e))?;
    Ok(Json(page))
}

// ============ GET /api/blog/{slug} ============

async fn handle_get_blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    state
        .store
        .published_blog_post(&slug)
        .await
        .map_err(|e| internal("Failed to fetch blog post", e))?
        .map(Json)
        .ok_or_else(|| not_found(format!("blog post not found: {}", slug)))
}

// ============ /api/jobs ============

#[derive(Serialize)]
struct JobListResponse {
    jobs: Vec<JobPosting>,
    total: usize,
}

async fn handle_list_jobs(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> Result<Json<JobListResponse>, AppError> {
    let status = match pairs.first("status").as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<JobStatus>()
                .map_err(|e| bad_request(e.to_string()))?,
        ),
    };
    let filter = JobFilter {
        status,
        department: non_blank(pairs.first("department")),
    };
    let jobs = state
        .store
        .list_jobs(&filter)
        .await
        .map_err(|e| internal("Failed to fetch job postings", e))?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}

fn job_body(body: Result<Json<JobInput>, JsonRejection>) -> Result<JobInput, AppError> {
    body.map(|Json(input)| input)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

async fn handle_create_job(
    State(state): State<AppState>,
    body: Result<Json<JobInput>, JsonRejection>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let job = job_body(body)?
        .into_new_posting(Utc::now())
        .map_err(|e| bad_request(e.to_string()))?;
    state
        .store
        .insert_job(&job)
        .await
        .map_err(|e| internal("Failed to create job posting", e))?;
    tracing::info!(id = %job.id, title = %job.title, "job posting created");
    Ok((StatusCode::CREATED, Json(job)))
}

async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPosting>, AppError> {
    state
        .store
        .get_job(&id)
        .await
        .map_err(|e| internal("Failed to fetch job posting", e))?
        .map(Json)
        .ok_or_else(|| not_found(format!("job posting not found: {}", id)))
}

async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JobInput>, JsonRejection>,
) -> Result<Json<JobPosting>, AppError> {
    let input = job_body(body)?;
    let existing = state
        .store
        .get_job(&id)
        .await
        .map_err(|e| internal("Failed to update job posting", e))?
        .ok_or_else(|| not_found(format!("job posting not found: {}", id)))?;
    let job = input
        .into_replacement(&existing, Utc::now())
        .map_err(|e| bad_request(e.to_string()))?;
    let updated = state
        .store
        .update_job(&job)
        .await
        .map_err(|e| internal("Failed to update job posting", e))?;
    if !updated {
        return Err(not_found(format!("job posting not found: {}", id)));
    }
    Ok(Json(job))
}

async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .store
        .delete_job(&id)
        .await
        .map_err(|e| internal("Failed to delete job posting", e))?;
    if deleted {
        tracing::info!(id = %id, "job posting deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(format!("job posting not found: {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use casework_core::models::{Client, ContentStatus};
    use casework_core::store::memory::InMemoryStore;
    use casework_core::store::UpsertOutcome;
    use chrono::TimeZone;

    fn study(slug: &str, title: &str, industry: &str) -> CaseStudy {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        CaseStudy {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            title: title.to_string(),
            excerpt: "An engagement summary.".to_string(),
            content: String::new(),
            industry: industry.to_string(),
            use_case: "Automation".to_string(),
            client: Client {
                name: "Client".to_string(),
                size: "Enterprise".to_string(),
                logo_url: None,
            },
            tags: Vec::new(),
            status: ContentStatus::Published,
            featured: false,
            published_at: Some(t),
            created_at: t,
            updated_at: t,
        }
    }

    async fn spawn(store: Arc<dyn ContentStore>) -> String {
        let app = router(AppState::new(store, SearchParams::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn seeded() -> String {
        let store = InMemoryStore::new();
        for (slug, title, industry) in [
            ("cloud", "Cloud Migration Success", "Technology"),
            ("triage", "Patient Triage Assistant", "Healthcare"),
            ("imaging", "Radiology Imaging Pipeline", "Healthcare"),
            ("fraud", "Real-Time Fraud Detection", "Finance"),
            ("forecast", "Demand Forecasting Engine", "Retail"),
        ] {
            store
                .upsert_case_study(&study(slug, title, industry), None)
                .await
                .unwrap();
        }
        spawn(Arc::new(store)).await
    }

    #[tokio::test]
    async fn test_search_without_query_returns_everything() {
        let base = seeded().await;
        let body: serde_json::Value = reqwest::get(format!(
            "{}/api/case-studies/search?limit=10",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body["total"], 5);
        assert_eq!(body["query"], "");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r["score"] == 1.0));
        assert!(results.iter().all(|r| r["matches"]["title"] == false));
    }

    #[tokio::test]
    async fn test_search_industry_filter() {
        let base = seeded().await;
        let body: serde_json::Value = reqwest::get(format!(
            "{}/api/case-studies/search?industry=healthcare",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body["total"], 2);
        assert_eq!(body["filters"]["industry"], "healthcare");
        for r in body["results"].as_array().unwrap() {
            assert_eq!(r["study"]["industry"], "Healthcare");
        }
    }

    #[tokio::test]
    async fn test_search_near_match() {
        let base = seeded().await;
        let body: serde_json::Value = reqwest::get(format!(
            "{}/api/case-studies/search?q=clou",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        let first = &body["results"][0];
        assert_eq!(first["study"]["slug"], "cloud");
        assert_eq!(first["matches"]["title"], true);
        let score = first["score"].as_f64().unwrap();
        assert!(score > 0.0 && score < 0.4);
    }

    #[tokio::test]
    async fn test_search_no_match_is_200() {
        let base = seeded().await;
        let resp = reqwest::get(format!("{}/api/case-studies/search?q=zzzznotfound", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["total"], 0);
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_bad_limit_falls_back() {
        let base = seeded().await;
        let body: serde_json::Value = reqwest::get(format!(
            "{}/api/case-studies/search?limit=lots",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body["results"].as_array().unwrap().len(), 5);
    }

    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn published_case_studies(&self) -> anyhow::Result<Vec<CaseStudy>> {
            anyhow::bail!("disk on fire")
        }
        async fn published_case_study(&self, _: &str) -> anyhow::Result<Option<CaseStudy>> {
            anyhow::bail!("disk on fire")
        }
        async fn upsert_case_study(
            &self,
            _: &CaseStudy,
            _: Option<&str>,
        ) -> anyhow::Result<UpsertOutcome> {
            anyhow::bail!("disk on fire")
        }
        async fn published_blog_posts(&self) -> anyhow::Result<Vec<BlogPost>> {
            anyhow::bail!("disk on fire")
        }
        async fn published_blog_post(&self, _: &str) -> anyhow::Result<Option<BlogPost>> {
            anyhow::bail!("disk on fire")
        }
        async fn upsert_blog_post(
            &self,
            _: &BlogPost,
            _: Option<&str>,
        ) -> anyhow::Result<UpsertOutcome> {
            anyhow::bail!("disk on fire")
        }
        async fn list_jobs(&self, _: &JobFilter) -> anyhow::Result<Vec<JobPosting>> {
            anyhow::bail!("disk on fire")
        }
        async fn get_job(&self, _: &str) -> anyhow::Result<Option<JobPosting>> {
            anyhow::bail!("disk on fire")
        }
        async fn insert_job(&self, _: &JobPosting) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
        async fn update_job(&self, _: &JobPosting) -> anyhow::Result<bool> {
            anyhow::bail!("disk on fire")
        }
        async fn delete_job(&self, _: &str) -> anyhow::Result<bool> {
            anyhow::bail!("disk on fire")
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let base = spawn(Arc::new(FailingStore)).await;
        let resp = reqwest::get(format!("{}/api/case-studies/search?q=cloud", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Failed to search case studies");
        assert!(body.get("results").is_none());
    }

    #[tokio::test]
    async fn test_case_study_detail_and_404() {
        let base = seeded().await;
        let ok = reqwest::get(format!("{}/api/case-studies/fraud", base))
            .await
            .unwrap();
        assert_eq!(ok.status(), 200);
        let body: serde_json::Value = ok.json().await.unwrap();
        assert_eq!(body["title"], "Real-Time Fraud Detection");

        let missing = reqwest::get(format!("{}/api/case-studies/nope", base))
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);
        let body: serde_json::Value = missing.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let base = spawn(Arc::new(InMemoryStore::new())).await;
        let client = reqwest::Client::new();

        let bad = client
            .post(format!("{}/api/jobs", base))
            .json(&serde_json::json!({ "title": " ", "employmentType": "full-time" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad.status(), 400);

        let created = client
            .post(format!("{}/api/jobs", base))
            .json(&serde_json::json!({
                "title": "ML Engineer",
                "department": "Engineering",
                "location": "Remote",
                "employmentType": "full-time",
                "description": "Ship models.",
                "requirements": ["Rust", "Python"],
                "status": "open"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), 201);
        let job: serde_json::Value = created.json().await.unwrap();
        let id = job["id"].as_str().unwrap().to_string();
        assert_eq!(job["employmentType"], "full-time");

        let listed: serde_json::Value = client
            .get(format!("{}/api/jobs?status=open", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed["total"], 1);

        let updated = client
            .put(format!("{}/api/jobs/{}", base, id))
            .json(&serde_json::json!({
                "title": "Senior ML Engineer",
                "department": "Engineering",
                "location": "Remote",
                "employmentType": "full-time",
                "description": "Ship models.",
                "status": "closed"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(updated.status(), 200);
        let job: serde_json::Value = updated.json().await.unwrap();
        assert_eq!(job["title"], "Senior ML Engineer");
        assert_eq!(job["id"], id.as_str());

        let deleted = client
            .delete(format!("{}/api/jobs/{}", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(deleted.status(), 204);

        let gone = client
            .get(format!("{}/api/jobs/{}", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(gone.status(), 404);
    }

    #[tokio::test]
    async fn test_job_malformed_json_is_400() {
        let base = spawn(Arc::new(InMemoryStore::new())).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/api/jobs", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_job_status_filter_is_400() {
        let base = spawn(Arc::new(InMemoryStore::new())).await;
        let resp = reqwest::get(format!("{}/api/jobs?status=paused", base))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_repeated_query_keys_use_first_value() {
        let base = seeded().await;
        let resp = reqwest::get(format!(
            "{}/api/case-studies/search?q=cloud&q=data&industry=Technology&industry=Finance",
            base
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["query"], "cloud");
        assert_eq!(body["filters"]["industry"], "Technology");
        assert_eq!(body["results"][0]["study"]["slug"], "cloud");

        for path in [
            "/api/case-studies?limit=1&limit=2",
            "/api/blog?page=1&page=2",
            "/api/jobs?department=a&department=b",
        ] {
            let resp = reqwest::get(format!("{}{}", base, path)).await.unwrap();
            assert_eq!(resp.status(), 200, "{}", path);
        }
    }

    #[tokio::test]
    async fn test_fractional_limit_takes_integer_part() {
        let base = seeded().await;
        let body: serde_json::Value = reqwest::get(format!(
            "{}/api/case-studies/search?limit=2.5",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["total"], 5);
    }

    #[test]
    fn test_query_pairs_first_wins() {
        let pairs = QueryPairs(vec![
            ("q".to_string(), "cloud".to_string()),
            ("q".to_string(), "data".to_string()),
            ("clientSize".to_string(), "Startup".to_string()),
        ]);
        let params = SearchQueryParams::from_pairs(&pairs);
        assert_eq!(params.q.as_deref(), Some("cloud"));
        assert_eq!(params.client_size.as_deref(), Some("Startup"));
        assert!(params.use_case.is_none());
    }

    #[test]
    fn test_search_params_conversion() {
        let raw = SearchQueryParams {
            q: Some("  cloud ".to_string()),
            limit: Some("3".to_string()),
            industry: Some(" ".to_string()),
            client_size: Some("Enterprise".to_string()),
            use_case: None,
        };
        let q = raw.into_query(&SearchParams::default());
        assert_eq!(q.query, "cloud");
        assert_eq!(q.limit, 3);
        assert!(q.filters.industry.is_none());
        assert_eq!(q.filters.client_size.as_deref(), Some("Enterprise"));
    }
}
