//! Storage abstraction for Casework.
//!
//! The [`ContentStore`] trait defines every storage operation needed by the
//! query engine, the listing endpoints, the importer, and job management,
//! enabling pluggable backends (SQLite, in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! Published listings are returned newest first: `published_at` descending,
//! then `created_at` descending, then `slug` ascending. Every backend must
//! produce the same order so search output is reproducible.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{eq_ignore_case, BlogPost, CaseStudy, JobPosting, JobStatus};

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The stored source hash equals the incoming one; nothing was written.
    Unchanged,
}

/// Optional predicates for job listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    /// Case-insensitive exact department match.
    pub department: Option<String>,
}

impl JobFilter {
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(dept) = &self.department {
            if !eq_ignore_case(&job.department, dept) {
                return false;
            }
        }
        true
    }
}

/// Abstract content backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`published_case_studies`](ContentStore::published_case_studies) | Every published case study, no paging |
/// | [`published_case_study`](ContentStore::published_case_study) | One published case study by slug |
/// | [`upsert_case_study`](ContentStore::upsert_case_study) | Insert or update by slug |
/// | [`published_blog_posts`](ContentStore::published_blog_posts) | Every published post |
/// | [`published_blog_post`](ContentStore::published_blog_post) | One published post by slug |
/// | [`upsert_blog_post`](ContentStore::upsert_blog_post) | Insert or update by slug |
/// | [`list_jobs`](ContentStore::list_jobs) … [`delete_job`](ContentStore::delete_job) | Job posting CRUD |
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All case studies whose status is `published`.
    async fn published_case_studies(&self) -> Result<Vec<CaseStudy>>;

    async fn published_case_study(&self, slug: &str) -> Result<Option<CaseStudy>>;

    /// Insert or update a case study keyed by slug.
    ///
    /// An existing row keeps its `id` and `created_at`. When `source_hash`
    /// matches the stored hash, nothing is written and
    /// [`UpsertOutcome::Unchanged`] is returned.
    async fn upsert_case_study(
        &self,
        study: &CaseStudy,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome>;

    async fn published_blog_posts(&self) -> Result<Vec<BlogPost>>;

    async fn published_blog_post(&self, slug: &str) -> Result<Option<BlogPost>>;

    /// Same contract as [`upsert_case_study`](ContentStore::upsert_case_study).
    async fn upsert_blog_post(
        &self,
        post: &BlogPost,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome>;

    /// Job postings matching `filter`, newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>>;

    async fn get_job(&self, id: &str) -> Result<Option<JobPosting>>;

    async fn insert_job(&self, job: &JobPosting) -> Result<()>;

    /// Replace a posting. Returns `false` if no posting has `job.id`.
    async fn update_job(&self, job: &JobPosting) -> Result<bool>;

    /// Returns `false` if no posting has `id`.
    async fn delete_job(&self, id: &str) -> Result<bool>;
}
