//! In-memory [`ContentStore`] implementation for testing.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread safety.
//! Ordering mirrors the SQLite backend.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{BlogPost, CaseStudy, ContentStatus, JobPosting};

use super::{ContentStore, JobFilter, UpsertOutcome};

struct Stored<T> {
    record: T,
    source_hash: Option<String>,
}

/// In-memory store for tests and fixtures.
pub struct InMemoryStore {
    case_studies: RwLock<HashMap<String, Stored<CaseStudy>>>,
    blog_posts: RwLock<HashMap<String, Stored<BlogPost>>>,
    jobs: RwLock<Vec<JobPosting>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            case_studies: RwLock::new(HashMap::new()),
            blog_posts: RwLock::new(HashMap::new()),
            jobs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(
    a: (Option<DateTime<Utc>>, DateTime<Utc>, &str),
    b: (Option<DateTime<Utc>>, DateTime<Utc>, &str),
) -> Ordering {
    // `None` sorts last, as NULL does under `ORDER BY ... DESC` in SQLite.
    b.0.cmp(&a.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| a.2.cmp(b.2))
}

/// Shared slug-keyed upsert used by case studies and blog posts.
fn upsert_by_slug<T: Clone>(
    map: &RwLock<HashMap<String, Stored<T>>>,
    slug: &str,
    record: &T,
    source_hash: Option<&str>,
    keep_identity: impl Fn(&mut T, &T),
) -> UpsertOutcome {
    let mut map = map.write().unwrap();
    match map.get_mut(slug) {
        Some(existing) => {
            if source_hash.is_some() && existing.source_hash.as_deref() == source_hash {
                return UpsertOutcome::Unchanged;
            }
            let mut next = record.clone();
            keep_identity(&mut next, &existing.record);
            existing.record = next;
            existing.source_hash = source_hash.map(str::to_string);
            UpsertOutcome::Updated
        }
        None => {
            map.insert(
                slug.to_string(),
                Stored {
                    record: record.clone(),
                    source_hash: source_hash.map(str::to_string),
                },
            );
            UpsertOutcome::Inserted
        }
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn published_case_studies(&self) -> Result<Vec<CaseStudy>> {
        let map = self.case_studies.read().unwrap();
        let mut out: Vec<CaseStudy> = map
            .values()
            .filter(|s| s.record.status == ContentStatus::Published)
            .map(|s| s.record.clone())
            .collect();
        out.sort_by(|a, b| {
            newest_first(
                (a.published_at, a.created_at, a.slug.as_str()),
                (b.published_at, b.created_at, b.slug.as_str()),
            )
        });
        Ok(out)
    }

    async fn published_case_study(&self, slug: &str) -> Result<Option<CaseStudy>> {
        let map = self.case_studies.read().unwrap();
        Ok(map
            .get(slug)
            .filter(|s| s.record.status == ContentStatus::Published)
            .map(|s| s.record.clone()))
    }

    async fn upsert_case_study(
        &self,
        study: &CaseStudy,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome> {
        Ok(upsert_by_slug(
            &self.case_studies,
            &study.slug,
            study,
            source_hash,
            |next, old| {
                next.id = old.id.clone();
                next.created_at = old.created_at;
            },
        ))
    }

    async fn published_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let map = self.blog_posts.read().unwrap();
        let mut out: Vec<BlogPost> = map
            .values()
            .filter(|p| p.record.status == ContentStatus::Published)
            .map(|p| p.record.clone())
            .collect();
        out.sort_by(|a, b| {
            newest_first(
                (a.published_at, a.created_at, a.slug.as_str()),
                (b.published_at, b.created_at, b.slug.as_str()),
            )
        });
        Ok(out)
    }

    async fn published_blog_post(&self, slug: &str) -> Result<Option<BlogPost>> {
        let map = self.blog_posts.read().unwrap();
        Ok(map
            .get(slug)
            .filter(|p| p.record.status == ContentStatus::Published)
            .map(|p| p.record.clone()))
    }

    async fn upsert_blog_post(
        &self,
        post: &BlogPost,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome> {
        Ok(upsert_by_slug(
            &self.blog_posts,
            &post.slug,
            post,
            source_hash,
            |next, old| {
                next.id = old.id.clone();
                next.created_at = old.created_at;
            },
        ))
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>> {
        let jobs = self.jobs.read().unwrap();
        let mut out: Vec<JobPosting> = jobs.iter().filter(|j| filter.matches(j)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobPosting>> {
        let jobs = self.jobs.read().unwrap();
        Ok(jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        let mut jobs = self.jobs.write().unwrap();
        if jobs.iter().any(|j| j.id == job.id) {
            anyhow::bail!("job posting already exists: {}", job.id);
        }
        jobs.push(job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &JobPosting) -> Result<bool> {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_job(&self, id: &str) -> Result<bool> {
        let mut jobs = self.jobs.write().unwrap();
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(jobs.len() != before)
    }
}
