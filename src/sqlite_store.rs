//! SQLite-backed [`ContentStore`] implementation.
//!
//! Maps each [`ContentStore`] operation onto the `case_studies`,
//! `blog_posts`, and `job_postings` tables created by
//! [`migrate`](crate::migrate). Timestamps are stored as unix seconds and
//! list columns (`tags`, `requirements`) as JSON text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use casework_core::models::{BlogPost, CaseStudy, Client, JobPosting};
use casework_core::store::{ContentStore, JobFilter, UpsertOutcome};

/// SQLite implementation of the [`ContentStore`] trait.
///
/// Wraps a [`SqlitePool`]; the pool is created by the caller and shared by
/// every request.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn ts(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).with_context(|| format!("timestamp out of range: {}", secs))
}

fn opt_ts(secs: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    secs.map(ts).transpose()
}

fn string_list(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).with_context(|| format!("malformed list column: {}", json))
}

const CASE_STUDY_COLUMNS: &str = "id, slug, title, excerpt, content, industry, use_case, \
    client_name, client_size, client_logo_url, tags_json, status, featured, \
    published_at, created_at, updated_at";

const BLOG_POST_COLUMNS: &str = "id, slug, title, excerpt, content, author, category, \
    tags_json, status, featured, published_at, created_at, updated_at";

const JOB_COLUMNS: &str = "id, title, department, location, employment_type, description, \
    requirements_json, salary_range, status, created_at, updated_at";

fn row_to_case_study(row: &SqliteRow) -> Result<CaseStudy> {
    let status: String = row.get("status");
    let tags_json: String = row.get("tags_json");
    Ok(CaseStudy {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        industry: row.get("industry"),
        use_case: row.get("use_case"),
        client: Client {
            name: row.get("client_name"),
            size: row.get("client_size"),
            logo_url: row.get("client_logo_url"),
        },
        tags: string_list(&tags_json)?,
        status: status.parse()?,
        featured: row.get("featured"),
        published_at: opt_ts(row.get("published_at"))?,
        created_at: ts(row.get("created_at"))?,
        updated_at: ts(row.get("updated_at"))?,
    })
}

fn row_to_blog_post(row: &SqliteRow) -> Result<BlogPost> {
    let status: String = row.get("status");
    let tags_json: String = row.get("tags_json");
    Ok(BlogPost {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        author: row.get("author"),
        category: row.get("category"),
        tags: string_list(&tags_json)?,
        status: status.parse()?,
        featured: row.get("featured"),
        published_at: opt_ts(row.get("published_at"))?,
        created_at: ts(row.get("created_at"))?,
        updated_at: ts(row.get("updated_at"))?,
    })
}

fn row_to_job(row: &SqliteRow) -> Result<JobPosting> {
    let employment_type: String = row.get("employment_type");
    let status: String = row.get("status");
    let requirements_json: String = row.get("requirements_json");
    Ok(JobPosting {
        id: row.get("id"),
        title: row.get("title"),
        department: row.get("department"),
        location: row.get("location"),
        employment_type: employment_type.parse()?,
        description: row.get("description"),
        requirements: string_list(&requirements_json)?,
        salary_range: row.get("salary_range"),
        status: status.parse()?,
        created_at: ts(row.get("created_at"))?,
        updated_at: ts(row.get("updated_at"))?,
    })
}

/// Stored source hash for a slug. The outer `Option` is row existence.
async fn stored_hash(pool: &SqlitePool, table: &str, slug: &str) -> Result<Option<Option<String>>> {
    let row = sqlx::query(&format!("SELECT source_hash FROM {} WHERE slug = ?", table))
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.get("source_hash")))
}

fn unchanged(stored: &Option<String>, incoming: Option<&str>) -> bool {
    incoming.is_some() && stored.as_deref() == incoming
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn published_case_studies(&self) -> Result<Vec<CaseStudy>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM case_studies WHERE status = 'published' \
             ORDER BY published_at DESC, created_at DESC, slug ASC",
            CASE_STUDY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_case_study).collect()
    }

    async fn published_case_study(&self, slug: &str) -> Result<Option<CaseStudy>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM case_studies WHERE slug = ? AND status = 'published'",
            CASE_STUDY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_case_study).transpose()
    }

    async fn upsert_case_study(
        &self,
        study: &CaseStudy,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome> {
        let tags_json = serde_json::to_string(&study.tags)?;
        let published_at = study.published_at.map(|t| t.timestamp());

        match stored_hash(&self.pool, "case_studies", &study.slug).await? {
            Some(stored) if unchanged(&stored, source_hash) => {
                Ok(UpsertOutcome::Unchanged)
            }
            Some(_) => {
                sqlx::query(
                    r#"
                    UPDATE case_studies SET
                        title = ?, excerpt = ?, content = ?, industry = ?, use_case = ?,
                        client_name = ?, client_size = ?, client_logo_url = ?, tags_json = ?,
                        status = ?, featured = ?, published_at = ?, updated_at = ?,
                        source_hash = ?
                    WHERE slug = ?
                    "#,
                )
                .bind(&study.title)
                .bind(&study.excerpt)
                .bind(&study.content)
                .bind(&study.industry)
                .bind(&study.use_case)
                .bind(&study.client.name)
                .bind(&study.client.size)
                .bind(&study.client.logo_url)
                .bind(&tags_json)
                .bind(study.status.as_str())
                .bind(study.featured)
                .bind(published_at)
                .bind(study.updated_at.timestamp())
                .bind(source_hash)
                .bind(&study.slug)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                sqlx::query(&format!(
                    "INSERT INTO case_studies ({}, source_hash) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    CASE_STUDY_COLUMNS
                ))
                .bind(&study.id)
                .bind(&study.slug)
                .bind(&study.title)
                .bind(&study.excerpt)
                .bind(&study.content)
                .bind(&study.industry)
                .bind(&study.use_case)
                .bind(&study.client.name)
                .bind(&study.client.size)
                .bind(&study.client.logo_url)
                .bind(&tags_json)
                .bind(study.status.as_str())
                .bind(study.featured)
                .bind(published_at)
                .bind(study.created_at.timestamp())
                .bind(study.updated_at.timestamp())
                .bind(source_hash)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn published_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM blog_posts WHERE status = 'published' \
             ORDER BY published_at DESC, created_at DESC, slug ASC",
            BLOG_POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_blog_post).collect()
    }

    async fn published_blog_post(&self, slug: &str) -> Result<Option<BlogPost>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM blog_posts WHERE slug = ? AND status = 'published'",
            BLOG_POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_blog_post).transpose()
    }

    async fn upsert_blog_post(
        &self,
        post: &BlogPost,
        source_hash: Option<&str>,
    ) -> Result<UpsertOutcome> {
        let tags_json = serde_json::to_string(&post.tags)?;
        let published_at = post.published_at.map(|t| t.timestamp());

        match stored_hash(&self.pool, "blog_posts", &post.slug).await? {
            Some(stored) if unchanged(&stored, source_hash) => {
                Ok(UpsertOutcome::Unchanged)
            }
            Some(_) => {
                sqlx::query(
                    r#"
                    UPDATE blog_posts SET
                        title = ?, excerpt = ?, content = ?, author = ?, category = ?,
                        tags_json = ?, status = ?, featured = ?, published_at = ?,
                        updated_at = ?, source_hash = ?
                    WHERE slug = ?
                    "#,
                )
                .bind(&post.title)
                .bind(&post.excerpt)
                .bind(&post.content)
                .bind(&post.author)
                .bind(&post.category)
                .bind(&tags_json)
                .bind(post.status.as_str())
                .bind(post.featured)
                .bind(published_at)
                .bind(post.updated_at.timestamp())
                .bind(source_hash)
                .bind(&post.slug)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                sqlx::query(&format!(
                    "INSERT INTO blog_posts ({}, source_hash) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    BLOG_POST_COLUMNS
                ))
                .bind(&post.id)
                .bind(&post.slug)
                .bind(&post.title)
                .bind(&post.excerpt)
                .bind(&post.content)
                .bind(&post.author)
                .bind(&post.category)
                .bind(&tags_json)
                .bind(post.status.as_str())
                .bind(post.featured)
                .bind(published_at)
                .bind(post.created_at.timestamp())
                .bind(post.updated_at.timestamp())
                .bind(source_hash)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM job_postings \
             WHERE (? IS NULL OR status = ?) \
             ORDER BY created_at DESC, id ASC",
            JOB_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        // SQLite LOWER() only folds ASCII, so department matching happens here.
        let mut jobs = Vec::with_capacity(rows.len());
        for row in &rows {
            let job = row_to_job(row)?;
            if filter.matches(&job) {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobPosting>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM job_postings WHERE id = ?",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO job_postings ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            JOB_COLUMNS
        ))
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.location)
        .bind(job.employment_type.as_str())
        .bind(&job.description)
        .bind(serde_json::to_string(&job.requirements)?)
        .bind(&job.salary_range)
        .bind(job.status.as_str())
        .bind(job.created_at.timestamp())
        .bind(job.updated_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_job(&self, job: &JobPosting) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings SET
                title = ?, department = ?, location = ?, employment_type = ?,
                description = ?, requirements_json = ?, salary_range = ?, status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.location)
        .bind(job.employment_type.as_str())
        .bind(&job.description)
        .bind(serde_json::to_string(&job.requirements)?)
        .bind(&job.salary_range)
        .bind(job.status.as_str())
        .bind(job.updated_at.timestamp())
        .bind(&job.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_job(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_postings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
