//! Content import from a directory of markdown files.
//!
//! Walks `[content].root`, keeps files matching the include globs (minus the
//! exclude globs), and parses each one as a `+++`-delimited TOML front-matter
//! block followed by a markdown body:
//!
//! ```text
//! +++
//! title = "Cloud Migration Success"
//! industry = "Technology"
//! use_case = "Infrastructure Modernization"
//! tags = ["cloud", "mlops"]
//! published_at = 2024-03-01
//!
//! [client]
//! name = "Contoso"
//! size = "Enterprise"
//! +++
//! Markdown body...
//! ```
//!
//! The first path component decides the record type: `case-studies/` or
//! `blog/`. Records upsert by slug (front matter `slug`, else the file stem)
//! and carry a SHA-256 of the raw file, so re-importing an unchanged file is
//! a no-op.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

use casework_core::models::{BlogPost, CaseStudy, Client, ContentStatus};
use casework_core::store::{ContentStore, UpsertOutcome};

use crate::config::{Config, ContentConfig};
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Record type, decided by the top-level directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    CaseStudy,
    BlogPost,
}

impl ContentKind {
    fn from_relative_path(rel: &Path) -> Option<Self> {
        match rel.components().next()?.as_os_str().to_str()? {
            "case-studies" => Some(ContentKind::CaseStudy),
            "blog" => Some(ContentKind::BlogPost),
            _ => None,
        }
    }
}

/// A content file read from disk, not yet parsed.
#[derive(Debug, Clone)]
pub struct ContentFile {
    pub kind: ContentKind,
    pub relative_path: String,
    pub raw: String,
    pub modified_at: DateTime<Utc>,
}

impl ContentFile {
    fn stem(&self) -> String {
        Path::new(&self.relative_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn source_hash(&self) -> String {
        hex::encode(Sha256::digest(self.raw.as_bytes()))
    }
}

#[derive(Debug, Deserialize)]
struct ClientFrontMatter {
    name: String,
    size: String,
    #[serde(default)]
    logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaseStudyFrontMatter {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    excerpt: String,
    industry: String,
    use_case: String,
    client: ClientFrontMatter,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    published_at: Option<toml::value::Datetime>,
}

#[derive(Debug, Deserialize)]
struct BlogFrontMatter {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    excerpt: String,
    author: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    published_at: Option<toml::value::Datetime>,
}

/// Split `+++` front matter from the body.
pub fn split_front_matter(raw: &str) -> Result<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw
        .strip_prefix("+++\r\n")
        .or_else(|| raw.strip_prefix("+++\n"))
        .context("missing opening +++ front-matter delimiter")?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "+++" {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((front, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    bail!("missing closing +++ front-matter delimiter")
}

fn parse_datetime(value: &toml::value::Datetime) -> Result<DateTime<Utc>> {
    let s = value.to_string();
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .with_context(|| format!("unsupported published_at value: {}", s))?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default()))
}

fn parse_status(raw: Option<&str>) -> Result<ContentStatus> {
    match raw {
        // Files on disk are meant to go live unless marked otherwise.
        None => Ok(ContentStatus::Published),
        Some(s) => s.parse(),
    }
}

fn pick_slug(explicit: Option<String>, file: &ContentFile) -> Result<String> {
    let slug = explicit
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| file.stem());
    if slug.is_empty() {
        bail!("cannot derive slug for {}", file.relative_path);
    }
    Ok(slug)
}

pub fn parse_case_study(file: &ContentFile) -> Result<CaseStudy> {
    let (front, body) = split_front_matter(&file.raw)?;
    let fm: CaseStudyFrontMatter = toml::from_str(front)
        .with_context(|| format!("invalid front matter in {}", file.relative_path))?;
    let status = parse_status(fm.status.as_deref())?;
    let published_at = match &fm.published_at {
        Some(dt) => Some(parse_datetime(dt)?),
        None if status == ContentStatus::Published => Some(file.modified_at),
        None => None,
    };

    Ok(CaseStudy {
        id: Uuid::new_v4().to_string(),
        slug: pick_slug(fm.slug, file)?,
        title: fm.title,
        excerpt: fm.excerpt,
        content: body.to_string(),
        industry: fm.industry,
        use_case: fm.use_case,
        client: Client {
            name: fm.client.name,
            size: fm.client.size,
            logo_url: fm.client.logo_url,
        },
        tags: fm.tags,
        status,
        featured: fm.featured,
        published_at,
        created_at: file.modified_at,
        updated_at: file.modified_at,
    })
}

pub fn parse_blog_post(file: &ContentFile) -> Result<BlogPost> {
    let (front, body) = split_front_matter(&file.raw)?;
    let fm: BlogFrontMatter = toml::from_str(front)
        .with_context(|| format!("invalid front matter in {}", file.relative_path))?;
    let status = parse_status(fm.status.as_deref())?;
    let published_at = match &fm.published_at {
        Some(dt) => Some(parse_datetime(dt)?),
        None if status == ContentStatus::Published => Some(file.modified_at),
        None => None,
    };

    Ok(BlogPost {
        id: Uuid::new_v4().to_string(),
        slug: pick_slug(fm.slug, file)?,
        title: fm.title,
        excerpt: fm.excerpt,
        content: body.to_string(),
        author: fm.author,
        category: fm.category,
        tags: fm.tags,
        status,
        featured: fm.featured,
        published_at,
        created_at: file.modified_at,
        updated_at: file.modified_at,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Walk the content root and read every matching file.
pub fn scan_content(content: &ContentConfig) -> Result<Vec<ContentFile>> {
    let root = &content.root;
    if !root.exists() {
        bail!("content root does not exist: {}", root.display());
    }

    let include_set = build_globset(&content.include_globs)?;
    let mut excludes = vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()];
    excludes.extend(content.exclude_globs.clone());
    let exclude_set = build_globset(&excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let Some(kind) = ContentKind::from_relative_path(&relative) else {
            tracing::warn!(path = %rel_str, "skipping file outside case-studies/ and blog/");
            continue;
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let modified_secs = entry
            .metadata()?
            .modified()
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        files.push(ContentFile {
            kind,
            relative_path: rel_str,
            raw,
            modified_at: Utc
                .timestamp_opt(modified_secs, 0)
                .single()
                .unwrap_or_default(),
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// Per-type counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ImportCounts {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn upserted(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub case_studies: ImportCounts,
    pub blog_posts: ImportCounts,
}

/// Parse every file, then (unless `dry_run`) upsert into `store`.
///
/// Parsing happens up front so a malformed file aborts the run before
/// anything is written.
pub async fn import_files<S: ContentStore + ?Sized>(
    store: &S,
    files: &[ContentFile],
    dry_run: bool,
) -> Result<ImportReport> {
    enum Parsed {
        Study(CaseStudy),
        Post(BlogPost),
    }

    let mut parsed = Vec::with_capacity(files.len());
    for file in files {
        let record = match file.kind {
            ContentKind::CaseStudy => parse_case_study(file).map(Parsed::Study),
            ContentKind::BlogPost => parse_blog_post(file).map(Parsed::Post),
        }
        .with_context(|| format!("failed to import {}", file.relative_path))?;
        parsed.push((file, record));
    }

    let mut report = ImportReport::default();
    for (file, record) in parsed {
        let hash = file.source_hash();
        match record {
            Parsed::Study(study) => {
                let outcome = if dry_run {
                    UpsertOutcome::Inserted
                } else {
                    store.upsert_case_study(&study, Some(&hash)).await?
                };
                tracing::debug!(path = %file.relative_path, ?outcome, "case study");
                report.case_studies.record(outcome);
            }
            Parsed::Post(post) => {
                let outcome = if dry_run {
                    UpsertOutcome::Inserted
                } else {
                    store.upsert_blog_post(&post, Some(&hash)).await?
                };
                tracing::debug!(path = %file.relative_path, ?outcome, "blog post");
                report.blog_posts.record(outcome);
            }
        }
    }
    Ok(report)
}

pub async fn run_import(config: &Config, dry_run: bool) -> Result<()> {
    let files = scan_content(&config.content)?;
    tracing::info!(
        root = %config.content.root.display(),
        files = files.len(),
        "scanned content"
    );

    let report = if dry_run {
        let store = casework_core::store::memory::InMemoryStore::new();
        import_files(&store, &files, true).await?
    } else {
        let pool = db::connect(config).await?;
        let store = SqliteStore::new(pool);
        let report = import_files(&store, &files, false).await?;
        store.pool().close().await;
        report
    };

    if dry_run {
        println!("Dry run: nothing written.");
    }
    println!(
        "case studies: {} upserted, {} unchanged",
        report.case_studies.upserted(),
        report.case_studies.unchanged
    );
    println!(
        "blog posts: {} upserted, {} unchanged",
        report.blog_posts.upserted(),
        report.blog_posts.unchanged
    );
    println!("ok");
    Ok(())
}
