use anyhow::{Context, Result};
use casework_core::fuzzy::FuzzyOptions;
use casework_core::query::SearchParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Highest field score that still counts as a fuzzy hit.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_distance")]
    pub distance: usize,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Optional page-size clamp; unset means unbounded.
    #[serde(default)]
    pub max_limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            distance: default_distance(),
            default_limit: default_limit(),
            max_limit: None,
        }
    }
}

fn default_threshold() -> f64 {
    0.4
}
fn default_distance() -> usize {
    100
}
fn default_limit() -> usize {
    10
}

impl SearchConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            fuzzy: FuzzyOptions {
                threshold: self.threshold,
                distance: self.distance,
            },
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_content_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("./content")
}

fn default_include_globs() -> Vec<String> {
    vec![
        "case-studies/**/*.md".to_string(),
        "blog/**/*.md".to_string(),
    ]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let search = &config.search;
    if !(search.threshold > 0.0 && search.threshold <= 1.0) {
        anyhow::bail!("search.threshold must be in (0.0, 1.0]");
    }
    if search.distance == 0 {
        anyhow::bail!("search.distance must be > 0");
    }
    if search.default_limit == 0 {
        anyhow::bail!("search.default_limit must be >= 1");
    }
    if search.max_limit == Some(0) {
        anyhow::bail!("search.max_limit must be >= 1 when set");
    }
    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }
    Ok(())
}
