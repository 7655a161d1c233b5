use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn casework_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("casework");
    path
}

fn study(title: &str, industry: &str, size: &str, use_case: &str, date: &str) -> String {
    format!(
        r#"+++
title = "{title}"
excerpt = "How {industry} teams shipped faster."
industry = "{industry}"
use_case = "{use_case}"
tags = ["ai"]
published_at = {date}

[client]
name = "Acme {industry}"
size = "{size}"
+++

## Outcome

Delivered.
"#
    )
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let studies = root.join("content/case-studies");
    let blog = root.join("content/blog");
    fs::create_dir_all(&studies).unwrap();
    fs::create_dir_all(&blog).unwrap();

    fs::write(
        studies.join("cloud-migration.md"),
        study(
            "Cloud Migration Success",
            "Technology",
            "Enterprise",
            "Infrastructure",
            "2024-05-01",
        ),
    )
    .unwrap();
    fs::write(
        studies.join("patient-triage.md"),
        study(
            "Patient Triage Assistant",
            "Healthcare",
            "Mid-Market",
            "Automation",
            "2024-04-01",
        ),
    )
    .unwrap();
    fs::write(
        studies.join("radiology-imaging.md"),
        study(
            "Radiology Imaging Pipeline",
            "Healthcare",
            "Enterprise",
            "Computer Vision",
            "2024-03-01",
        ),
    )
    .unwrap();
    fs::write(
        studies.join("fraud-detection.md"),
        study(
            "Real-Time Fraud Detection",
            "Finance",
            "Enterprise",
            "Risk",
            "2024-02-01",
        ),
    )
    .unwrap();
    fs::write(
        studies.join("demand-forecasting.md"),
        study(
            "Demand Forecasting Engine",
            "Retail",
            "Startup",
            "Analytics",
            "2024-01-01",
        ),
    )
    .unwrap();
    fs::write(
        blog.join("evaluating-agents.md"),
        r#"+++
title = "Evaluating LLM Agents"
author = "Priya Natarajan"
category = "Engineering"
tags = ["llm"]
published_at = 2024-05-02
+++
Body.
"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/casework.sqlite"

[server]
bind = "127.0.0.1:7341"

[content]
root = "{}/content"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("casework.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_casework(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = casework_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run casework binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn imported_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, ok) = run_casework(&config_path, &["init"]);
    assert!(ok, "init failed: {}", stderr);
    let (stdout, stderr, ok) = run_casework(&config_path, &["import"]);
    assert!(ok, "import failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path)
}

fn search_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["search", "--json"];
    full.extend_from_slice(args);
    let (stdout, stderr, ok) = run_casework(config_path, &full);
    assert!(ok, "search failed: stdout={}, stderr={}", stdout, stderr);
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_casework(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/casework.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_casework(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_casework(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_counts() {
    let (_tmp, config_path) = setup_test_env();

    run_casework(&config_path, &["init"]);
    let (stdout, stderr, success) = run_casework(&config_path, &["import"]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("case studies: 5 upserted, 0 unchanged"));
    assert!(stdout.contains("blog posts: 1 upserted, 0 unchanged"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_import_unchanged_files_are_skipped() {
    let (_tmp, config_path) = imported_env();

    let (stdout, _, success) = run_casework(&config_path, &["import"]);
    assert!(success);
    assert!(stdout.contains("case studies: 0 upserted, 5 unchanged"));
    assert!(stdout.contains("blog posts: 0 upserted, 1 unchanged"));
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();

    run_casework(&config_path, &["init"]);
    let (stdout, _, success) = run_casework(&config_path, &["import", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("Dry run"));
    assert!(stdout.contains("case studies: 5 upserted"));

    let body = search_json(&config_path, &[]);
    assert_eq!(body["total"], 0);
}

#[test]
fn test_import_bad_front_matter_fails() {
    let (tmp, config_path) = setup_test_env();
    fs::write(
        tmp.path().join("content/case-studies/broken.md"),
        "+++\ntitle = \"No closing fence\"\n",
    )
    .unwrap();

    run_casework(&config_path, &["init"]);
    let (_, stderr, success) = run_casework(&config_path, &["import"]);
    assert!(!success);
    assert!(stderr.contains("broken.md"), "stderr: {}", stderr);
}

#[test]
fn test_search_lists_everything_without_query() {
    let (_tmp, config_path) = imported_env();

    let body = search_json(&config_path, &["--limit", "10"]);
    assert_eq!(body["total"], 5);
    assert_eq!(body["query"], "");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    // Newest first when nothing is ranked.
    assert_eq!(results[0]["study"]["slug"], "cloud-migration");
    assert_eq!(results[4]["study"]["slug"], "demand-forecasting");
    for r in results {
        assert_eq!(r["score"], 1.0);
    }
}

#[test]
fn test_search_industry_filter() {
    let (_tmp, config_path) = imported_env();

    let body = search_json(&config_path, &["--industry", "Healthcare"]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["filters"]["industry"], "Healthcare");
    for r in body["results"].as_array().unwrap() {
        assert_eq!(r["study"]["industry"], "Healthcare");
    }
}

#[test]
fn test_search_near_match_ranks_first() {
    let (_tmp, config_path) = imported_env();

    let body = search_json(&config_path, &["clou"]);
    let first = &body["results"][0];
    assert_eq!(first["study"]["slug"], "cloud-migration");
    assert_eq!(first["matches"]["title"], true);
    assert!(first["score"].as_f64().unwrap() < 0.4);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = imported_env();

    let body = search_json(&config_path, &["zzzznotfound"]);
    assert_eq!(body["total"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());

    let (stdout, _, success) = run_casework(&config_path, &["search", "zzzznotfound"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_deterministic() {
    let (_tmp, config_path) = imported_env();

    let (a, _, _) = run_casework(&config_path, &["search", "--json", "engine"]);
    let (b, _, _) = run_casework(&config_path, &["search", "--json", "engine"]);
    assert_eq!(a, b);
}

#[test]
fn test_search_text_output() {
    let (_tmp, config_path) = imported_env();

    let (stdout, _, success) = run_casework(&config_path, &["search", "fraud"]);
    assert!(success);
    assert!(stdout.contains("1. ["));
    assert!(stdout.contains("Real-Time Fraud Detection"));
    assert!(stdout.contains("slug: fraud-detection"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_casework(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
