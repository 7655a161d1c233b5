//! # Casework
//!
//! Content backend for a consulting firm's marketing website: case studies,
//! blog posts, and job postings, served as a JSON API.
//!
//! Case studies and blog posts are authored as Markdown files with TOML
//! front matter and imported into SQLite. Job postings are managed through
//! the API. The headline feature is case-study search: exact filters on
//! industry, client size, and use case, then weighted fuzzy ranking.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐
//! │  Markdown   │──▶│   Import    │──▶│  SQLite  │
//! │  content/   │   │ parse+hash  │   │  store   │
//! └─────────────┘   └─────────────┘   └────┬─────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │(casework)│       │   API    │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! casework init                        # create database
//! casework import                      # load content/ into SQLite
//! casework search "cloud" --industry Technology
//! casework serve                       # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite implementation of the content store |
//! | [`import`] | Markdown content importer |
//! | [`search`] | CLI case-study search |
//! | [`server`] | HTTP API |
//!
//! Domain types, the fuzzy matcher, and the query engine live in the
//! `casework-core` crate.

pub mod config;
pub mod db;
pub mod import;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
