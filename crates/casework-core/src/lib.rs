//! # Casework Core
//!
//! Shared, I/O-free logic for Casework: content models, the weighted fuzzy
//! matcher, the case-study query engine, listings, job validation, and the
//! store abstraction.
//!
//! This crate contains no tokio, sqlx, filesystem, or HTTP dependencies.

pub mod fuzzy;
pub mod jobs;
pub mod listing;
pub mod models;
pub mod query;
pub mod store;
