//! # VapeLog Common Library
//!
//! Shared engine for every VapeLog front end:
//! - Entity models (products, sessions, check-ins) and terpene reference data
//! - SQLite database initialization and migrations
//! - Store trait with SQLite and in-memory implementations
//! - Effect scoring, recommendations and usage-pattern analytics
//! - Export/import documents and label scan parsing
//! - Configuration loading

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod scan;
pub mod store;
pub mod time;

pub use analytics::AnalyticsEngine;
pub use error::{Error, Result};
pub use store::{EntityStore, MemoryStore, SqliteStore};
