//! Korni: a site-scoped lemma search engine
//!
//! This crate crawls a configured set of web sites, extracts normalized word
//! roots (lemmas) from page content, builds an inverted index mapping lemmas
//! to pages, and answers ranked free-text queries against that index.

pub mod config;
pub mod crawler;
pub mod index;
pub mod lemma;
pub mod morphology;
pub mod search;
pub mod service;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Korni operations
#[derive(Debug, Error)]
pub enum KorniError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Empty search query")]
    EmptyQuery,

    #[error("Site is not indexed: {0}")]
    SiteNotIndexed(String),

    #[error("Page is outside the configured sites: {0}")]
    PageOutsideSites(String),

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Korni operations
pub type Result<T> = std::result::Result<T, KorniError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::CrawlSignal;
pub use lemma::LemmaExtractor;
pub use morphology::{Morphology, RussianMorphology};
pub use storage::SiteStatus;
pub use crate::url::canonical_path;
