use serde::Deserialize;

/// Main configuration structure for Korni
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Network identity and fetch pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// User agent string sent with every fetch
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referrer header sent with every fetch
    pub referrer: String,

    /// Per-fetch timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed delay inserted before each fetch (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_delay_ms() -> u64 {
    150
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A configured site to crawl and index
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site (no trailing slash after normalization)
    pub url: String,

    /// Human-readable site name
    pub name: String,
}

impl Config {
    /// Finds the configured site owning the given page URL, if any
    pub fn site_for_url(&self, url: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| url.starts_with(&site.url))
    }
}
