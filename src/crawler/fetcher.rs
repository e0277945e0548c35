//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured network identity
//! - Rate-limit pacing (fixed delay before every fetch)
//! - Error classification (timeout, connection failure, other)

use crate::config::ConnectionConfig;
use reqwest::{header, redirect::Policy, Client};
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code of the response
    pub status_code: u16,

    /// Raw response body (markup)
    pub body: String,
}

impl FetchedPage {
    /// Whether the response status marks a dead end for crawling
    ///
    /// A leading status digit of 4 or 5 ends the branch without an error;
    /// sibling subtrees continue.
    pub fn is_dead_end(&self) -> bool {
        self.status_code >= 400
    }
}

/// Result of a fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// Response received (any status code)
    Fetched(FetchedPage),

    /// Request timed out
    Timeout,

    /// Connection could not be established
    ConnectionFailed(String),

    /// Any other transport failure
    Other(String),
}

/// Builds an HTTP client with the configured identity and timeout
pub fn build_http_client(connection: &ConnectionConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    if let Ok(referer) = header::HeaderValue::from_str(&connection.referrer) {
        headers.insert(header::REFERER, referer);
    }

    Client::builder()
        .user_agent(connection.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(connection.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, pacing the request with the configured delay
///
/// The delay is inserted before every fetch to rate-limit the target
/// server. Network failures are classified, never propagated as errors:
/// a failed fetch is a dead end at the single-link level.
pub async fn fetch_page(client: &Client, url: &str, connection: &ConnectionConfig) -> FetchOutcome {
    tokio::time::sleep(Duration::from_millis(connection.delay_ms)).await;

    match client.get(url).send().await {
        Ok(response) => {
            let status_code = response.status().as_u16();
            match response.text().await {
                Ok(body) => FetchOutcome::Fetched(FetchedPage { status_code, body }),
                Err(e) => FetchOutcome::Other(e.to_string()),
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchOutcome::Timeout
            } else if e.is_connect() {
                FetchOutcome::ConnectionFailed(e.to_string())
            } else {
                FetchOutcome::Other(e.to_string())
            }
        }
    }
}
