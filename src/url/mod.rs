//! URL handling module for Korni
//!
//! This module provides canonical path extraction and the link eligibility
//! rules gating crawler recursion.

use ::url::Url;

/// File extensions that never carry indexable page content
///
/// Binary, archive, and config/data formats discovered as anchor targets are
/// skipped without a fetch.
const BLACKLISTED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico", ".pdf", ".doc", ".docx",
    ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".gz", ".tar", ".7z", ".sql", ".yaml",
    ".yml", ".json", ".xml", ".csv", ".js", ".css", ".exe", ".apk", ".mp3", ".mp4", ".avi",
];

/// Extracts the canonical site-relative path of an absolute URL
///
/// The canonical path is the URL's path component normalized to always end
/// with a trailing slash; the query and fragment do not participate. Returns
/// `None` for unparseable URLs.
///
/// # Examples
///
/// ```
/// use korni::url::canonical_path;
///
/// assert_eq!(canonical_path("https://example.ru/about"), Some("/about/".to_string()));
/// assert_eq!(canonical_path("https://example.ru"), Some("/".to_string()));
/// ```
pub fn canonical_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut path = parsed.path().to_string();

    if !path.ends_with('/') {
        path.push('/');
    }

    Some(path)
}

/// Decides whether a resolved link is eligible for crawler recursion
///
/// Eligible links stay under the root prefix, carry no fragment marker or
/// percent-encoded segment, do not point at blacklisted extensions, and
/// canonicalize to a non-empty path. The "page already exists" rule is
/// checked separately against storage by the caller.
pub fn is_eligible_link(link: &str, root_prefix: &str) -> bool {
    if !link.starts_with(root_prefix) {
        return false;
    }

    if link.contains('#') || link.contains('%') {
        return false;
    }

    let lowered = link.to_lowercase();
    if BLACKLISTED_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
    {
        return false;
    }

    match canonical_path(link) {
        Some(path) => !path.is_empty(),
        None => false,
    }
}
