use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Site URLs are normalized on load: a trailing slash is stripped so that
/// path canonicalization and prefix checks see a consistent root.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use korni::config::load_config;
///
/// let config = load_config(Path::new("korni.toml")).unwrap();
/// println!("Sites: {}", config.sites.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    for site in &mut config.sites {
        while site.url.ends_with('/') {
            site.url.pop();
        }
    }

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect whether the configuration changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[connection]
user-agent = "KorniBot/1.0"
referrer = "https://www.google.com"
timeout-secs = 90
delay-ms = 150

[output]
database-path = "./korni.db"

[[site]]
url = "https://example.ru/"
name = "Example"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.connection.user_agent, "KorniBot/1.0");
        assert_eq!(config.connection.timeout_secs, 90);
        assert_eq!(config.connection.delay_ms, 150);
        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.sites[0].name, "Example");
    }

    #[test]
    fn test_site_url_trailing_slash_stripped() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sites[0].url, "https://example.ru");
    }

    #[test]
    fn test_defaults_applied() {
        let content = r#"
[connection]
user-agent = "KorniBot/1.0"
referrer = "https://www.google.com"

[output]
database-path = "./korni.db"

[[site]]
url = "https://example.ru"
name = "Example"
"#;
        let file = create_temp_config(content);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.connection.timeout_secs, 90);
        assert_eq!(config.connection.delay_ms, 150);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/korni.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_without_sites() {
        let content = r#"
[connection]
user-agent = "KorniBot/1.0"
referrer = "https://www.google.com"

[output]
database-path = "./korni.db"
"#;
        let file = create_temp_config(content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
