//! Configuration module for the notes lookup service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_METRICS_PORT: u16 = 9090;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_SEARCH_LIMIT: usize = 100;
pub const DEFAULT_BASE_URL: &str = "https://www.notezy.online";
pub const DEFAULT_REWRITE_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_REWRITE_MODEL: &str = "llama-3.1-8b-instant";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the notes JSON file
    pub notes_file_path: String,
    /// Search API port
    pub http_port: u16,
    /// Prometheus metrics HTTP port
    pub metrics_port: u16,
    /// Bind address (supports IPv4, IPv6, or dual-stack)
    pub bind_address: String,
    /// Serve the built-in sample notes instead of a file (opt-in via MOCK_NOTES)
    pub mock_notes: bool,
    /// Limit used when a search request does not carry one
    pub search_limit: usize,
    /// Prefix joined to a record's branch URL to build a browsable link
    pub base_url: String,
    /// Query rewriter settings, present only when an API key is configured
    pub rewrite: Option<RewriteConfig>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings for the optional chat-completion query rewriter.
#[derive(Clone)]
pub struct RewriteConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl std::fmt::Debug for RewriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `NOTES_FILE_PATH` - Path to notes JSON (required unless MOCK_NOTES=true)
    /// - `HTTP_PORT` - Search API listen port (default: 8080)
    /// - `METRICS_PORT` - Prometheus metrics port (default: 9090)
    /// - `BIND_ADDRESS` - Bind address (default: auto-detect [::] or 0.0.0.0)
    /// - `MOCK_NOTES` - Serve built-in sample notes (default: false)
    /// - `SEARCH_LIMIT` - Default result limit, clamped to 1..=100 (default: 50)
    /// - `NOTES_BASE_URL` - Link prefix (default: https://www.notezy.online)
    /// - `REWRITE_API_KEY` / `REWRITE_API_URL` / `REWRITE_MODEL` - Query rewriter
    /// - `RUST_LOG` - Log level (default: info)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mock_notes = env::var("MOCK_NOTES")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let notes_file_path = env::var("NOTES_FILE_PATH").unwrap_or_else(|_| {
            if mock_notes {
                String::new()
            } else {
                "data/notes.json".to_string()
            }
        });

        if !mock_notes && notes_file_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("NOTES_FILE_PATH"));
        }

        let http_port = parse_or("HTTP_PORT", DEFAULT_HTTP_PORT);
        let metrics_port = parse_or("METRICS_PORT", DEFAULT_METRICS_PORT);
        let search_limit =
            parse_or("SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);

        let base_url = env::var("NOTES_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let rewrite = env::var("REWRITE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| RewriteConfig {
                api_key,
                api_url: env::var("REWRITE_API_URL")
                    .unwrap_or_else(|_| DEFAULT_REWRITE_API_URL.to_string()),
                model: env::var("REWRITE_MODEL")
                    .unwrap_or_else(|_| DEFAULT_REWRITE_MODEL.to_string()),
            });

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "auto".to_string());

        Ok(Config {
            notes_file_path,
            http_port,
            metrics_port,
            bind_address,
            mock_notes,
            search_limit,
            base_url,
            rewrite,
            log_level,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingRequired(&'static str),
}
