//! Integration tests for the service entry points.
//!
//! These tests verify:
//! - Configuration loading from the environment
//! - Store construction from mock data and notes files
//! - Serving the HTTP API over a real socket
//!
//! Env-mutating tests run serially.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;

use notes_lookup::config::{Config, DEFAULT_HTTP_PORT, DEFAULT_METRICS_PORT};
use notes_lookup::error::ServiceError;
use notes_lookup::http::{router, AppState, HealthResponse};
use notes_lookup::notes::{MemoryStore, MockStore, RecordStore};
use notes_lookup::rewrite::RewritingSearch;
use notes_lookup::search::{SearchEngine, SearchResult};

/// Test helper to set environment variables for a test
struct TestEnv {
    vars_to_restore: Vec<(String, Option<String>)>,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            vars_to_restore: Vec::new(),
        }
    }

    fn set_var(&mut self, key: &str, value: &str) {
        let old_value = std::env::var(key).ok();
        self.vars_to_restore.push((key.to_string(), old_value));
        std::env::set_var(key, value);
    }

    fn remove_var(&mut self, key: &str) {
        let old_value = std::env::var(key).ok();
        self.vars_to_restore.push((key.to_string(), old_value));
        std::env::remove_var(key);
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        for (key, old_value) in self.vars_to_restore.iter().rev() {
            match old_value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_loading_with_mock_notes() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "true");
    env.set_var("HTTP_PORT", "8181");
    env.set_var("METRICS_PORT", "9191");

    let config = Config::from_env().expect("Config should load with MOCK_NOTES=true");

    assert!(config.mock_notes);
    assert_eq!(config.http_port, 8181);
    assert_eq!(config.metrics_port, 9191);
}

#[test]
#[serial]
fn test_config_requires_notes_file_without_mock() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "false");
    env.set_var("NOTES_FILE_PATH", "");

    assert!(Config::from_env().is_err());
}

#[test]
#[serial]
fn test_config_accepts_notes_file_path() {
    let mut env = TestEnv::new();
    env.remove_var("MOCK_NOTES");
    env.set_var("NOTES_FILE_PATH", "/path/to/notes.json");

    let config = Config::from_env().expect("Config should load with file path");

    assert!(!config.mock_notes);
    assert_eq!(config.notes_file_path, "/path/to/notes.json");
}

#[test]
#[serial]
fn test_config_default_notes_path() {
    let mut env = TestEnv::new();
    env.remove_var("MOCK_NOTES");
    env.remove_var("NOTES_FILE_PATH");

    let config = Config::from_env().expect("Config should load");

    assert_eq!(config.notes_file_path, "data/notes.json");
}

#[test]
#[serial]
fn test_invalid_port_configuration() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "true");
    env.set_var("HTTP_PORT", "invalid_port");
    env.set_var("METRICS_PORT", "99999");

    let config = Config::from_env().expect("Config should use default port on parse failure");

    assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    assert_eq!(config.metrics_port, DEFAULT_METRICS_PORT);
}

#[test]
#[serial]
fn test_mock_notes_case_insensitive_true() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "TRUE");

    assert!(Config::from_env().expect("Config should load").mock_notes);

    env.set_var("MOCK_NOTES", "1");
    assert!(Config::from_env().expect("Config should load").mock_notes);
}

#[test]
#[serial]
fn test_bind_address_and_log_level() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "true");
    env.remove_var("BIND_ADDRESS");
    env.set_var("RUST_LOG", "debug");

    let config = Config::from_env().expect("Config should load");
    assert_eq!(config.bind_address, "auto");
    assert_eq!(config.log_level, "debug");

    env.set_var("BIND_ADDRESS", "::");
    let config = Config::from_env().expect("Config should load");
    assert_eq!(config.bind_address, "::");
}

#[test]
#[serial]
fn test_config_debug_hides_rewrite_key() {
    let mut env = TestEnv::new();
    env.set_var("MOCK_NOTES", "true");
    env.set_var("REWRITE_API_KEY", "gsk_top_secret");

    let config = Config::from_env().expect("Config should load");
    let debug_str = format!("{:?}", config.clone());

    assert!(debug_str.contains("Config"));
    assert!(debug_str.contains("http_port"));
    assert!(!debug_str.contains("gsk_top_secret"));
}

#[tokio::test]
async fn test_mock_store_initialization() {
    let store: Arc<dyn RecordStore> = Arc::new(MockStore::new());

    assert!(store.is_ready());
    assert!(store.count() > 0);
    assert!(store.source().contains("mock://"));
}

#[tokio::test]
async fn test_file_store_from_source_documents() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"documents": [
            {{"subject": "Computer Networks (BCS502/21CS52)", "sem": "Sem5", "department": ["computerscience", "informationscience"]}},
            {{"subject": "Theory of Computation (BCS503)", "sem": "Sem5", "department": ["computerscience"]}}
        ]}}"#
    )
    .unwrap();

    let store = MemoryStore::open(file.path()).await.expect("notes should load");
    assert_eq!(store.count(), 3);

    let engine = SearchEngine::new(Arc::new(store));
    let SearchResult::Exact(exact) = engine.search("bcs502", 10).await.unwrap() else {
        panic!("expected exact result");
    };
    assert_eq!(exact.results.len(), 2);
    assert_eq!(exact.buckets().len(), 2);
}

#[tokio::test]
async fn test_missing_notes_file_fails_startup() {
    let err = MemoryStore::open("/definitely/not/here.json").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotesFileNotFound(_)));
}

#[tokio::test]
async fn test_http_server_serves_search_and_health() {
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;

    let engine = SearchEngine::new(Arc::new(MockStore::new()));
    let search = Arc::new(RewritingSearch::new(engine, None));
    let app = router(AppState::new(search, "https://notes.example", 50));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let client: hyper_util::client::legacy::Client<_, Empty<Bytes>> =
        hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .build_http();

    let health_uri: hyper::Uri = format!("http://127.0.0.1:{}/health", port).parse().unwrap();
    let response = tokio::time::timeout(Duration::from_secs(5), client.get(health_uri))
        .await
        .expect("health request should not time out")
        .unwrap();
    assert!(response.status().is_success());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "SERVING");

    let search_uri: hyper::Uri = format!("http://127.0.0.1:{}/search?q=BCS303", port)
        .parse()
        .unwrap();
    let response = client.get(search_uri).await.unwrap();
    assert!(response.status().is_success());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["result"]["type"], "exact");

    server.abort();
}

#[tokio::test]
async fn test_concurrent_searches_share_engine() {
    let engine = SearchEngine::new(Arc::new(MockStore::new()));

    let handles: Vec<_> = ["bcs304", "data", "operating systems", "quantumfoo"]
        .into_iter()
        .map(|q| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.search(q, 10).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.expect("Task should complete");
        assert!(result.is_ok());
    }
}
