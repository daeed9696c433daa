//! HTTP handlers for search, semester menus and health.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::MAX_SEARCH_LIMIT;
use crate::error::ServiceError;
use crate::metrics;
use crate::rewrite::RewritingSearch;
use crate::search::{BranchBucket, SearchResult};
use crate::semester::{semester_menu, Semester, SemesterMenu};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<RewritingSearch>,
    /// Prefix joined to bucket branch URLs
    pub base_url: String,
    /// Limit used when a request does not specify one
    pub default_limit: usize,
}

impl AppState {
    pub fn new(search: Arc<RewritingSearch>, base_url: impl Into<String>, default_limit: usize) -> Self {
        Self {
            search,
            base_url: base_url.into(),
            default_limit,
        }
    }

    fn link(&self, branch_url: &str) -> String {
        format!("{}{}", self.base_url, branch_url)
    }

    fn ensure_ready(&self) -> Result<(), ServiceError> {
        if self.search.engine().store().is_ready() {
            Ok(())
        } else {
            Err(ServiceError::NotReady)
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/semesters/:semester", get(semester))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Raw query string; `limit` is parsed by the handler so a bad value gets
/// the JSON error body.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl SearchParams {
    fn limit_or(&self, default_limit: usize) -> Result<usize, ServiceError> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => default_limit,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ServiceError::InvalidQuery(format!("Invalid limit: {}", raw)))?,
        };
        Ok(limit.clamp(1, MAX_SEARCH_LIMIT))
    }
}

/// A display bucket with its browsable link.
#[derive(Debug, Serialize)]
pub struct LinkedBucket {
    #[serde(flatten)]
    pub bucket: BranchBucket,
    pub url: String,
    pub subjects_text: String,
}

#[derive(Debug, Serialize)]
pub struct SearchReply {
    pub query: String,
    pub effective_query: String,
    pub result: SearchResult,
    /// Buckets a renderer should show, best first
    pub buckets: Vec<LinkedBucket>,
}

#[instrument(skip_all, fields(query))]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchReply>, ServiceError> {
    let limit = params.limit_or(state.default_limit)?;
    let query = params.q.unwrap_or_default();
    tracing::Span::current().record("query", query.as_str());

    if query.trim().is_empty() {
        return Err(ServiceError::InvalidQuery("Query parameter 'q' is required".into()));
    }
    state.ensure_ready()?;

    info!(query = %query, limit, "Processing search request");

    let start = Instant::now();
    let outcome = state.search.search(&query, limit).await.map_err(|e| {
        metrics::increment_search_errors();
        e
    })?;

    metrics::record_search_latency(start.elapsed().as_secs_f64() * 1000.0);
    metrics::increment_search_count(outcome.result.tier());

    let max_buckets = outcome.result.tier().max_buckets();
    let buckets = outcome
        .result
        .buckets()
        .into_iter()
        .take(max_buckets)
        .map(|bucket| LinkedBucket {
            url: state.link(&bucket.branch_url),
            subjects_text: bucket.subjects_text(),
            bucket,
        })
        .collect();

    Ok(Json(SearchReply {
        query,
        effective_query: outcome.effective_query,
        result: outcome.result,
        buckets,
    }))
}

#[instrument(skip_all, fields(semester = %text))]
async fn semester(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Result<Response, ServiceError> {
    let Some(semester) = Semester::parse(&text) else {
        return Err(ServiceError::InvalidQuery(format!("Unknown semester: {}", text)));
    };
    state.ensure_ready()?;

    let store = state.search.engine().store();
    let menu: Option<SemesterMenu> = semester_menu(store.as_ref(), semester, &state.base_url).await?;

    Ok(match menu {
        Some(menu) => Json(menu).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No notes for {}", semester.display_name()) })),
        )
            .into_response(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub note_count: usize,
    pub source: String,
    pub loaded_at: Option<DateTime<Utc>>,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.search.engine().store();
    let (code, status) = if store.is_ready() {
        (StatusCode::OK, "SERVING")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT_SERVING")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            note_count: store.count(),
            source: store.source().to_string(),
            loaded_at: store.loaded_at(),
        }),
    )
}
