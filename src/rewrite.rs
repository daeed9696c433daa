//! Optional query rewriting ahead of the search engine.
//!
//! A rewriter may turn a conversational query into the subject terms the
//! catalogue uses. Its failures never block a search: `RewritingSearch`
//! falls back to the original query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RewriteConfig;
use crate::error::ServiceError;
use crate::metrics;
use crate::search::{normalize_query, SearchEngine, SearchResult};

const SYSTEM_PROMPT: &str = "You are a query analyzer for VTU engineering notes search. \
Extract key technical terms and subject names.";

/// Errors raised by a query rewriter.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Rewrite request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Rewriter returned no usable terms")]
    Empty,
}

/// Turns a raw query into an alternative query string.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, query: &str) -> Result<String, RewriteError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Rewriter backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionRewriter {
    http_client: reqwest::Client,
    config: RewriteConfig,
}

impl ChatCompletionRewriter {
    pub fn new(config: RewriteConfig) -> Result<Self, RewriteError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn prompt(query: &str) -> String {
        format!(
            "Analyze this user query for a VTU engineering notes search: \"{}\"\n\
             Extract and return only the key subject names, codes, or technical terms \
             that should be used for database search. Return a comma-separated list of \
             search terms, or the original query if no specific terms can be identified.",
            query
        )
    }
}

/// First non-empty term of a comma-separated completion.
pub fn first_term(completion: &str) -> Option<String> {
    completion
        .split(',')
        .map(|t| t.trim().trim_matches('"').trim())
        .find(|t| !t.is_empty())
        .map(String::from)
}

#[async_trait]
impl QueryRewriter for ChatCompletionRewriter {
    async fn rewrite(&self, query: &str) -> Result<String, RewriteError> {
        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(query),
                },
            ],
            max_tokens: 100,
            temperature: 0.1,
        };

        let response: ChatResponse = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .as_deref()
            .and_then(first_term)
            .ok_or(RewriteError::Empty)
    }
}

/// Search with an optional rewrite stage in front of the engine.
pub struct RewritingSearch {
    engine: SearchEngine,
    rewriter: Option<Arc<dyn QueryRewriter>>,
}

/// A search outcome with the query that actually ran.
#[derive(Debug, Clone)]
pub struct RewrittenSearch {
    pub effective_query: String,
    pub result: SearchResult,
}

impl RewritingSearch {
    pub fn new(engine: SearchEngine, rewriter: Option<Arc<dyn QueryRewriter>>) -> Self {
        Self { engine, rewriter }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Query that should be searched for `query`: the rewrite when it
    /// succeeds, the original otherwise.
    pub async fn effective_query(&self, query: &str) -> String {
        let Some(rewriter) = &self.rewriter else {
            return query.to_string();
        };

        match rewriter.rewrite(query).await {
            Ok(rewritten) if !normalize_query(&rewritten).is_empty() => {
                debug!(original = %query, rewritten = %rewritten, "Query rewritten");
                rewritten
            }
            Ok(_) => {
                warn!(query = %query, "Rewriter returned a blank query, using original");
                metrics::increment_rewrite_fallbacks();
                query.to_string()
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Query rewrite failed, using original");
                metrics::increment_rewrite_fallbacks();
                query.to_string()
            }
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<RewrittenSearch, ServiceError> {
        if normalize_query(query).is_empty() {
            return Err(ServiceError::InvalidQuery("Query cannot be empty".into()));
        }
        let effective_query = self.effective_query(query).await;
        let result = self.engine.search(&effective_query, limit).await?;
        Ok(RewrittenSearch {
            effective_query,
            result,
        })
    }
}
