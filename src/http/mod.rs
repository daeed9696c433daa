//! HTTP API for the notes lookup service.

mod service;

pub use service::{router, AppState, HealthResponse, LinkedBucket, SearchParams, SearchReply};
