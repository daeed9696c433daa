//! Notes lookup service library.
//!
//! This library exposes the core modules for integration testing while
//! keeping the actual binary entry point in main.rs.

pub mod config;
pub mod error;
pub mod http;
pub mod import;
pub mod metrics;
pub mod notes;
pub mod rewrite;
pub mod search;
pub mod semester;
