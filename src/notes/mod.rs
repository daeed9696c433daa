//! Notes collection: the record model and the stores that serve it.
//!
//! This module provides a `RecordStore` trait and implementations:
//! - `MockStore` - Built-in sample catalogue for testing
//! - `MemoryStore` - Snapshot loaded from a notes file

mod memory;
mod mock;
mod record;
mod store;

pub use memory::MemoryStore;
pub use mock::{sample_records, MockStore};
pub use record::{full_name_of, Field, Record, RecordIdentity};
pub use store::{FieldMatch, RecordStore};
