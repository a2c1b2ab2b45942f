//! Ashikawa Core Library
//!
//! Client-side model of an ArangoDB server:
//! - Database, collection, document and index wrappers
//! - Cursors over paginated query results
//! - Request building for simple queries, AQL queries and indices
//!
//! Requests go through the [`Transport`] trait; `ashikawa-rs` provides the
//! HTTP implementation.

pub mod collection;
pub mod config;
pub mod cursor;
pub mod database;
pub mod document;
pub mod error;
pub mod index;
pub mod models;
pub mod request;
pub mod transport;

// Re-export commonly used types
pub use collection::Collection;
pub use config::Config;
pub use cursor::{Cursor, CursorHandle};
pub use database::Database;
pub use document::Document;
pub use error::{Error, Result};
pub use index::Index;
pub use models::{CollectionStatus, DocumentId, Figure, Figures, IndexId, IndexType};
pub use request::{
    All, ByExample, FirstExample, InRange, IndexRequest, Near, Paged, QueryOptions, Within,
};
pub use transport::{Method, Request, Transport};
