//! Ashikawa Client Library
//!
//! HTTP client for connecting to ArangoDB REST API servers.
//!
//! ```rust,no_run
//! use ashikawa_rs::{connect, Config, QueryOptions};
//!
//! # async fn run() -> ashikawa_rs::Result<()> {
//! let db = connect(Config::from_env())?;
//! let mut cursor = db
//!     .query("FOR u IN users RETURN u", QueryOptions::new().batch_size(100))
//!     .await?;
//! while let Some(row) = cursor.next().await? {
//!     println!("{}", row);
//! }
//! # Ok(())
//! # }
//! ```

mod client;

use std::sync::Arc;

pub use ashikawa_core::{
    All, ByExample, Collection, CollectionStatus, Config, Cursor, Database, Document, DocumentId,
    Error, Figure, Figures, InRange, Index, IndexRequest, IndexType, Near, Paged, QueryOptions,
    Result, Within,
};
pub use client::HttpTransport;

/// Open a database handle over HTTP
pub fn connect(config: Config) -> Result<Database> {
    tracing::debug!(url = %config.url, "Connecting to database");
    let transport = HttpTransport::new(config)?;
    Ok(Database::new(Arc::new(transport)))
}
