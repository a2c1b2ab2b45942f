use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, Stream};
use serde_json::Value;

use crate::models::CursorResponse;
use crate::request;
use crate::transport::Transport;
use crate::{Error, Result};

/// Opaque handle to a server-side cursor
///
/// Only a [`Cursor`] holds one, and it is dropped as soon as the server
/// reports the result set as complete.
pub struct CursorHandle(String);

impl CursorHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CursorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorHandle").field(&self.0).finish()
    }
}

/// Lazy, forward-only sequence over the rows of a query result.
///
/// Rows of the current batch are handed out without network activity. Once
/// the batch is drained and the server reported more results, the next batch
/// is fetched with the cursor's handle. A failed fetch is returned from the
/// `next` call that needed it and leaves the cursor untouched, so calling
/// `next` again retries the same fetch.
///
/// A cursor that has been fully consumed stays empty.
pub struct Cursor {
    transport: Arc<dyn Transport>,
    handle: Option<CursorHandle>,
    batch: VecDeque<Value>,
    has_more: bool,
    total_count: Option<u64>,
}

impl Cursor {
    pub fn new(transport: Arc<dyn Transport>, response: CursorResponse) -> Result<Self> {
        let handle = match (response.has_more, response.id) {
            (true, Some(id)) => Some(CursorHandle(id)),
            (true, None) => {
                return Err(Error::InvalidResponse(
                    "cursor reports more results but carries no id".to_string(),
                ))
            }
            // the server has already released a completed cursor
            (false, _) => None,
        };

        Ok(Self {
            transport,
            handle,
            batch: response.result.into(),
            has_more: response.has_more,
            total_count: response.count,
        })
    }

    /// Build a cursor from the raw body of a query-issuing request
    pub fn from_value(transport: Arc<dyn Transport>, value: Value) -> Result<Self> {
        let response: CursorResponse = serde_json::from_value(value)?;
        Self::new(transport, response)
    }

    /// Total number of rows in the result set.
    ///
    /// Only known when the query was issued with `count` requested.
    pub fn length(&self) -> Result<u64> {
        self.total_count.ok_or(Error::UnavailableCount)
    }

    pub fn handle(&self) -> Option<&CursorHandle> {
        self.handle.as_ref()
    }

    /// Rows buffered locally and not yet handed out
    pub fn buffered(&self) -> usize {
        self.batch.len()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_exhausted(&self) -> bool {
        self.batch.is_empty() && !self.has_more
    }

    /// Next row, or `None` once the result set is exhausted
    pub async fn next(&mut self) -> Result<Option<Value>> {
        if let Some(row) = self.batch.pop_front() {
            return Ok(Some(row));
        }

        if !self.has_more {
            return Ok(None);
        }

        self.fetch_next_batch().await?;
        Ok(self.batch.pop_front())
    }

    #[tracing::instrument(skip(self), fields(cursor = ?self.handle))]
    async fn fetch_next_batch(&mut self) -> Result<()> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            Error::InvalidResponse("cursor has more results but no handle".to_string())
        })?;

        let value = self.transport.send(request::next_batch(handle)).await?;
        let response: CursorResponse = serde_json::from_value(value)?;

        if response.has_more && response.result.is_empty() {
            return Err(Error::InvalidResponse(
                "server returned an empty batch but reports more results".to_string(),
            ));
        }

        tracing::debug!(
            rows = response.result.len(),
            has_more = response.has_more,
            "Fetched next cursor batch"
        );

        if !response.has_more {
            self.handle = None;
        }
        self.batch = response.result.into();
        self.has_more = response.has_more;

        Ok(())
    }

    /// Drain every remaining row
    pub async fn try_collect(mut self) -> Result<Vec<Value>> {
        let mut rows = Vec::with_capacity(self.batch.len());
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Consume the cursor as a stream of rows.
    ///
    /// The stream ends after the first error; use [`Cursor::next`] directly
    /// to retry a failed fetch.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value>> + Send {
        stream::try_unfold(self, |mut cursor| async move {
            Ok(cursor.next().await?.map(|row| (row, cursor)))
        })
    }

    /// Release the server-side cursor before it is exhausted.
    ///
    /// Does nothing when the server has already released it. A cursor
    /// dropped without `dispose` is left for the server to expire.
    pub async fn dispose(self) -> Result<()> {
        if let Some(handle) = self.handle {
            tracing::debug!(cursor = handle.as_str(), "Disposing cursor");
            self.transport.send(request::delete_cursor(&handle)).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("handle", &self.handle)
            .field("buffered", &self.batch.len())
            .field("has_more", &self.has_more)
            .field("total_count", &self.total_count)
            .finish()
    }
}
