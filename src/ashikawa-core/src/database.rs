use std::sync::Arc;

use serde_json::json;

use crate::collection::Collection;
use crate::cursor::Cursor;
use crate::models::CollectionList;
use crate::request::{self, QueryOptions};
use crate::transport::{Request, Transport};
use crate::Result;

/// Entry point to a database server
#[derive(Clone)]
pub struct Database {
    transport: Arc<dyn Transport>,
}

impl Database {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn collections(&self) -> Result<Vec<Collection>> {
        let value = self.transport.send(Request::get("/collection")).await?;
        let list: CollectionList = serde_json::from_value(value)?;
        Ok(list
            .collections
            .into_iter()
            .map(|response| Collection::new(self.transport.clone(), response))
            .collect())
    }

    /// Look up a collection by name, creating it if it does not exist
    #[tracing::instrument(skip(self))]
    pub async fn collection(&self, name: &str) -> Result<Collection> {
        match self
            .transport
            .send(Request::get(format!("/collection/{}", name)))
            .await
        {
            Ok(value) => Collection::from_value(self.transport.clone(), value),
            Err(err) if err.is_not_found() => {
                tracing::info!(collection = name, "Collection not found, creating it");
                self.create_collection(name).await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn create_collection(&self, name: &str) -> Result<Collection> {
        let value = self
            .transport
            .send(Request::post("/collection", json!({ "name": name })))
            .await?;
        Collection::from_value(self.transport.clone(), value)
    }

    /// Run an AQL query
    #[tracing::instrument(skip(self, options))]
    pub async fn query(&self, aql: &str, options: QueryOptions) -> Result<Cursor> {
        let value = self
            .transport
            .send(request::aql_query(aql, &options)?)
            .await?;
        Cursor::from_value(self.transport.clone(), value)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
