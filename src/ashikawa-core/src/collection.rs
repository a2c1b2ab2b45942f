use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cursor::Cursor;
use crate::document::{document_path, to_object, Document};
use crate::index::Index;
use crate::models::{
    CollectionResponse, CollectionStatus, CountResponse, DocumentHandleResponse, Figure,
    Figures, FiguresResponse, FirstExampleResponse, IndexList, IndexResponse, IndexType,
    PropertiesResponse,
};
use crate::request::{
    self, All, ByExample, FirstExample, InRange, IndexRequest, Near, SimpleQuery, Within,
};
use crate::transport::{Request, Transport};
use crate::Result;

/// Collection is a client-side view of a named server collection.
///
/// Only `id`, `name` and `status` are held locally. Properties, counts and
/// figures are read from the server on every call.
pub struct Collection {
    transport: Arc<dyn Transport>,
    id: u64,
    name: String,
    status: CollectionStatus,
}

impl Collection {
    pub fn new(transport: Arc<dyn Transport>, response: CollectionResponse) -> Self {
        Self {
            transport,
            id: response.id,
            name: response.name,
            status: CollectionStatus::from(response.status),
        }
    }

    pub fn from_value(transport: Arc<dyn Transport>, value: Value) -> Result<Self> {
        let response: CollectionResponse = serde_json::from_value(value)?;
        Ok(Self::new(transport, response))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status as of the last response describing this collection
    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    pub fn is_new_born(&self) -> bool {
        self.status == CollectionStatus::NewBorn
    }

    pub fn is_unloaded(&self) -> bool {
        self.status == CollectionStatus::Unloaded
    }

    pub fn is_loaded(&self) -> bool {
        self.status == CollectionStatus::Loaded
    }

    pub fn is_being_unloaded(&self) -> bool {
        self.status == CollectionStatus::BeingUnloaded
    }

    pub fn is_corrupted(&self) -> bool {
        self.status == CollectionStatus::Corrupted
    }

    fn path(&self, suffix: &str) -> String {
        format!("/collection/{}{}", self.id, suffix)
    }

    pub async fn wait_for_sync(&self) -> Result<bool> {
        let value = self.transport.send(Request::get(self.path("/properties"))).await?;
        let properties: PropertiesResponse = serde_json::from_value(value)?;
        Ok(properties.wait_for_sync)
    }

    pub async fn set_wait_for_sync(&self, wait_for_sync: bool) -> Result<()> {
        self.transport
            .send(Request::put(
                self.path("/properties"),
                json!({ "waitForSync": wait_for_sync }),
            ))
            .await?;
        Ok(())
    }

    /// Number of documents in the collection
    pub async fn length(&self) -> Result<u64> {
        let value = self.transport.send(Request::get(self.path("/count"))).await?;
        let count: CountResponse = serde_json::from_value(value)?;
        Ok(count.count)
    }

    pub async fn figures(&self) -> Result<Figures> {
        let value = self.transport.send(Request::get(self.path("/figures"))).await?;
        let response: FiguresResponse = serde_json::from_value(value)?;
        Ok(response.figures)
    }

    pub async fn figure(&self, figure: Figure) -> Result<u64> {
        Ok(self.figures().await?.get(figure))
    }

    /// Drop the collection on the server
    pub async fn delete(self) -> Result<()> {
        tracing::debug!(collection = %self.name, "Deleting collection");
        self.transport.send(Request::delete(self.path(""))).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<()> {
        self.transport
            .send(Request::put(self.path("/load"), json!({})))
            .await?;
        Ok(())
    }

    pub async fn unload(&self) -> Result<()> {
        self.transport
            .send(Request::put(self.path("/unload"), json!({})))
            .await?;
        Ok(())
    }

    /// Remove every document
    pub async fn truncate(&self) -> Result<()> {
        tracing::debug!(collection = %self.name, "Truncating collection");
        self.transport
            .send(Request::put(self.path("/truncate"), json!({})))
            .await?;
        Ok(())
    }

    /// Rename on the server, then locally
    pub async fn rename(&mut self, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        self.transport
            .send(Request::put(self.path("/rename"), json!({ "name": new_name })))
            .await?;
        self.name = new_name;
        Ok(())
    }

    pub async fn document(&self, key: impl fmt::Display) -> Result<Document> {
        let path = document_path(&self.id.to_string(), &key.to_string());
        let value = self.transport.send(Request::get(path)).await?;
        Document::from_value(self.transport.clone(), value)
    }

    /// Replace the document stored under `key`
    pub async fn replace<T: Serialize + ?Sized>(
        &self,
        key: impl fmt::Display,
        data: &T,
    ) -> Result<()> {
        let path = document_path(&self.id.to_string(), &key.to_string());
        let body = Value::Object(to_object(data)?);
        self.transport.send(Request::put(path, body)).await?;
        Ok(())
    }

    pub async fn create<T: Serialize + ?Sized>(&self, data: &T) -> Result<Document> {
        let fields = to_object(data)?;
        let value = self
            .transport
            .send(Request::post(
                format!("/document?collection={}", self.id),
                Value::Object(fields.clone()),
            ))
            .await?;
        let created: DocumentHandleResponse = serde_json::from_value(value)?;

        Ok(Document::new(
            self.transport.clone(),
            created.id.parse()?,
            created.rev,
            fields,
        ))
    }

    async fn cursor_query<Q: SimpleQuery>(&self, query: &Q) -> Result<Cursor> {
        let request = request::simple_query(&self.name, query)?;
        tracing::debug!(collection = %self.name, endpoint = Q::ENDPOINT, "Running simple query");
        let value = self.transport.send(request).await?;
        Cursor::from_value(self.transport.clone(), value)
    }

    pub async fn all(&self, query: All) -> Result<Cursor> {
        self.cursor_query(&query).await
    }

    pub async fn by_example(&self, query: ByExample) -> Result<Cursor> {
        self.cursor_query(&query).await
    }

    pub async fn first_example(&self, example: Value) -> Result<Document> {
        let request = request::simple_query(&self.name, &FirstExample::new(example))?;
        let value = self.transport.send(request).await?;
        let response: FirstExampleResponse = serde_json::from_value(value)?;
        Document::from_raw(self.transport.clone(), response.document)
    }

    pub async fn near(&self, query: Near) -> Result<Cursor> {
        self.cursor_query(&query).await
    }

    pub async fn within(&self, query: Within) -> Result<Cursor> {
        self.cursor_query(&query).await
    }

    pub async fn in_range(&self, query: InRange) -> Result<Cursor> {
        self.cursor_query(&query).await
    }

    /// Add an index over `fields`, in the given order
    pub async fn add_index<I, S>(&self, index_type: IndexType, fields: I) -> Result<Index>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.create_index(&IndexRequest::new(index_type, fields)).await
    }

    pub async fn create_index(&self, index: &IndexRequest) -> Result<Index> {
        let value = self
            .transport
            .send(request::create_index(self.id, index)?)
            .await?;
        let response: IndexResponse = serde_json::from_value(value)?;
        Index::from_response(self.transport.clone(), response)
    }

    pub async fn index(&self, index_id: impl fmt::Display) -> Result<Index> {
        let path = format!("/index/{}/{}", self.id, index_id);
        let value = self.transport.send(Request::get(path)).await?;
        let response: IndexResponse = serde_json::from_value(value)?;
        Index::from_response(self.transport.clone(), response)
    }

    pub async fn indices(&self) -> Result<Vec<Index>> {
        let value = self
            .transport
            .send(Request::get(format!("/index?collection={}", self.id)))
            .await?;
        let list: IndexList = serde_json::from_value(value)?;
        list.indexes
            .into_iter()
            .map(|response| Index::from_response(self.transport.clone(), response))
            .collect()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status)
            .finish()
    }
}
