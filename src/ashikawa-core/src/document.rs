use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{DocumentHandleResponse, DocumentId, RawDocument};
use crate::transport::{Request, Transport};
use crate::Result;

/// Document is a stored record with its server-assigned identity
pub struct Document {
    transport: Arc<dyn Transport>,
    id: DocumentId,
    revision: Option<String>,
    fields: Map<String, Value>,
}

impl Document {
    pub fn new(
        transport: Arc<dyn Transport>,
        id: DocumentId,
        revision: Option<String>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            transport,
            id,
            revision,
            fields,
        }
    }

    pub fn from_raw(transport: Arc<dyn Transport>, raw: RawDocument) -> Result<Self> {
        Ok(Self::new(transport, raw.id.parse()?, raw.rev, raw.fields))
    }

    pub fn from_value(transport: Arc<dyn Transport>, value: Value) -> Result<Self> {
        let raw: RawDocument = serde_json::from_value(value)?;
        Self::from_raw(transport, raw)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.id.key
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field locally; call [`Document::save`] to store it
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Decode the fields into a typed value
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    fn path(&self) -> String {
        document_path(&self.id.collection, &self.id.key)
    }

    /// Replace the stored document with the local fields
    pub async fn save(&mut self) -> Result<()> {
        let value = self
            .transport
            .send(Request::put(self.path(), Value::Object(self.fields.clone())))
            .await?;
        let response: DocumentHandleResponse = serde_json::from_value(value)?;
        self.revision = response.rev;
        Ok(())
    }

    /// Re-read the document from the server
    pub async fn refresh(&mut self) -> Result<()> {
        let value = self.transport.send(Request::get(self.path())).await?;
        let raw: RawDocument = serde_json::from_value(value)?;
        self.revision = raw.rev;
        self.fields = raw.fields;
        Ok(())
    }

    pub async fn delete(self) -> Result<()> {
        self.transport.send(Request::delete(self.path())).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("revision", &self.revision)
            .field("fields", &self.fields)
            .finish()
    }
}

pub(crate) fn document_path(collection: &str, key: &str) -> String {
    format!("/document/{}/{}", collection, key)
}

/// Serialize caller data into a document body
pub(crate) fn to_object<T: Serialize + ?Sized>(data: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(data)? {
        Value::Object(fields) => Ok(fields),
        other => {
            let err: serde_json::Error = serde::ser::Error::custom(format!(
                "document must serialize to an object, got {}",
                other
            ));
            Err(err.into())
        }
    }
}
