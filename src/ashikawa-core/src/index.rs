use std::sync::Arc;

use crate::models::{IndexId, IndexResponse, IndexType};
use crate::transport::{Request, Transport};
use crate::Result;

/// Secondary index attached to a collection
pub struct Index {
    transport: Arc<dyn Transport>,
    id: IndexId,
    index_type: IndexType,
    fields: Vec<String>,
    unique: bool,
}

impl Index {
    pub fn from_response(transport: Arc<dyn Transport>, response: IndexResponse) -> Result<Self> {
        Ok(Self {
            transport,
            id: response.id.parse()?,
            index_type: response.index_type,
            fields: response.fields,
            unique: response.unique,
        })
    }

    pub fn id(&self) -> &IndexId {
        &self.id
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub async fn delete(self) -> Result<()> {
        let path = format!("/index/{}/{}", self.id.collection, self.id.index);
        self.transport.send(Request::delete(path)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("id", &self.id)
            .field("type", &self.index_type)
            .field("fields", &self.fields)
            .field("unique", &self.unique)
            .finish()
    }
}
