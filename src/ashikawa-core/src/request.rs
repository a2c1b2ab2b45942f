//! Request building
//!
//! Translates operation parameters into the request bodies and endpoints the
//! server expects. Optional parameters that are not set never appear in a
//! body.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cursor::CursorHandle;
use crate::models::IndexType;
use crate::transport::Request;
use crate::Result;

/// `limit` / `skip` shared by every simple query returning a cursor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paging {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
}

pub trait Paged: Sized {
    fn paging_mut(&mut self) -> &mut Paging;

    fn limit(mut self, limit: u64) -> Self {
        self.paging_mut().limit = Some(limit);
        self
    }

    fn skip(mut self, skip: u64) -> Self {
        self.paging_mut().skip = Some(skip);
        self
    }
}

/// A query against the `/simple` endpoints of a single collection
pub trait SimpleQuery: Serialize {
    const ENDPOINT: &'static str;
}

/// Every document of a collection
#[derive(Debug, Clone, Default, Serialize)]
pub struct All {
    #[serde(flatten)]
    pub paging: Paging,
}

impl All {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Documents matching all attributes of an example document
#[derive(Debug, Clone, Serialize)]
pub struct ByExample {
    pub example: Value,
    #[serde(flatten)]
    pub paging: Paging,
}

impl ByExample {
    pub fn new(example: Value) -> Self {
        Self {
            example,
            paging: Paging::default(),
        }
    }
}

/// The first document matching an example
#[derive(Debug, Clone, Serialize)]
pub struct FirstExample {
    pub example: Value,
}

impl FirstExample {
    pub fn new(example: Value) -> Self {
        Self { example }
    }
}

/// Documents closest to a coordinate, using a geo index
#[derive(Debug, Clone, Serialize)]
pub struct Near {
    pub latitude: f64,
    pub longitude: f64,
    /// Attribute name under which the server returns the distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    /// Identifier of the geo index to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(flatten)]
    pub paging: Paging,
}

impl Near {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            distance: None,
            geo: None,
            paging: Paging::default(),
        }
    }

    pub fn distance(mut self, attribute: impl Into<String>) -> Self {
        self.distance = Some(attribute.into());
        self
    }

    pub fn geo(mut self, index_id: impl Into<String>) -> Self {
        self.geo = Some(index_id.into());
        self
    }
}

/// Documents within `radius` meters of a coordinate
#[derive(Debug, Clone, Serialize)]
pub struct Within {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(flatten)]
    pub paging: Paging,
}

impl Within {
    pub fn new(latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius,
            distance: None,
            geo: None,
            paging: Paging::default(),
        }
    }

    pub fn distance(mut self, attribute: impl Into<String>) -> Self {
        self.distance = Some(attribute.into());
        self
    }

    pub fn geo(mut self, index_id: impl Into<String>) -> Self {
        self.geo = Some(index_id.into());
        self
    }
}

/// Documents whose attribute lies between `left` and `right`, using a
/// skiplist index
#[derive(Debug, Clone, Serialize)]
pub struct InRange {
    pub attribute: String,
    pub left: Value,
    pub right: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(flatten)]
    pub paging: Paging,
}

impl InRange {
    pub fn new(attribute: impl Into<String>, left: impl Into<Value>, right: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            left: left.into(),
            right: right.into(),
            closed: None,
            paging: Paging::default(),
        }
    }

    /// Include `right` in the range
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = Some(closed);
        self
    }
}

impl SimpleQuery for All {
    const ENDPOINT: &'static str = "/simple/all";
}

impl SimpleQuery for ByExample {
    const ENDPOINT: &'static str = "/simple/by-example";
}

impl SimpleQuery for FirstExample {
    const ENDPOINT: &'static str = "/simple/first-example";
}

impl SimpleQuery for Near {
    const ENDPOINT: &'static str = "/simple/near";
}

impl SimpleQuery for Within {
    const ENDPOINT: &'static str = "/simple/within";
}

impl SimpleQuery for InRange {
    const ENDPOINT: &'static str = "/simple/range";
}

impl Paged for All {
    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

impl Paged for ByExample {
    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

impl Paged for Near {
    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

impl Paged for Within {
    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

impl Paged for InRange {
    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// `PUT /simple/...` with `{collection}` merged with the query's parameters
pub fn simple_query<Q: SimpleQuery>(collection: &str, query: &Q) -> Result<Request> {
    let mut body = Map::new();
    body.insert("collection".to_string(), Value::String(collection.to_string()));

    match serde_json::to_value(query)? {
        Value::Object(params) => body.extend(params),
        other => {
            let err: serde_json::Error = serde::ser::Error::custom(format!(
                "simple query must serialize to an object, got {}",
                other
            ));
            return Err(err.into());
        }
    }

    Ok(Request::put(Q::ENDPOINT, Value::Object(body)))
}

/// Options of an ad hoc AQL query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    #[serde(rename = "batchSize", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    /// Ask the server for the total row count; the only way
    /// [`crate::Cursor::length`] becomes available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    #[serde(rename = "bindVars", skip_serializing_if = "Option::is_none")]
    pub bind_vars: Option<Map<String, Value>>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind_vars
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }
}

#[derive(Serialize)]
struct AqlRequest<'a> {
    query: &'a str,
    #[serde(flatten)]
    options: &'a QueryOptions,
}

/// `POST /cursor` creating a server-side cursor for an AQL query
pub fn aql_query(query: &str, options: &QueryOptions) -> Result<Request> {
    let body = serde_json::to_value(AqlRequest { query, options })?;
    Ok(Request::post("/cursor", body))
}

/// `PUT /cursor/{id}` fetching the next batch
pub fn next_batch(handle: &CursorHandle) -> Request {
    Request::put(format!("/cursor/{}", handle.as_str()), Value::Object(Map::new()))
}

/// `DELETE /cursor/{id}` releasing a server-side cursor early
pub fn delete_cursor(handle: &CursorHandle) -> Request {
    Request::delete(format!("/cursor/{}", handle.as_str()))
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexRequest {
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Attribute names in key order
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl IndexRequest {
    pub fn new<I, S>(index_type: IndexType, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_type,
            fields: fields.into_iter().map(Into::into).collect(),
            unique: None,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }
}

/// `POST /index?collection={id}`
pub fn create_index(collection_id: u64, index: &IndexRequest) -> Result<Request> {
    Ok(Request::post(
        format!("/index?collection={}", collection_id),
        serde_json::to_value(index)?,
    ))
}
