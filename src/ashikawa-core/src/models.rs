use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Collection status as reported by the server's numeric status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    NewBorn,
    Unloaded,
    Loaded,
    BeingUnloaded,
    Corrupted,
    Unknown(u64),
}

impl From<u64> for CollectionStatus {
    fn from(code: u64) -> Self {
        match code {
            1 => CollectionStatus::NewBorn,
            2 => CollectionStatus::Unloaded,
            3 => CollectionStatus::Loaded,
            4 => CollectionStatus::BeingUnloaded,
            6 => CollectionStatus::Corrupted,
            other => CollectionStatus::Unknown(other),
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionStatus::NewBorn => f.write_str("new born"),
            CollectionStatus::Unloaded => f.write_str("unloaded"),
            CollectionStatus::Loaded => f.write_str("loaded"),
            CollectionStatus::BeingUnloaded => f.write_str("being unloaded"),
            CollectionStatus::Corrupted => f.write_str("corrupted"),
            CollectionStatus::Unknown(code) => write!(f, "unknown ({})", code),
        }
    }
}

/// CollectionResponse is the server's description of a collection
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionResponse {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub status: u64,
}

#[derive(Debug, Deserialize)]
pub struct CollectionList {
    pub collections: Vec<CollectionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct PropertiesResponse {
    #[serde(rename = "waitForSync")]
    pub wait_for_sync: bool,
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct FiguresResponse {
    pub figures: Figures,
}

/// Storage statistics of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figures {
    #[serde(default)]
    pub datafiles: DatafileFigures,
    #[serde(default)]
    pub alive: ObjectFigures,
    #[serde(default)]
    pub dead: ObjectFigures,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatafileFigures {
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectFigures {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub size: u64,
}

/// A single figure of [`Figures`], named `{group}_{stat}` on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    DatafilesCount,
    AliveSize,
    AliveCount,
    DeadSize,
    DeadCount,
}

impl Figures {
    pub fn get(&self, figure: Figure) -> u64 {
        match figure {
            Figure::DatafilesCount => self.datafiles.count,
            Figure::AliveSize => self.alive.size,
            Figure::AliveCount => self.alive.count,
            Figure::DeadSize => self.dead.size,
            Figure::DeadCount => self.dead.count,
        }
    }
}

impl FromStr for Figure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "datafiles_count" => Ok(Figure::DatafilesCount),
            "alive_size" => Ok(Figure::AliveSize),
            "alive_count" => Ok(Figure::AliveCount),
            "dead_size" => Ok(Figure::DeadSize),
            "dead_count" => Ok(Figure::DeadCount),
            other => Err(Error::InvalidResponse(format!("unknown figure: {}", other))),
        }
    }
}

/// Identity of a stored document, `{collection}/{key}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    pub collection: String,
    pub key: String,
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, key) = split_compound_id(s)?;
        Ok(Self {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// Identity of an index, `{collection}/{index}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexId {
    pub collection: String,
    pub index: String,
}

impl FromStr for IndexId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, index) = split_compound_id(s)?;
        Ok(Self {
            collection: collection.to_string(),
            index: index.to_string(),
        })
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.index)
    }
}

fn split_compound_id(s: &str) -> Result<(&str, &str), Error> {
    match s.split_once('/') {
        Some((left, right)) if !left.is_empty() && !right.is_empty() && !right.contains('/') => {
            Ok((left, right))
        }
        _ => Err(Error::InvalidResponse(format!("malformed compound id: {:?}", s))),
    }
}

/// RawDocument is a document as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, deserialize_with = "lenient_opt_string")]
    pub rev: Option<String>,
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response to a document create or replace
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentHandleResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, deserialize_with = "lenient_opt_string")]
    pub rev: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FirstExampleResponse {
    pub document: RawDocument,
}

/// Index kinds known to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Primary,
    Edge,
    Hash,
    Skiplist,
    Geo,
    Fulltext,
    Cap,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexType::Primary => "primary",
            IndexType::Edge => "edge",
            IndexType::Hash => "hash",
            IndexType::Skiplist => "skiplist",
            IndexType::Geo => "geo",
            IndexType::Fulltext => "fulltext",
            IndexType::Cap => "cap",
            IndexType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub index_type: IndexType,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Deserialize)]
pub struct IndexList {
    pub indexes: Vec<IndexResponse>,
}

/// CursorResponse is one batch of a query result
#[derive(Debug, Clone, Deserialize)]
pub struct CursorResponse {
    pub result: Vec<Value>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// The server sends some numeric fields as strings (`"4590"`, `"3"`)
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}
