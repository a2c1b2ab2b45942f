//! In-process stand-in for the ArangoDB REST API
//!
//! Implements the endpoints the client uses, keeping collections, documents,
//! indices and open cursors in memory. AQL support covers
//! `FOR x IN coll [FILTER x.attr == <json>] RETURN x`.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use actix_web::dev::{Service, ServerHandle};
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Map, Value};

use ashikawa_rs::Config;

#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

struct StubCollection {
    id: u64,
    name: String,
    status: u64,
    wait_for_sync: bool,
    documents: Vec<Map<String, Value>>,
    indexes: Vec<Value>,
}

#[derive(Default)]
pub struct StubState {
    next_id: AtomicU64,
    collections: Mutex<Vec<StubCollection>>,
    cursors: Mutex<HashMap<String, VecDeque<Vec<Value>>>>,
    log: Mutex<Vec<LoggedRequest>>,
}

impl StubState {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1000
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests with `method` whose path starts with `prefix`
    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn open_cursors(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }

    fn open_cursor(&self, rows: Vec<Value>, batch_size: Option<u64>, count: Option<u64>) -> Value {
        let batch_size = batch_size.unwrap_or(1000).max(1) as usize;
        let mut batches: VecDeque<Vec<Value>> =
            rows.chunks(batch_size).map(|chunk| chunk.to_vec()).collect();
        let first = batches.pop_front().unwrap_or_default();

        let mut body = json!({
            "result": first,
            "hasMore": !batches.is_empty(),
            "error": false,
            "code": 201
        });
        if let Some(count) = count {
            body["count"] = json!(count);
        }
        if !batches.is_empty() {
            let id = uuid::Uuid::new_v4().simple().to_string();
            body["id"] = json!(id);
            self.cursors.lock().unwrap().insert(id, batches);
        }
        body
    }
}

pub struct StubServer {
    pub url: String,
    pub state: web::Data<StubState>,
    handle: ServerHandle,
}

impl StubServer {
    pub fn config(&self) -> Config {
        Config {
            url: self.url.clone(),
            ..Config::default()
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

pub async fn start() -> StubServer {
    let state = web::Data::new(StubState::default());
    let app_state = state.clone();

    let server = HttpServer::new(move || {
        let log_state = app_state.clone();
        App::new()
            .app_data(app_state.clone())
            .wrap_fn(move |req, srv| {
                log_state.log.lock().unwrap().push(LoggedRequest {
                    method: req.method().to_string(),
                    path: req.path().to_string(),
                    authorization: req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                });
                srv.call(req)
            })
            .service(web::scope("/_api").configure(routes))
    })
    .workers(1)
    .shutdown_timeout(1)
    .bind(("127.0.0.1", 0))
    .expect("bind stub server");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    StubServer {
        url: format!("http://{}", addr),
        state,
        handle,
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/collection", web::get().to(list_collections))
        .route("/collection", web::post().to(create_collection))
        .route("/collection/{id}", web::get().to(get_collection))
        .route("/collection/{id}", web::delete().to(delete_collection))
        .route("/collection/{id}/properties", web::get().to(get_properties))
        .route("/collection/{id}/properties", web::put().to(put_properties))
        .route("/collection/{id}/count", web::get().to(count))
        .route("/collection/{id}/figures", web::get().to(figures))
        .route("/collection/{id}/{action}", web::put().to(collection_action))
        .route("/document", web::post().to(create_document))
        .route("/document/{collection}/{key}", web::get().to(get_document))
        .route("/document/{collection}/{key}", web::put().to(replace_document))
        .route("/document/{collection}/{key}", web::delete().to(delete_document))
        .route("/index", web::post().to(create_index))
        .route("/index", web::get().to(list_indexes))
        .route("/index/{collection}/{index}", web::get().to(get_index))
        .route("/index/{collection}/{index}", web::delete().to(delete_index))
        .route("/simple/all", web::put().to(simple_all))
        .route("/simple/by-example", web::put().to(simple_by_example))
        .route("/simple/first-example", web::put().to(simple_first_example))
        .route("/cursor", web::post().to(create_cursor))
        .route("/cursor/{id}", web::put().to(next_batch))
        .route("/cursor/{id}", web::delete().to(delete_cursor));
}

fn error(status: u16, message: &str) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status).expect("valid status");
    HttpResponse::build(status).json(json!({
        "error": true,
        "code": status.as_u16(),
        "errorMessage": message
    }))
}

fn find<'a>(collections: &'a mut [StubCollection], key: &str) -> Option<&'a mut StubCollection> {
    collections
        .iter_mut()
        .find(|c| c.name == key || c.id.to_string() == key)
}

fn describe(collection: &StubCollection) -> Value {
    json!({
        "id": collection.id.to_string(),
        "name": collection.name,
        "status": collection.status,
        "waitForSync": collection.wait_for_sync,
        "error": false,
        "code": 200
    })
}

async fn list_collections(state: web::Data<StubState>) -> HttpResponse {
    let collections = state.collections.lock().unwrap();
    let list: Vec<Value> = collections.iter().map(describe).collect();
    HttpResponse::Ok().json(json!({ "collections": list }))
}

async fn create_collection(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let Some(name) = body["name"].as_str() else {
        return error(400, "expecting name");
    };

    let mut collections = state.collections.lock().unwrap();
    if collections.iter().any(|c| c.name == name) {
        return error(409, "duplicate name");
    }

    let collection = StubCollection {
        id: state.next_id(),
        name: name.to_string(),
        status: 3,
        wait_for_sync: false,
        documents: Vec::new(),
        indexes: Vec::new(),
    };
    let body = describe(&collection);
    collections.push(collection);
    HttpResponse::Ok().json(body)
}

async fn get_collection(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    match find(&mut collections, &path) {
        Some(collection) => HttpResponse::Ok().json(describe(collection)),
        None => error(404, "collection not found"),
    }
}

async fn delete_collection(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    let before = collections.len();
    collections.retain(|c| c.id.to_string() != *path);
    if collections.len() == before {
        return error(404, "collection not found");
    }
    HttpResponse::Ok().json(json!({ "id": path.into_inner(), "error": false }))
}

async fn get_properties(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    get_collection(state, path).await
}

async fn put_properties(
    state: web::Data<StubState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &path) else {
        return error(404, "collection not found");
    };
    if let Some(wait_for_sync) = body["waitForSync"].as_bool() {
        collection.wait_for_sync = wait_for_sync;
    }
    HttpResponse::Ok().json(describe(collection))
}

async fn count(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &path) else {
        return error(404, "collection not found");
    };
    let mut body = describe(collection);
    body["count"] = json!(collection.documents.len());
    HttpResponse::Ok().json(body)
}

async fn figures(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &path) else {
        return error(404, "collection not found");
    };
    let alive = collection.documents.len();
    let mut body = describe(collection);
    body["figures"] = json!({
        "datafiles": {"count": 1, "fileSize": 1048576},
        "alive": {"count": alive, "size": alive * 64},
        "dead": {"count": 0, "size": 0, "deletion": 0}
    });
    HttpResponse::Ok().json(body)
}

async fn collection_action(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (id, action) = path.into_inner();
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &id) else {
        return error(404, "collection not found");
    };

    match action.as_str() {
        "load" => collection.status = 3,
        "unload" => collection.status = 2,
        "truncate" => collection.documents.clear(),
        "rename" => match body["name"].as_str() {
            Some(name) => collection.name = name.to_string(),
            None => return error(400, "expecting name"),
        },
        _ => return error(404, "unknown action"),
    }
    HttpResponse::Ok().json(describe(collection))
}

async fn create_document(
    state: web::Data<StubState>,
    query: web::Query<HashMap<String, String>>,
    body: web::Json<Value>,
) -> HttpResponse {
    let Value::Object(fields) = body.into_inner() else {
        return error(400, "expecting object");
    };
    let key = state.next_id().to_string();
    let rev = state.next_id().to_string();

    let mut collections = state.collections.lock().unwrap();
    let collection_id = query.get("collection").cloned().unwrap_or_default();
    let Some(collection) = find(&mut collections, &collection_id) else {
        return error(404, "collection not found");
    };

    let id = format!("{}/{}", collection.id, key);
    let mut document = fields;
    document.insert("_id".to_string(), json!(id));
    document.insert("_key".to_string(), json!(key));
    document.insert("_rev".to_string(), json!(rev));
    collection.documents.push(document);

    HttpResponse::Created().json(json!({"_id": id, "_key": key, "_rev": rev, "error": false}))
}

fn find_document<'a>(
    collections: &'a mut [StubCollection],
    collection: &str,
    key: &str,
) -> Option<&'a mut Map<String, Value>> {
    find(collections, collection)?
        .documents
        .iter_mut()
        .find(|doc| doc.get("_key").and_then(Value::as_str) == Some(key))
}

async fn get_document(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (collection, key) = path.into_inner();
    let mut collections = state.collections.lock().unwrap();
    match find_document(&mut collections, &collection, &key) {
        Some(document) => HttpResponse::Ok().json(document.clone()),
        None => error(404, "document not found"),
    }
}

async fn replace_document(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (collection, key) = path.into_inner();
    let Value::Object(fields) = body.into_inner() else {
        return error(400, "expecting object");
    };
    let rev = state.next_id().to_string();

    let mut collections = state.collections.lock().unwrap();
    let Some(document) = find_document(&mut collections, &collection, &key) else {
        return error(404, "document not found");
    };

    let id = document["_id"].clone();
    *document = fields;
    document.insert("_id".to_string(), id.clone());
    document.insert("_key".to_string(), json!(key));
    document.insert("_rev".to_string(), json!(rev));

    HttpResponse::Accepted().json(json!({"_id": id, "_key": key, "_rev": rev, "error": false}))
}

async fn delete_document(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (collection, key) = path.into_inner();
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &collection) else {
        return error(404, "collection not found");
    };
    let before = collection.documents.len();
    collection
        .documents
        .retain(|doc| doc.get("_key").and_then(Value::as_str) != Some(key.as_str()));
    if collection.documents.len() == before {
        return error(404, "document not found");
    }
    HttpResponse::Ok().json(json!({"error": false}))
}

async fn create_index(
    state: web::Data<StubState>,
    query: web::Query<HashMap<String, String>>,
    body: web::Json<Value>,
) -> HttpResponse {
    let index_id = state.next_id();
    let mut collections = state.collections.lock().unwrap();
    let collection_id = query.get("collection").cloned().unwrap_or_default();
    let Some(collection) = find(&mut collections, &collection_id) else {
        return error(404, "collection not found");
    };

    let index = json!({
        "id": format!("{}/{}", collection.id, index_id),
        "type": body["type"],
        "fields": body["fields"],
        "unique": body["unique"].as_bool().unwrap_or(false),
    });
    collection.indexes.push(index.clone());

    let mut response = index;
    response["isNewlyCreated"] = json!(true);
    HttpResponse::Created().json(response)
}

async fn list_indexes(
    state: web::Data<StubState>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let mut collections = state.collections.lock().unwrap();
    let collection_id = query.get("collection").cloned().unwrap_or_default();
    let Some(collection) = find(&mut collections, &collection_id) else {
        return error(404, "collection not found");
    };

    let identifiers: Map<String, Value> = collection
        .indexes
        .iter()
        .map(|index| (index["id"].as_str().unwrap_or_default().to_string(), index.clone()))
        .collect();
    HttpResponse::Ok().json(json!({"indexes": collection.indexes, "identifiers": identifiers}))
}

async fn get_index(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (collection, index) = path.into_inner();
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &collection) else {
        return error(404, "collection not found");
    };
    let id = format!("{}/{}", collection.id, index);
    match collection.indexes.iter().find(|i| i["id"] == json!(id)) {
        Some(index) => HttpResponse::Ok().json(index),
        None => error(404, "index not found"),
    }
}

async fn delete_index(
    state: web::Data<StubState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (collection, index) = path.into_inner();
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = find(&mut collections, &collection) else {
        return error(404, "collection not found");
    };
    let id = format!("{}/{}", collection.id, index);
    let before = collection.indexes.len();
    collection.indexes.retain(|i| i["id"] != json!(id));
    if collection.indexes.len() == before {
        return error(404, "index not found");
    }
    HttpResponse::Ok().json(json!({"id": id, "error": false}))
}

fn page(rows: Vec<Value>, body: &Value) -> Vec<Value> {
    let skip = body["skip"].as_u64().unwrap_or(0) as usize;
    let limit = body["limit"].as_u64().map(|l| l as usize).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(limit).collect()
}

fn documents_of(state: &StubState, name: &str) -> Option<Vec<Value>> {
    let mut collections = state.collections.lock().unwrap();
    find(&mut collections, name).map(|collection| {
        collection
            .documents
            .iter()
            .cloned()
            .map(Value::Object)
            .collect()
    })
}

async fn simple_all(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let name = body["collection"].as_str().unwrap_or_default();
    let Some(rows) = documents_of(&state, name) else {
        return error(404, "collection not found");
    };
    let rows = page(rows, &body);
    let count = rows.len() as u64;
    HttpResponse::Created().json(state.open_cursor(rows, body["batchSize"].as_u64(), Some(count)))
}

async fn simple_by_example(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let name = body["collection"].as_str().unwrap_or_default();
    let Some(rows) = documents_of(&state, name) else {
        return error(404, "collection not found");
    };
    let Some(example) = body["example"].as_object() else {
        return error(400, "expecting example");
    };

    let matching = rows
        .into_iter()
        .filter(|doc| example.iter().all(|(k, v)| doc.get(k) == Some(v)))
        .collect();
    let rows = page(matching, &body);
    let count = rows.len() as u64;
    HttpResponse::Created().json(state.open_cursor(rows, body["batchSize"].as_u64(), Some(count)))
}

async fn simple_first_example(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let name = body["collection"].as_str().unwrap_or_default();
    let Some(rows) = documents_of(&state, name) else {
        return error(404, "collection not found");
    };
    let Some(example) = body["example"].as_object() else {
        return error(400, "expecting example");
    };

    match rows
        .into_iter()
        .find(|doc| example.iter().all(|(k, v)| doc.get(k) == Some(v)))
    {
        Some(document) => HttpResponse::Ok().json(json!({"document": document, "error": false})),
        None => error(404, "no match"),
    }
}

fn evaluate(state: &StubState, query: &str) -> Result<Vec<Value>, String> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    match tokens.as_slice() {
        ["FOR", var, "IN", name, "RETURN", ret] if ret == var => {
            documents_of(state, name).ok_or_else(|| format!("collection not found: {}", name))
        }
        ["FOR", var, "IN", name, "FILTER", attribute, "==", literal, "RETURN", ret]
            if ret == var =>
        {
            let prefix = format!("{}.", var);
            let attribute = attribute
                .strip_prefix(prefix.as_str())
                .ok_or_else(|| format!("unknown variable in {}", attribute))?;
            let expected: Value = serde_json::from_str(literal).map_err(|e| e.to_string())?;
            let rows =
                documents_of(state, name).ok_or_else(|| format!("collection not found: {}", name))?;
            Ok(rows
                .into_iter()
                .filter(|doc| doc.get(attribute) == Some(&expected))
                .collect())
        }
        _ => Err(format!("unsupported query: {}", query)),
    }
}

async fn create_cursor(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let Some(query) = body["query"].as_str() else {
        return error(400, "query is empty");
    };
    let rows = match evaluate(&state, query) {
        Ok(rows) => rows,
        Err(message) => return error(400, &message),
    };

    let count = body["count"]
        .as_bool()
        .unwrap_or(false)
        .then_some(rows.len() as u64);
    HttpResponse::Created().json(state.open_cursor(rows, body["batchSize"].as_u64(), count))
}

async fn next_batch(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    let mut cursors = state.cursors.lock().unwrap();
    let Some(batches) = cursors.get_mut(path.as_str()) else {
        return error(404, "cursor not found");
    };

    let batch = batches.pop_front().unwrap_or_default();
    let has_more = !batches.is_empty();
    let mut body = json!({"result": batch, "hasMore": has_more, "error": false, "code": 200});
    if has_more {
        body["id"] = json!(path.as_str());
    } else {
        cursors.remove(path.as_str());
    }
    HttpResponse::Ok().json(body)
}

async fn delete_cursor(state: web::Data<StubState>, path: web::Path<String>) -> HttpResponse {
    match state.cursors.lock().unwrap().remove(path.as_str()) {
        Some(_) => HttpResponse::Accepted().json(json!({"id": path.into_inner(), "error": false})),
        None => error(404, "cursor not found"),
    }
}
