//! In-process stand-in for the query execution backend
//!
//! Serves `POST /dynamic/fetch` and `GET /dynamic/download` on an
//! ephemeral local port and records every request body it sees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const EXPORT_FILE: &str = "exports/out.csv";
pub const EXPORT_BYTES: &[u8] = b"id,name,salary\n1,John 1,50000\n";

#[derive(Default)]
pub struct Backend {
    requests: Mutex<Vec<Value>>,
    fail_browse: AtomicBool,
    export_without_file: AtomicBool,
}

impl Backend {
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Value {
        self.requests().pop().expect("no request recorded")
    }

    pub fn fail_browse(&self, fail: bool) {
        self.fail_browse.store(fail, Ordering::SeqCst);
    }

    pub fn export_without_file(&self, on: bool) {
        self.export_without_file.store(on, Ordering::SeqCst);
    }
}

/// Start a backend; returns it with its base URL
pub async fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let router = Router::new()
        .route("/dynamic/fetch", post(fetch))
        .route("/dynamic/download", get(download))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (backend, format!("http://{}", addr))
}

async fn fetch(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.requests.lock().unwrap().push(body.clone());

    if body["export"] == true {
        if backend.export_without_file.load(Ordering::SeqCst) {
            return Json(json!({"message": "Export failed: disk full"})).into_response();
        }
        return Json(json!({"file": EXPORT_FILE, "message": "Export successful"})).into_response();
    }
    if backend.fail_browse.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "query failed").into_response();
    }
    if body["entity"] == "Broken" {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    if body["entity"] == "Empty" {
        return Json(json!({
            "content": [], "page": 0, "size": 10, "totalPages": 0, "totalElements": 0
        }))
        .into_response();
    }

    Json(json!({
        "content": [
            {"id": 1, "name": "John 1", "salary": 50000, "active": true},
            {"id": 2, "name": "John 2", "salary": null, "active": false}
        ],
        "page": body["page"],
        "size": body["size"],
        "totalPages": 3,
        "totalElements": 21
    }))
    .into_response()
}

async fn download(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("filePath").map(String::as_str) {
        Some(EXPORT_FILE) => (
            [
                (header::CONTENT_DISPOSITION, "attachment; filename=\"out.csv\"".to_string()),
                (header::CONTENT_TYPE, "text/csv".to_string()),
            ],
            EXPORT_BYTES,
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}
