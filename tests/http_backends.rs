//! Integration tests for the HTTP backends.
//!
//! Both services are stood up as in-process axum routers on ephemeral ports,
//! and the stores are driven through the real transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use dataset_discovery::clients::{HttpChatBackend, HttpSearchBackend, HttpTransport};
use dataset_discovery::models::{ChatRole, SearchMode, ASSISTANT_UNAVAILABLE_MESSAGE};
use dataset_discovery::persistence::MemoryStore;
use dataset_discovery::{Config, DiscoveryApp};

#[derive(Default)]
struct MockBackends {
    search_bodies: Mutex<Vec<Value>>,
    chat_bodies: Mutex<Vec<Value>>,
    detail_calls: AtomicUsize,
    process_calls: AtomicUsize,
}

async fn semantic_search(
    State(mock): State<Arc<MockBackends>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.search_bodies.lock().unwrap().push(body);
    Json(json!({
        "results": [
            { "identifier": "ds-1", "title": "Rainfall 1990-2020", "description": "Monthly totals", "score": 0.92 },
            { "identifier": "ds-2", "title": "River flow", "description": "Daily means", "score": 0.81 }
        ],
        "total_count": 95
    }))
}

async fn keyword_search(Query(params): Query<std::collections::HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!([
        { "fileIdentifier": "kw-1", "title": q, "description": "exact title" },
        { "fileIdentifier": "kw-2", "title": "Something else" }
    ]))
}

async fn dataset_details(
    State(mock): State<Arc<MockBackends>>,
    Path(identifier): Path<String>,
) -> impl IntoResponse {
    mock.detail_calls.fetch_add(1, Ordering::SeqCst);
    if identifier == "sparse" {
        return Json(json!({
            "datasetMetadata": { "fileIdentifier": "sparse", "title": "Sparse dataset", "createdAt": null },
            "geospatialData": null,
            "dataFiles": null,
            "supportingDocuments": null
        }))
        .into_response();
    }
    if identifier == "known" || identifier == "tiles/2024 #3" {
        (
            StatusCode::OK,
            Json(json!({
                "datasetMetadata": { "fileIdentifier": "known", "title": "Known dataset" },
                "dataFiles": [{ "dataFileID": 1, "fileType": "csv" }]
            })),
        )
            .into_response()
    } else {
        (StatusCode::NOT_FOUND, "").into_response()
    }
}

async fn stats() -> Json<Value> {
    Json(json!({ "totalDatasets": 1204, "totalProviders": 17 }))
}

async fn process_all(State(mock): State<Arc<MockBackends>>) -> impl IntoResponse {
    mock.process_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("ETL worker offline")))
}

async fn process_one(
    State(mock): State<Arc<MockBackends>>,
    Path(identifier): Path<String>,
) -> Json<Value> {
    mock.process_calls.fetch_add(1, Ordering::SeqCst);
    if identifier == "quiet" {
        return Json(json!({ "isSuccess": true, "message": null, "filePath": null }));
    }
    Json(json!({ "isSuccess": true, "message": format!("Queued {}", identifier) }))
}

async fn agent_chat(State(mock): State<Arc<MockBackends>>, Json(body): Json<Value>) -> impl IntoResponse {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    mock.chat_bodies.lock().unwrap().push(body);
    if message == "slow" {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    Json(json!({
        "answer": format!("You asked: {}", message),
        "suggested_query": "rainfall",
        "related_identifiers": ["ds-1"]
    }))
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn start(timeout: Duration) -> (DiscoveryApp, Arc<MockBackends>) {
    let mock = Arc::new(MockBackends::default());

    let data_api = Router::new()
        .route("/api/Search", get(keyword_search))
        .route("/api/Search/stats", get(stats))
        .route("/api/Search/details/:identifier", get(dataset_details))
        .route("/api/Etl/process-all", post(process_all))
        .route("/api/Etl/process/:identifier", post(process_one))
        .with_state(mock.clone());
    let ai_service = Router::new()
        .route("/search/semantic", post(semantic_search))
        .route("/agent/chat", post(agent_chat))
        .with_state(mock.clone());

    let data_url = spawn(data_api).await;
    let ai_url = spawn(ai_service).await;

    let config = Config {
        data_api_url: data_url.clone(),
        ai_api_url: ai_url.clone(),
        search_page_size: 10,
        ..Config::default()
    };
    let data_transport = HttpTransport::new(&data_url, timeout).unwrap();
    let ai_transport = HttpTransport::new(&ai_url, timeout).unwrap();

    let app = DiscoveryApp::new(
        config,
        Arc::new(HttpSearchBackend::new(data_transport, ai_transport.clone())),
        Arc::new(HttpChatBackend::new(ai_transport)),
        Arc::new(MemoryStore::new()),
    );
    (app, mock)
}

#[tokio::test]
async fn test_semantic_search_sends_offset_and_maps_results() {
    let (app, mock) = start(Duration::from_secs(5)).await;

    app.search.perform_search(Some("rainfall"), Some(3)).await;

    let state = app.search.snapshot();
    assert!(state.error.is_none());
    assert_eq!(state.results.len(), 2);
    assert_eq!(state.results[0].identifier, "ds-1");
    assert_eq!(state.total_count, 95);
    assert_eq!(state.total_pages, 10);
    assert_eq!(state.current_page, 3);
    assert_eq!(app.search.result_count_label(), "95 results");

    let bodies = mock.search_bodies.lock().unwrap().clone();
    assert_eq!(bodies[0]["query"], "rainfall");
    assert_eq!(bodies[0]["limit"], 10);
    assert_eq!(bodies[0]["offset"], 20);
}

#[tokio::test]
async fn test_keyword_mode_uses_data_api() {
    let (app, mock) = start(Duration::from_secs(5)).await;
    app.search.set_mode(SearchMode::Keyword);

    app.search.perform_search(Some("Ocean heat"), Some(1)).await;

    let state = app.search.snapshot();
    assert_eq!(state.total_count, 2);
    assert_eq!(state.results[0].identifier, "kw-1");
    assert_eq!(state.results[0].title, "Ocean heat");
    assert!(mock.search_bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dataset_details_cache_and_not_found() {
    let (app, mock) = start(Duration::from_secs(5)).await;

    let first = app.datasets.fetch_dataset("known").await.unwrap();
    let second = app.datasets.fetch_dataset("known").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.title(), "Known dataset");
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 1);

    assert!(app.datasets.fetch_dataset("missing").await.is_none());
    let state = app.datasets.snapshot();
    assert_eq!(state.error.as_deref(), Some("Dataset not found"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_stats_and_processing_messages() {
    let (app, mock) = start(Duration::from_secs(5)).await;

    app.datasets.fetch_stats().await;
    let stats = app.datasets.snapshot().stats.unwrap();
    assert_eq!(stats.total_datasets, 1204);
    assert_eq!(stats.total_providers, 17);

    app.datasets.process_all().await;
    assert_eq!(
        app.datasets.snapshot().process_message.as_deref(),
        Some("ETL worker offline")
    );

    app.datasets.process_identifier("abc").await;
    assert_eq!(app.datasets.snapshot().process_message.as_deref(), Some("Queued abc"));

    app.datasets.process_identifier("").await;
    assert_eq!(
        app.datasets.snapshot().validation_message.as_deref(),
        Some("Identifier is required.")
    );
    assert_eq!(mock.process_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_chat_roundtrip_sends_history() {
    let (app, mock) = start(Duration::from_secs(5)).await;
    app.chat.initialize_chat();

    app.chat.send_message("where is rainfall data").await;

    let state = app.chat.snapshot();
    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.messages[2].content, "You asked: where is rainfall data");
    assert_eq!(state.suggested_query.as_deref(), Some("rainfall"));

    let bodies = mock.chat_bodies.lock().unwrap().clone();
    let history = bodies[0]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "assistant");
    assert_eq!(history[1]["role"], "user");
    assert_eq!(history[1]["content"], "where is rainfall data");
}

#[tokio::test]
async fn test_chat_timeout_appends_fallback() {
    let (app, _mock) = start(Duration::from_millis(300)).await;

    app.chat.send_message("slow").await;

    let state = app.chat.snapshot();
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1].role, ChatRole::Assistant);
    assert_eq!(state.messages[1].content, ASSISTANT_UNAVAILABLE_MESSAGE);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_null_fields_fall_back_to_defaults() {
    let (app, _mock) = start(Duration::from_secs(5)).await;

    app.datasets.process_identifier("quiet").await;
    assert_eq!(
        app.datasets.snapshot().process_message.as_deref(),
        Some("Processing started for quiet.")
    );

    let detail = app.datasets.fetch_dataset("sparse").await.unwrap();
    assert_eq!(detail.title(), "Sparse dataset");
    assert!(detail.data_files.is_empty());
    assert!(app.datasets.get_dataset_by_id("sparse").is_some());
    assert!(app.datasets.snapshot().error.is_none());
}

#[tokio::test]
async fn test_identifiers_are_percent_encoded_in_paths() {
    let (app, mock) = start(Duration::from_secs(5)).await;

    app.datasets.process_identifier("tiles/2024 #3").await;
    assert_eq!(
        app.datasets.snapshot().process_message.as_deref(),
        Some("Queued tiles/2024 #3")
    );

    let detail = app.datasets.fetch_dataset("tiles/2024 #3").await;
    assert!(detail.is_some());
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 1);
}
