#![allow(dead_code)]

//! In-process mock of the catalog API.
//!
//! One server answers three deployments under different path prefixes:
//! `/api` is healthy, `/broken` returns 500 for everything and `/garbage`
//! returns 200 with a body that is not JSON.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use podcast_proto::config::{BaseUrls, Config};

pub const V2_TOKEN: &str = "Token test-secret";
pub const COVER_BYTES: &[u8] = b"\x89PNG fake cover";

#[derive(Clone, Default)]
pub struct MockState {
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    fn record(&self, uri: &Uri) {
        let line = uri
            .path_and_query()
            .map(|pq| pq.as_str().replace("%5B", "[").replace("%5D", "]"))
            .unwrap_or_default();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(line);
        }
    }

    /// Request lines (path plus query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }
}

pub struct MockCatalog {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/api/v1/stations", get(v1_stations))
            .route("/api/v1/stations/:id", get(v1_station))
            .route("/api/v1/podcasts", get(v1_podcasts))
            .route("/api/v1/podcasts/:id", get(v1_podcast))
            .route("/api/v1/episodes", get(v1_episodes))
            .route("/api/v2/stations", get(v2_stations))
            .route("/api/v2/stations/:id", get(v2_station))
            .route("/img/:name", get(image))
            .route("/art/:id/image.jpg", get(artwork))
            .route("/broken/*rest", get(broken))
            .route("/garbage/*rest", get(garbage))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock catalog");
        let addr = listener.local_addr().expect("mock catalog addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state }
    }

    pub fn url(&self, prefix: &str) -> String {
        format!("http://{}{}", self.addr, prefix)
    }

    /// Production is healthy, staging serves garbage, development is down.
    pub fn config(&self) -> Config {
        Config {
            api_base_url: self.url("/api"),
            base_urls: BaseUrls {
                development: self.url("/broken"),
                staging: self.url("/garbage"),
                production: self.url("/api"),
            },
            v2_auth_token: Some(V2_TOKEN.to_string()),
            ..Config::default()
        }
    }
}

fn station_attributes(id: u64) -> Option<Value> {
    match id {
        11 => Some(json!({
            "id": 11,
            "callsign": "KQED",
            "name": "KQED Public Radio",
            "square_logo_small": "https://img.example/kqed.png",
            "station_stream": [{"url": "https://stream.example/kqed.mp3"}],
        })),
        22 => Some(json!({
            "id": 22,
            "callsign": "WNYC",
            "name": "",
            "station_stream": [],
        })),
        _ => None,
    }
}

async fn v1_stations(State(state): State<MockState>, uri: Uri) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "data": [
            {"type": "stations", "attributes": station_attributes(11)},
            {"type": "stations", "attributes": station_attributes(22)},
            {"type": "stations", "attributes": {"name": "no callsign"}},
        ]
    }))
}

async fn v1_station(State(state): State<MockState>, uri: Uri, Path(id): Path<u64>) -> Response {
    state.record(&uri);
    match station_attributes(id) {
        Some(attributes) => Json(json!({"data": {"attributes": attributes}})).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn v1_podcasts(
    State(state): State<MockState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&uri);
    let data = match query.get("filter[station_id]").map(String::as_str) {
        Some("11") => json!([
            {"id": 501, "attributes": {"title": "Forum", "image": "https://img.example/forum.png"}},
            {"id": "502", "attributes": {"title": "The California Report"}},
            {"attributes": {"title": "missing id"}},
        ]),
        _ => json!([]),
    };
    Json(json!({ "data": data }))
}

async fn v1_podcast(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.record(&uri);
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match id {
        // Artwork served by this mock, under a shared file name.
        503 | 504 => {
            let image = format!("http://{}/art/{}/image.jpg", host, id);
            Json(json!({"data": {"id": id, "attributes": {"image": image}}})).into_response()
        }
        501 => Json(json!({"data": {"id": 501, "attributes": {"image": "https://img.example/forum.png"}}}))
            .into_response(),
        502 => Json(json!({"data": {"id": 502, "attributes": {"image": ""}}})).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn v1_episodes(
    State(state): State<MockState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&uri);
    let data = match query.get("filter[podcast_id]").map(String::as_str) {
        Some("501") => json!([
            {"id": 9001, "attributes": {
                "title": "Housing in the Bay",
                "published_date": "2024-03-01T10:00:00Z",
                "duration_seconds": 3125,
                "audio_url": "https://audio.example/9001.mp3",
            }},
            {"id": 9002, "attributes": {"title": "Water", "duration_seconds": "59"}},
        ]),
        _ => json!([]),
    };
    Json(json!({ "data": data }))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(V2_TOKEN)
}

async fn v2_stations(State(state): State<MockState>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "stations": [
            {"id": "v2-11", "callsign": "KQED"},
            {"id": "v2-33", "callsign": "KUOW"},
        ]
    }))
    .into_response()
}

async fn v2_station(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(&uri);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"station": {"id": id, "callsign": "KQED", "name": "KQED v2"}})).into_response()
}

async fn image(State(state): State<MockState>, uri: Uri, Path(name): Path<String>) -> Response {
    state.record(&uri);
    if name == "missing.png" {
        return StatusCode::NOT_FOUND.into_response();
    }
    COVER_BYTES.to_vec().into_response()
}

async fn artwork(State(state): State<MockState>, uri: Uri, Path(id): Path<u64>) -> String {
    state.record(&uri);
    format!("art-for-{}", id)
}

async fn broken(State(state): State<MockState>, uri: Uri) -> StatusCode {
    state.record(&uri);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn garbage(State(state): State<MockState>, uri: Uri) -> &'static str {
    state.record(&uri);
    "{\"data\": [oops"
}
