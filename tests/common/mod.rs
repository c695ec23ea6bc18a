// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use run_progress::config::Config;
use run_progress::db::BronzeStore;
use run_progress::models::RawActivity;
use run_progress::services::{BronzeBatch, BronzeWriter};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a Strava-shaped activity.
#[allow(dead_code)]
pub fn strava_activity(id: i64, kind: &str, date: &str, distance: f64, moving_time: i64) -> Value {
    json!({
        "resource_state": 2,
        "athlete": {"id": 777, "resource_state": 1},
        "id": id,
        "name": format!("{} {}", kind, id),
        "type": kind,
        "sport_type": kind,
        "start_date": date,
        "start_date_local": date,
        "timezone": "(GMT+01:00) Europe/Oslo",
        "distance": distance,
        "moving_time": moving_time,
        "elapsed_time": moving_time + 45,
        "total_elevation_gain": 23.4,
        "average_speed": distance / moving_time as f64,
        "max_speed": 4.8,
        "has_heartrate": true,
        "map": {"id": format!("a{}", id), "summary_polyline": "u{~vFvyys@fS]"}
    })
}

#[allow(dead_code)]
pub fn raw(values: Vec<Value>) -> Vec<RawActivity> {
    serde_json::from_value(Value::Array(values)).expect("activities should deserialize")
}

#[allow(dead_code)]
pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// Config rooted in a temp dir with every directory created.
#[allow(dead_code)]
pub fn test_config(dir: &std::path::Path) -> Config {
    let config = Config::with_base_dir(dir);
    config.ensure_dirs().expect("Failed to create test directories");
    config
}

/// Write a bronze batch stamped with `when`.
#[allow(dead_code)]
pub fn write_bronze(config: &Config, when: DateTime<Utc>, activities: Vec<Value>) -> BronzeBatch {
    BronzeWriter::new(BronzeStore::new(&config.bronze_dir))
        .save_at(&raw(activities), when)
        .expect("Failed to write bronze batch")
}

// ─────────────────────────────────────────────────────────────────────────────
// Fake Strava API
// ─────────────────────────────────────────────────────────────────────────────

/// One request seen by the fake activities endpoint.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Default)]
#[allow(dead_code)]
pub struct FakeStravaState {
    /// Response body per page (1-based); pages past the end are empty.
    pub pages: Vec<Vec<Value>>,
    /// Page that answers with `failing_status`
    pub failing_page: Option<u32>,
    /// Status for `failing_page`; HTTP 500 when unset
    pub failing_status: Option<StatusCode>,
    /// Status returned by the token endpoint
    pub token_status: Option<StatusCode>,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub requests: Mutex<Vec<SeenRequest>>,
}

#[allow(dead_code)]
pub struct FakeStrava {
    pub state: Arc<FakeStravaState>,
    pub base_url: String,
}

#[allow(dead_code)]
impl FakeStrava {
    pub async fn start(state: FakeStravaState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/oauth/token", post(token))
            .route("/athlete/activities", get(activities))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }

    /// Config pointed at this server, with credentials and no page delay.
    pub fn config(&self, dir: &std::path::Path) -> Config {
        let mut config = test_config(dir);
        config.strava_api_url = self.base_url.clone();
        config.strava_token_url = format!("{}/oauth/token", self.base_url);
        config.strava_client_id = Some("client-id".to_string());
        config.strava_client_secret = Some("client-secret".to_string());
        config.strava_refresh_token = Some("refresh-token".to_string());
        config.page_delay = Duration::ZERO;
        config
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.token_forms.lock().unwrap().clone()
    }
}

#[allow(dead_code)]
async fn token(
    State(state): State<Arc<FakeStravaState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_forms.lock().unwrap().push(form);

    if let Some(status) = state.token_status {
        return (status, Json(json!({"message": "Authorization Error"}))).into_response();
    }
    Json(json!({
        "token_type": "Bearer",
        "access_token": "fake-access-token",
        "refresh_token": "refresh-token",
        "expires_at": 1_900_000_000
    }))
    .into_response()
}

#[allow(dead_code)]
async fn activities(
    State(state): State<Arc<FakeStravaState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    state.requests.lock().unwrap().push(SeenRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query,
    });

    if state.failing_page == Some(page) {
        let status = state
            .failing_status
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"message": "boom"}))).into_response();
    }

    let body = page
        .checked_sub(1)
        .and_then(|i| state.pages.get(i as usize))
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(body)).into_response()
}
