//! Local stand-in for the analytics backend.
//!
//! Serves randomized comparison data on the same routes the client calls,
//! so the tool can be exercised without a populated issue tracker.

pub mod data;

use crate::models::MetricKind;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shared mock server state.
#[derive(Clone)]
pub struct MockState {
    rng: Arc<Mutex<StdRng>>,
}

impl MockState {
    /// Seeded state gives reproducible responses.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    key: Option<String>,
}

#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    message: String,
}

impl MockError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/v1/compare/:metric", get(compare))
        .with_state(state)
}

async fn compare(
    State(state): State<MockState>,
    Path(metric): Path<String>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Value>, MockError> {
    let kind = MetricKind::ALL
        .into_iter()
        .find(|kind| kind.slug() == metric)
        .ok_or_else(|| MockError::not_found(format!("unknown metric '{}'", metric)))?;

    let projects = parse_keys(query.key.as_deref());
    if projects.is_empty() {
        return Err(MockError::bad_request("missing ?key=KEY1,KEY2,..."));
    }

    debug!("Mock {} for {}", kind, projects.join(","));

    let mut rng = state.rng.lock().await;
    Ok(Json(data::generate(kind, &projects, &mut *rng)))
}

fn parse_keys(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

/// Run the mock backend until Ctrl-C.
pub async fn serve(addr: SocketAddr, seed: Option<u64>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind mock backend to {}", addr))?;
    let local = listener.local_addr()?;

    info!("Mock backend listening on http://{}", local);
    println!("🧪 Mock backend listening on http://{}", local);
    println!("   Press Ctrl-C to stop.");

    axum::serve(listener, router(MockState::new(seed)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Mock backend failed")?;

    info!("Mock backend stopped");
    Ok(())
}

/// Start the mock backend in the background; bind port 0 for a free port.
pub async fn spawn(addr: SocketAddr, seed: Option<u64>) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind mock backend to {}", addr))?;
    let local = listener.local_addr()?;
    let app = router(MockState::new(seed));

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("Mock backend stopped: {}", e);
        }
    });

    Ok((local, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn start() -> String {
        let (addr, _) = spawn("127.0.0.1:0".parse().unwrap(), Some(1))
            .await
            .unwrap();
        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_keys(Some("A, B,,C ")), vec!["A", "B", "C"]);
        assert!(parse_keys(Some(" , ")).is_empty());
        assert!(parse_keys(None).is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_bad_request() {
        let base = start().await;
        let response = reqwest::get(format!("{}/api/v1/compare/priority", base))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], json!("missing ?key=KEY1,KEY2,..."));
    }

    #[tokio::test]
    async fn test_unknown_metric_is_not_found() {
        let base = start().await;
        let response = reqwest::get(format!("{}/api/v1/compare/velocity?key=A,B", base))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_keys_in_request_order() {
        let base = start().await;
        let body: Value = reqwest::get(format!("{}/api/v1/compare/status-distribution?key=BETA,ALPHA", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["BETA", "ALPHA"]);
    }
}
