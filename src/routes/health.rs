/**
 * Health Routes
 * Endpoints for checking backend health status
 */
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

// Track server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime origin to process start rather than the first probe.
pub fn init_start_time() {
    Lazy::force(&SERVER_START);
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detailed health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub version: String,
    pub environment: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: ServiceCheck,
}

/// Ready check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

async fn check_store(state: &AppState) -> ServiceCheck {
    let backend = state.stores.ping.backend().to_string();
    match state.stores.ping.ping().await {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            backend,
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            backend,
            response_time: None,
            error: Some(e.to_string()),
        },
    }
}

/// GET /health - Simple health ping
pub async fn health_ping() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed - Uptime plus a store round trip
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let store = check_store(&state).await;
    // The process is up even when the store is not; report degraded.
    let status = if store.status == "healthy" { "ok" } else { "degraded" };

    Json(DetailedHealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        checks: HealthChecks { store },
    })
}

/// GET /health/ready - Ready only when the store answers
pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store = check_store(&state).await;
    let ready = store.status == "healthy";

    let response = ReadyResponse {
        status: if ready { "ready" } else { "not ready" }.to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        reason: store.error,
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::{StoreError, StorePing, Stores};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct DownPing;

    #[async_trait]
    impl StorePing for DownPing {
        async fn ping(&self) -> Result<std::time::Duration, StoreError> {
            Err(StoreError::Invalid("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "postgres"
        }
    }

    fn test_router(stores: Stores) -> Router {
        let config = AppConfig::for_tests("admin", "pw", std::env::temp_dir()).unwrap();
        Router::new()
            .route("/health", get(health_ping))
            .route("/health/detailed", get(health_detailed))
            .route("/health/ready", get(health_ready))
            .with_state(AppState::new(config, stores))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: T = serde_json::from_slice(&body).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_health_ping_returns_ok() {
        init_start_time();
        let (status, body) =
            get_json::<SimpleHealthResponse>(test_router(Stores::in_memory()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_health_detailed_reports_store() {
        let (status, body) =
            get_json::<DetailedHealthResponse>(test_router(Stores::in_memory()), "/health/detailed")
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.environment, "test");
        assert_eq!(body.checks.store.backend, "memory");
        assert_eq!(body.checks.store.status, "healthy");
    }

    #[tokio::test]
    async fn test_health_ready_when_store_answers() {
        let (status, body) =
            get_json::<ReadyResponse>(test_router(Stores::in_memory()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ready");
    }

    #[tokio::test]
    async fn test_health_not_ready_when_store_is_down() {
        let mut stores = Stores::in_memory();
        stores.ping = Arc::new(DownPing);

        let (status, body) = get_json::<ReadyResponse>(test_router(stores), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not ready");
        assert!(body.reason.unwrap().contains("connection refused"));

        let mut stores = Stores::in_memory();
        stores.ping = Arc::new(DownPing);
        let (status, body) =
            get_json::<DetailedHealthResponse>(test_router(stores), "/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "degraded");
    }
}
