//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware and a request timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::state::AppState;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    /// Only use for development.
    pub cors_permissive: bool,

    /// Upper bound on a single request
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    // Localhost only
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:8080"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::stations::router())
        .merge(routes::lines::router())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// run_server(AppState::postgres(pool), ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::in_memory(), &ServerConfig::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.cors_permissive);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = send(&app(), "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn merge_on_station_removal_end_to_end() {
        let app = app();

        let (status, line) = send(
            &app,
            "POST",
            "/lines",
            Some(json!({"name": "신분당선", "color": "bg-red-600"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let line_id = line["id"].as_i64().unwrap();

        let (status, _) = send(&app, "POST", "/stations", Some(json!({"name": "A"}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let add = format!("/lines/addStation/{}", line_id);
        let (status, _) = send(
            &app,
            "POST",
            &add,
            Some(json!({"preStationName": "A", "stationName": "B", "distance": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, detail) = send(
            &app,
            "POST",
            &add,
            Some(json!({"preStationName": "B", "stationName": "C", "distance": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let b_id = detail["stations"][1]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/lines/station/{}/{}", line_id, b_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, stations) = send(
            &app,
            "GET",
            &format!("/lines/lineStations/{}", line_id),
            None,
        )
        .await;
        assert_eq!(stations[0]["name"], "A");
        assert_eq!(stations[1]["name"], "C");
        assert_eq!(stations.as_array().map(Vec::len), Some(2));

        // B is off the line now, so it can be deleted
        let (status, _) = send(&app, "DELETE", &format!("/stations/{}", b_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn station_in_use_cannot_be_deleted() {
        let app = app();
        send(
            &app,
            "POST",
            "/lines",
            Some(json!({"name": "2호선", "color": "bg-green-600"})),
        )
        .await;
        send(&app, "POST", "/stations", Some(json!({"name": "A"}))).await;
        send(
            &app,
            "POST",
            "/lines/addStation/1",
            Some(json!({"preStationName": "A", "stationName": "B", "distance": 5})),
        )
        .await;

        let (status, body) = send(&app, "DELETE", "/stations/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "station 'A' is still part of a line");
    }
}
