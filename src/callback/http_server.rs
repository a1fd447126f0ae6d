// src/callback/http_server.rs
// HTTP callback server (4.4.1): accepts any method, always answers 200 OK
// regardless of whether the correlation ID is known.

use super::extract;
use crate::store::Store;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tracing::{debug, warn};

#[derive(Clone)]
struct HttpServerState {
    store: Store,
}

pub fn router(store: Store) -> Router {
    Router::new()
        .fallback(any(handle_callback))
        .with_state(Arc::new(HttpServerState { store }))
}

/// Bind and serve the HTTP callback surface until `shutdown` resolves.
pub async fn serve(
    bind_address: SocketAddr,
    store: Store,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> crate::error::RicochetResult<()> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|e| crate::error::RicochetError::ConnectionError(e.to_string()))?;

    axum::serve(
        listener,
        router(store).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| crate::error::RicochetError::ConnectionError(e.to_string()))
}

async fn handle_callback(
    State(state): State<Arc<HttpServerState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    header_map: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path();
    let headers: BTreeMap<String, String> = header_map
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    let body_opt = (!body.is_empty()).then(|| body.to_vec());

    match extract::from_http_path(path) {
        Some(correlation_id) => {
            let received_at = wall_clock_now();
            let source_ip = addr.ip().to_string();
            match state
                .store
                .record_callback(
                    &correlation_id,
                    &source_ip,
                    path,
                    &headers,
                    body_opt.as_deref(),
                    received_at,
                )
                .await
            {
                Ok(true) => debug!(correlation_id = %correlation_id, method = %method, "recorded callback"),
                Ok(false) => debug!(correlation_id = %correlation_id, "callback for unknown correlation id discarded"),
                Err(e) => warn!(error = %e, "failed to record callback"),
            }
        }
        None => debug!(path, "no correlation id in callback path"),
    }

    standard_response()
}

/// The response is identical for known and unknown IDs — a required
/// non-information-leak property (4.4.1).
fn standard_response() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain")],
        "OK",
    )
}

fn wall_clock_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
