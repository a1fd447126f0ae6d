// src/callback/mod.rs
// Callback Servers (4.4): HTTP and DNS handlers sharing one correlation-ID
// extraction rule and one store.

pub mod dns_packet;
pub mod dns_server;
pub mod extract;
pub mod http_server;

use crate::config::server::{DnsServerConfig, HttpServerConfig};
use crate::error::RicochetResult;
use crate::store::Store;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run both callback servers concurrently until `cancel` fires (wired to
/// SIGINT/SIGTERM by the caller - see `main.rs`).
pub async fn run(
    http_config: &HttpServerConfig,
    dns_config: &DnsServerConfig,
    store: Store,
    cancel: CancellationToken,
) -> RicochetResult<()> {
    let http_addr = http_config.bind_address()?;
    let dns_addr = dns_config.bind_address()?;

    info!(%http_addr, "starting http callback server");
    info!(%dns_addr, "starting dns callback server");

    let http_cancel = cancel.clone();
    let http_store = store.clone();
    let http_task = tokio::spawn(async move {
        http_server::serve(http_addr, http_store, async move { http_cancel.cancelled().await }).await
    });

    let dns_task = tokio::spawn(dns_server::serve(dns_addr, store, cancel));

    let (http_result, dns_result) = tokio::join!(http_task, dns_task);
    http_result.map_err(|e| crate::error::RicochetError::ConnectionError(e.to_string()))??;
    dns_result.map_err(|e| crate::error::RicochetError::ConnectionError(e.to_string()))??;
    Ok(())
}
