// src/callback/dns_server.rs
// A minimal authoritative UDP DNS responder (4.4.2). Bound socket, loop
// handle-request with a ~500ms read timeout so a shutdown signal is
// observed promptly.

use super::dns_packet::{self, Question};
use super::extract;
use crate::error::RicochetResult;
use crate::store::Store;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const RECV_TIMEOUT: Duration = Duration::from_millis(500);
const MAX_PACKET: usize = 512;

/// Serve the DNS callback surface until `cancel` is triggered. Returns once
/// the socket is closed; in-flight handling of the current packet (there is
/// no threading here beyond the accept loop) always finishes first.
pub async fn serve(
    bind_address: SocketAddr,
    store: Store,
    cancel: CancellationToken,
) -> RicochetResult<()> {
    let socket = UdpSocket::bind(bind_address)
        .await
        .map_err(|e| crate::error::RicochetError::ConnectionError(e.to_string()))?;

    let mut buf = [0u8; MAX_PACKET];
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let recv = tokio::time::timeout(RECV_TIMEOUT, socket.recv_from(&mut buf)).await;
        let (len, peer) = match recv {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                warn!(error = %e, "dns socket recv error");
                continue;
            }
            Err(_) => continue, // timed out, re-check cancellation
        };

        handle_packet(&store, &buf[..len], peer, &socket).await;
    }

    Ok(())
}

async fn handle_packet(store: &Store, packet: &[u8], peer: SocketAddr, socket: &UdpSocket) {
    let Some(header) = dns_packet::parse_header(packet) else {
        warn!(len = packet.len(), "dns packet shorter than header, dropped");
        return;
    };

    let Some(question) = dns_packet::parse_question(packet) else {
        warn!("dns packet has malformed question section, dropped");
        return;
    };

    record_callback(store, &question, peer).await;

    let response = dns_packet::build_response(packet, &header, &question);
    if let Err(e) = socket.send_to(&response, peer).await {
        warn!(error = %e, "failed to send dns response");
    }
}

async fn record_callback(store: &Store, question: &Question, peer: SocketAddr) {
    let Some(correlation_id) = extract::from_dns_first_label(&question.qname) else {
        debug!(qname = %question.qname, "no correlation id in dns qname");
        return;
    };

    let mut headers = BTreeMap::new();
    headers.insert("qtype".to_string(), question.qtype.to_string());

    let request_path = format!("DNS:{}", question.qname);
    let received_at = wall_clock_now();

    match store
        .record_callback(
            &correlation_id,
            &peer.ip().to_string(),
            &request_path,
            &headers,
            None,
            received_at,
        )
        .await
    {
        Ok(true) => debug!(correlation_id = %correlation_id, "recorded dns callback"),
        Ok(false) => debug!(correlation_id = %correlation_id, "dns callback for unknown correlation id discarded"),
        Err(e) => warn!(error = %e, "failed to record dns callback"),
    }
}

fn wall_clock_now() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
