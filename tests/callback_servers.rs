// End-to-end checks for the HTTP and DNS callback servers (4.4), driven over
// real loopback sockets rather than calling the handler functions directly -
// this is what actually exercises the always-200/OK-body invariant and the
// DNS response byte layout the unit tests can't reach.

use ricochet::callback::{dns_server, http_server};
use ricochet::model::InjectionRecord;
use ricochet::store::Store;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;

async fn free_tcp_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn free_udp_addr() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap()
}

fn encode_query(id: u16, qname: &str, qtype: u16) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&0x0100u16.to_be_bytes());
    packet.extend_from_slice(&1u16.to_be_bytes());
    packet.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    for label in qname.split('.') {
        packet.push(label.len() as u8);
        packet.extend_from_slice(label.as_bytes());
    }
    packet.push(0);
    packet.extend_from_slice(&qtype.to_be_bytes());
    packet.extend_from_slice(&1u16.to_be_bytes()); // QCLASS IN
    packet
}

#[tokio::test]
async fn http_callback_responds_200_ok_for_known_and_unknown_ids() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .record_injection(&InjectionRecord {
            id: "a1b2c3d4e5f60718".into(),
            target_url: "http://t.example/search?q=x".into(),
            parameter: "query:q".into(),
            payload: "x".into(),
            context: Some("xss:reflected".into()),
            injected_at: 1.0,
        })
        .await
        .unwrap();

    let addr = free_tcp_addr().await;
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    let server_store = store.clone();
    let server = tokio::spawn(async move {
        http_server::serve(addr, server_store, async move { shutdown.cancelled().await }).await
    });

    // Let the listener actually bind before sending traffic.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::new();

    let known = client.get(format!("http://{addr}/a1b2c3d4e5f60718")).send().await.unwrap();
    assert_eq!(known.status(), 200);
    assert_eq!(known.text().await.unwrap(), "OK");

    // A non-information-leak property (4.4.1): the response for an unknown
    // correlation id must be byte-identical to the known-id response.
    let unknown = client.get(format!("http://{addr}/ffffffffffffffff")).send().await.unwrap();
    assert_eq!(unknown.status(), 200);
    assert_eq!(unknown.text().await.unwrap(), "OK");

    cancel.cancel();
    server.await.unwrap().unwrap();

    let recorded = store.get_callbacks_for_injection("a1b2c3d4e5f60718").await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].request_path, "/a1b2c3d4e5f60718");

    let discarded = store.get_callbacks_for_injection("ffffffffffffffff").await.unwrap();
    assert!(discarded.is_empty());
}

#[tokio::test]
async fn dns_callback_from_sqli_payload_is_answered_and_recorded() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .record_injection(&InjectionRecord {
            id: "deadbeefcafef00d".into(),
            target_url: "http://t.example/".into(),
            parameter: "header:User-Agent".into(),
            payload: "deadbeefcafef00d.cb.example".into(),
            context: Some("sqli:mssql".into()),
            injected_at: 1.0,
        })
        .await
        .unwrap();

    let server_addr = free_udp_addr().await;
    let cancel = CancellationToken::new();
    let server = tokio::spawn(dns_server::serve(server_addr, store.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let query = encode_query(0x1234, "deadbeefcafef00d.cb.example", 1);
    client.send_to(&query, server_addr).await.unwrap();

    let mut buf = [0u8; 512];
    let (_, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .expect("dns response within timeout")
        .unwrap();
    assert_eq!(u16::from_be_bytes([buf[0], buf[1]]), 0x1234);
    assert_eq!(u16::from_be_bytes([buf[2], buf[3]]), 0x8580);

    cancel.cancel();
    // The server's accept loop only re-checks cancellation after its ~500ms
    // recv timeout elapses.
    tokio::time::sleep(Duration::from_millis(600)).await;
    server.await.unwrap().unwrap();

    let recorded = store.get_callbacks_for_injection("deadbeefcafef00d").await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].request_path, "DNS:deadbeefcafef00d.cb.example");
}

#[tokio::test]
async fn dns_callback_for_unknown_id_still_gets_a_response() {
    let store = Store::open_in_memory().await.unwrap();
    let server_addr = free_udp_addr().await;
    let cancel = CancellationToken::new();
    let server = tokio::spawn(dns_server::serve(server_addr, store.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let query = encode_query(0x9999, "ffffffffffffffff.cb.example", 1);
    client.send_to(&query, server_addr).await.unwrap();

    let mut buf = [0u8; 512];
    tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .expect("dns response within timeout")
        .unwrap();

    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(600)).await;
    server.await.unwrap().unwrap();

    let recorded = store.get_callbacks_for_injection("ffffffffffffffff").await.unwrap();
    assert!(recorded.is_empty());
}
