//! End-to-end tests: a real server on 127.0.0.1 and WebSocket peers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use humora_analyzer::{Analyzer, RandomAnalyzer};
use humora_core::{AnalysisResult, LabelSet};
use humora_protocol::{MAX_PAYLOAD_SIZE, decode_base64, encode_result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::ServerConfig;
use crate::error::{ServerResult, TransportError};
use crate::server::AnalyzeServer;
use crate::session::{SessionOutcome, SessionReport};
use crate::signals::ShutdownHandle;
use crate::test_support::{WidthAnalyzer, jpeg_data_uri, png_base64, png_data_uri};

const WAIT: Duration = Duration::from_secs(5);

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Running {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    reports: broadcast::Receiver<SessionReport>,
    task: JoinHandle<ServerResult<()>>,
}

fn local_config() -> ServerConfig {
    ServerConfig::new("127.0.0.1:0".parse().unwrap())
}

async fn start(config: ServerConfig, analyzer: Arc<dyn Analyzer>) -> Running {
    let server = AnalyzeServer::bind(config, analyzer).await.unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let reports = server.subscribe();
    let task = tokio::spawn(server.run_until_shutdown(std::future::pending()));

    Running {
        addr,
        shutdown,
        reports,
        task,
    }
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
    client
}

async fn send_text(client: &mut Client, text: impl Into<String>) {
    client.send(Message::text(text.into())).await.unwrap();
}

/// Next text message, skipping WebSocket control frames.
async fn next_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a reply")
            .expect("stream ended")
            .unwrap();
        match message {
            Message::Text(text) => return text.as_str().to_owned(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

async fn next_age(client: &mut Client) -> u8 {
    let json = next_text(client).await;
    serde_json::from_str::<AnalysisResult>(&json).unwrap().age
}

async fn next_report(reports: &mut broadcast::Receiver<SessionReport>) -> SessionReport {
    tokio::time::timeout(WAIT, reports.recv())
        .await
        .expect("timed out waiting for a session report")
        .unwrap()
}

async fn http_get(addr: SocketAddr, path: &str, origin: Option<&str>) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let origin = origin
        .map(|o| format!("Origin: {o}\r\n"))
        .unwrap_or_default();
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\n{origin}Connection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), body.to_string())
}

#[tokio::test]
async fn responses_in_order_and_bad_frames_skipped() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws/analyze").await;

    send_text(&mut client, png_data_uri(10, 2)).await;
    send_text(&mut client, "not-base64!!").await;
    send_text(&mut client, "data:image/jpeg;base64,@@@@").await;
    send_text(&mut client, png_base64(20, 2)).await;
    send_text(&mut client, png_data_uri(30, 2)).await;
    send_text(&mut client, "ping").await;

    assert_eq!(next_age(&mut client).await, 10);
    assert_eq!(next_age(&mut client).await, 20);
    assert_eq!(next_age(&mut client).await, 30);
    // Skipped frames produce nothing, so the pong comes right after
    assert_eq!(next_text(&mut client).await, "PONG");
}

#[tokio::test]
async fn frontend_path_and_binary_frames() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws").await;

    let png = decode_base64(&png_base64(12, 1)).unwrap();
    client.send(Message::binary(png)).await.unwrap();

    assert_eq!(next_age(&mut client).await, 12);
}

#[tokio::test]
async fn browser_jpeg_frames_are_answered() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws").await;

    send_text(&mut client, jpeg_data_uri(64, 48)).await;
    assert_eq!(next_age(&mut client).await, 64);
}

#[tokio::test]
async fn payload_over_decode_limit_skips_only_that_frame() {
    let mut server = start(local_config(), Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws/analyze").await;

    // One WebSocket frame, larger than the payload limit and the usual
    // 16 MiB frame default
    let oversized = format!(
        "data:image/jpeg;base64,{}",
        "A".repeat(MAX_PAYLOAD_SIZE + 1024 * 1024)
    );
    send_text(&mut client, oversized).await;
    send_text(&mut client, jpeg_data_uri(21, 7)).await;

    assert_eq!(next_age(&mut client).await, 21);
    client.close(None).await.unwrap();

    let report = next_report(&mut server.reports).await;
    assert_eq!(report.outcome, SessionOutcome::GracefulDisconnect);
    assert_eq!(report.stats.frames_received, 2);
    assert_eq!(report.stats.frames_skipped, 1);
}

#[tokio::test]
async fn random_results_match_label_schema() {
    let labels = LabelSet::default();
    let analyzer = Arc::new(RandomAnalyzer::new(labels.clone()).unwrap());
    let server = start(local_config(), analyzer).await;
    let mut client = connect(server.addr, "/ws/analyze").await;

    for _ in 0..20 {
        send_text(&mut client, png_data_uri(4, 4)).await;
        let json = next_text(&mut client).await;

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);

        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert!(result.conforms_to(&labels), "{result:?}");
        assert_eq!(encode_result(&result).unwrap(), json);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_get_their_own_results() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;

    let clients: Vec<_> = (0u32..8)
        .map(|i| {
            let addr = server.addr;
            tokio::spawn(async move {
                let mut client = connect(addr, "/ws/analyze").await;
                let widths: Vec<u32> = (0..6).map(|k| i * 10 + k + 1).collect();

                for &width in &widths {
                    send_text(&mut client, png_data_uri(width, 1)).await;
                }
                let mut ages = Vec::new();
                for _ in &widths {
                    ages.push(u32::from(next_age(&mut client).await));
                }
                assert_eq!(ages, widths);
            })
        })
        .collect();

    for client in clients {
        client.await.unwrap();
    }
}

#[tokio::test]
async fn clean_close_and_reset_are_distinguished() {
    let mut server = start(local_config(), Arc::new(WidthAnalyzer)).await;

    let mut polite = connect(server.addr, "/ws/analyze").await;
    send_text(&mut polite, png_data_uri(1, 1)).await;
    next_text(&mut polite).await;
    polite.close(None).await.unwrap();

    let report = next_report(&mut server.reports).await;
    assert_eq!(report.outcome, SessionOutcome::GracefulDisconnect);
    assert_eq!(report.stats.responses_sent, 1);

    let mut rude = connect(server.addr, "/ws/analyze").await;
    send_text(&mut rude, "ping").await;
    next_text(&mut rude).await;
    // Drop the TCP connection without a closing handshake
    drop(rude);

    let report = next_report(&mut server.reports).await;
    assert!(
        matches!(
            report.outcome,
            SessionOutcome::AbnormalTermination(TransportError::Receive(_))
        ),
        "{:?}",
        report.outcome
    );
}

#[tokio::test]
async fn shutdown_closes_live_sessions() {
    let mut server = start(local_config(), Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws/analyze").await;
    send_text(&mut client, "ping").await;
    assert_eq!(next_text(&mut client).await, "PONG");

    server.shutdown.trigger();

    let message = tokio::time::timeout(WAIT, client.next()).await.unwrap();
    assert!(
        matches!(message, Some(Ok(Message::Close(_)))),
        "{message:?}"
    );

    let report = next_report(&mut server.reports).await;
    assert_eq!(report.outcome, SessionOutcome::Shutdown);

    let stopped = tokio::time::timeout(WAIT, server.task).await.unwrap();
    assert!(stopped.unwrap().is_ok());
}

#[tokio::test]
async fn error_replies_when_enabled() {
    let config = local_config().with_error_replies(true);
    let server = start(config, Arc::new(WidthAnalyzer)).await;
    let mut client = connect(server.addr, "/ws/analyze").await;

    send_text(&mut client, "data:image/png;base64,@@@@").await;
    send_text(&mut client, png_data_uri(8, 8)).await;

    let error: serde_json::Value = serde_json::from_str(&next_text(&mut client).await).unwrap();
    let object = error.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object["error"].is_string());

    assert_eq!(next_age(&mut client).await, 8);
}

#[tokio::test]
async fn connections_beyond_limit_are_refused() {
    let mut server = start(local_config().with_max_connections(1), Arc::new(WidthAnalyzer)).await;

    let mut first = connect(server.addr, "/ws/analyze").await;
    send_text(&mut first, "ping").await;
    next_text(&mut first).await;

    let refused = connect_async(format!("ws://{}/ws/analyze", server.addr)).await;
    match refused {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 503),
        other => panic!("expected 503, got {:?}", other.map(|(_, r)| r.status())),
    }

    first.close(None).await.unwrap();
    next_report(&mut server.reports).await;

    // The slot is free again
    let mut again = connect(server.addr, "/ws/analyze").await;
    send_text(&mut again, "ping").await;
    assert_eq!(next_text(&mut again).await, "PONG");
}

#[tokio::test]
async fn health_counts_sessions_and_allows_any_origin() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;

    let (status, _, body) = http_get(server.addr, "/health", None).await;
    assert_eq!(status, 200);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["active_sessions"], 0);

    let mut client = connect(server.addr, "/ws").await;
    send_text(&mut client, "ping").await;
    next_text(&mut client).await;

    let (status, head, body) =
        http_get(server.addr, "/health", Some("http://meeting.example")).await;
    assert_eq!(status, 200);
    assert!(head.contains("access-control-allow-origin: *"), "{head}");

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["active_sessions"], 1);
    assert_eq!(health["analyzer"], "width");
}

#[tokio::test]
async fn plain_http_on_websocket_path_is_rejected() {
    let server = start(local_config(), Arc::new(WidthAnalyzer)).await;

    let (status, _, _) = http_get(server.addr, "/ws/analyze", None).await;
    assert!((400..500).contains(&status), "status {status}");
}
