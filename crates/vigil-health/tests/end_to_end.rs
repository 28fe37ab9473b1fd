//! Full cycles over real sockets: HttpProbe against in-process health
//! endpoints and WebhookNotifier against an in-process receiver.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use vigil_core::{MonitorConfig, StaticConfigProvider, Target};
use vigil_health::{HttpProbe, NotifyAction, Scheduler};
use vigil_http::{HttpClient, TlsConfig};
use vigil_notify::WebhookNotifier;

/// Read one request; returns its body.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return Vec::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let length: usize = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + length {
            return buf[head_end + 4..head_end + 4 + length].to_vec();
        }
    }
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.ok();
}

/// Health endpoint answering every request with the current document.
async fn health_endpoint(status: &'static str, body: &str) -> (String, Arc<Mutex<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let document = Arc::new(Mutex::new(body.to_string()));
    let served = Arc::clone(&document);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            read_request(&mut socket).await;
            let body = served.lock().unwrap().clone();
            respond(&mut socket, status, &body).await;
        }
    });

    (format!("http://{addr}/health"), document)
}

/// Webhook receiver forwarding each posted payload.
async fn webhook_receiver() -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let body = read_request(&mut socket).await;
            respond(&mut socket, "200 OK", "ok").await;
            let _ = tx.send(serde_json::from_slice(&body).unwrap());
        }
    });

    (format!("http://{addr}/services/hook"), rx)
}

/// A port that refuses connections.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/health")
}

fn section_text(payload: &serde_json::Value) -> String {
    payload["attachments"][0]["blocks"][1]["text"]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

fn client() -> HttpClient {
    HttpClient::new(TlsConfig::insecure().unwrap(), Duration::from_secs(5))
}

const PASSING: &str = r#"{"data":[{"id":"1","attributes":{"name":"db","status":"passing"}}]}"#;
const FAILING: &str = r#"{"data":[{"id":"1","attributes":{"name":"db","status":"failing"}}]}"#;

#[tokio::test]
async fn cycle_over_real_endpoints() {
    let (healthy_url, _) = health_endpoint("200 OK", PASSING).await;
    let (degraded_url, degraded_doc) = health_endpoint("503 Service Unavailable", FAILING).await;
    let (garbage_url, _) = health_endpoint("200 OK", "<html>oops</html>").await;
    let down_url = closed_port_url().await;
    let (hook_url, mut payloads) = webhook_receiver().await;

    let config = MonitorConfig {
        targets: vec![
            Target::new("healthy", healthy_url),
            Target::new("degraded", degraded_url),
            Target::new("garbage", garbage_url),
            Target::new("down", down_url),
        ],
        webhook_url: hook_url,
        interval_seconds: 60,
        request_timeout_seconds: 5,
        tls: Default::default(),
        notifier: Default::default(),
    };
    let mut scheduler = Scheduler::new(
        StaticConfigProvider::new(config),
        HttpProbe::new(client()),
        WebhookNotifier::new(client(), 0),
    );

    let outcome = scheduler.run_cycle().await;

    let keys: Vec<&str> = outcome.new_state.iter().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["degraded:db", "down:ConnectionError", "garbage:ConnectionError"]
    );
    assert!(matches!(outcome.action, NotifyAction::AlertNewFailures { .. }));

    let body = section_text(&payloads.recv().await.unwrap());
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "• degraded → db: failing");
    assert!(lines[1].starts_with("• garbage: Error fetching health (invalid JSON response"));
    assert!(lines[2].starts_with("• down: Error fetching health ("));

    // The degraded endpoint recovers; two targets are still failing.
    *degraded_doc.lock().unwrap() = PASSING.to_string();
    let outcome = scheduler.run_cycle().await;
    assert_eq!(outcome.action, NotifyAction::NoOp);
    assert_eq!(outcome.new_state.len(), 2);
}

#[tokio::test]
async fn run_loop_notifies_startup_and_recovery() {
    let (url, document) = health_endpoint("200 OK", FAILING).await;
    let (hook_url, mut payloads) = webhook_receiver().await;

    let config = MonitorConfig {
        targets: vec![Target::new("api", url)],
        webhook_url: hook_url,
        interval_seconds: 1,
        request_timeout_seconds: 5,
        tls: Default::default(),
        notifier: Default::default(),
    };
    let scheduler = Scheduler::new(
        StaticConfigProvider::new(config),
        HttpProbe::new(client()),
        WebhookNotifier::new(client(), 0),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    let startup = payloads.recv().await.unwrap();
    assert_eq!(startup["attachments"][0]["color"], "#439FE0");

    let alert = payloads.recv().await.unwrap();
    assert_eq!(section_text(&alert), "• api → db: failing");

    *document.lock().unwrap() = PASSING.to_string();
    let recovery = tokio::time::timeout(Duration::from_secs(10), payloads.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovery["attachments"][0]["color"], "#36a64f");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
