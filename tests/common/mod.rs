//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Request, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use passthrough_proxy::config::{ProxyConfig, UpstreamConfig};
use passthrough_proxy::{HttpServer, Shutdown, UpstreamClient};

/// A request as the mock upstream received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl Recorded {
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

pub type Log = Arc<Mutex<Vec<Recorded>>>;

/// Start a mock upstream that records every request.
///
/// Paths:
/// - `/v1/models` → 200 `{"ok":true}` as JSON
/// - `/redirect` → 302 to `/elsewhere`
/// - `/missing` → 404
/// - `/cookies` → 200 with two `Set-Cookie` headers
/// - anything else → 200 echoing the body and content type
#[allow(dead_code)]
pub async fn start_recording_upstream() -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let app = Router::new().fallback(record_and_answer).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, log)
}

async fn record_and_answer(State(log): State<Log>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap();
    let content_type = parts.headers.get(header::CONTENT_TYPE).cloned();

    log.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect(),
        body: body.to_vec(),
    });

    match parts.uri.path() {
        "/v1/models" => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"ok":true}"#,
        )
            .into_response(),
        "/redirect" => (
            StatusCode::FOUND,
            [(header::LOCATION, "/elsewhere")],
            "see elsewhere",
        )
            .into_response(),
        "/missing" => (StatusCode::NOT_FOUND, "nothing here").into_response(),
        "/cookies" => (
            AppendHeaders([
                (header::SET_COOKIE, "a=1; Path=/"),
                (header::SET_COOKIE, "b=2; Path=/"),
            ]),
            "cookies set",
        )
            .into_response(),
        _ => {
            let mut response = Response::new(Body::from(body));
            if let Some(ct) = content_type {
                response.headers_mut().insert(header::CONTENT_TYPE, ct);
            }
            response
        }
    }
}

/// Start a raw upstream that answers every request with a chunked body,
/// writing one chunk every `delay`.
#[allow(dead_code)]
pub async fn start_drip_upstream(chunks: Vec<&'static str>, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let chunks = chunks.clone();
            tokio::spawn(async move {
                if !read_request_head(&mut socket).await {
                    return;
                }

                let head = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                for chunk in chunks {
                    let frame = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
                    if socket.write_all(frame.as_bytes()).await.is_err() {
                        return;
                    }
                    let _ = socket.flush().await;
                    tokio::time::sleep(delay).await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> bool {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
        }
    }
    true
}

/// Start a raw upstream that answers every request with `head` followed by
/// `body`, byte for byte, then closes the connection.
#[allow(dead_code)]
pub async fn start_raw_upstream(head: String, body: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = head.clone();
            let body = body.clone();
            tokio::spawn(async move {
                if !read_request_head(&mut socket).await {
                    return;
                }
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a raw upstream that writes `chunks` chunked frames of `chunk_size`
/// bytes, one every `delay`, and counts how many it managed to write.
/// Writing stops at the first failed write.
#[allow(dead_code)]
pub async fn start_counting_upstream(
    chunks: usize,
    chunk_size: usize,
    delay: Duration,
) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let written = Arc::new(AtomicUsize::new(0));

    let counter = written.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                if !read_request_head(&mut socket).await {
                    return;
                }
                let head = "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nTransfer-Encoding: chunked\r\n\r\n";
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }

                let mut frame = format!("{:x}\r\n", chunk_size).into_bytes();
                frame.extend(std::iter::repeat(b'x').take(chunk_size));
                frame.extend_from_slice(b"\r\n");

                for _ in 0..chunks {
                    if socket.write_all(&frame).await.is_err() || socket.flush().await.is_err() {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
            });
        }
    });

    (addr, written)
}

/// Start the proxy on an ephemeral port, forwarding to `upstream_base`.
pub async fn start_proxy(upstream_base: &str) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.upstream = UpstreamConfig {
        base_url: upstream_base.to_string(),
        ..UpstreamConfig::default()
    };

    let client = UpstreamClient::new(&config.upstream).unwrap();
    let server = HttpServer::new(&config, client);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}

/// Test client that never follows redirects and never uses a system proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Test client that also leaves response bodies exactly as received.
#[allow(dead_code)]
pub fn raw_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .no_zstd()
        .build()
        .unwrap()
}
