//! Shared utilities for integration testing.
//!
//! Mock upstreams speak just enough HTTP/1.1 over raw TCP to exercise the
//! relay: fixed responses with or without a Content-Type header, call
//! counting, request body capture, and a stall mode that accepts the
//! connection and never answers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How a mock upstream treats each request.
#[derive(Clone, Copy)]
pub enum UpstreamBehavior {
    /// Answer every request with this fixed response.
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: &'static str,
    },
    /// Read the request, then hold the connection open without responding.
    Stall,
}

/// Handle to a running mock upstream.
pub struct MockUpstream {
    addr: SocketAddr,
    calls: Arc<AtomicU32>,
    last_body: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Body of the most recent request, if any was received.
    pub fn last_body(&self) -> Option<Vec<u8>> {
        self.last_body.lock().unwrap().clone()
    }
}

/// Start a mock upstream on an ephemeral port.
pub async fn start_upstream(behavior: UpstreamBehavior) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let last_body = Arc::new(Mutex::new(None));

    let calls_srv = calls.clone();
    let last_body_srv = last_body.clone();
    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let calls = calls_srv.clone();
            let last_body = last_body_srv.clone();
            tokio::spawn(async move {
                handle_connection(socket, behavior, calls, last_body).await;
            });
        }
    });

    MockUpstream {
        addr,
        calls,
        last_body,
    }
}

/// A URL whose port is not listening, so connects are refused.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

async fn handle_connection(
    mut socket: TcpStream,
    behavior: UpstreamBehavior,
    calls: Arc<AtomicU32>,
    last_body: Arc<Mutex<Option<Vec<u8>>>>,
) {
    let Some(body) = read_request(&mut socket).await else {
        return;
    };
    calls.fetch_add(1, Ordering::SeqCst);
    *last_body.lock().unwrap() = Some(body);

    match behavior {
        UpstreamBehavior::Respond {
            status,
            content_type,
            body,
        } => {
            let content_type_line = match content_type {
                Some(ct) => format!("Content-Type: {}\r\n", ct),
                None => String::new(),
            };
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
                status_line(status),
                body.len(),
                content_type_line,
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        UpstreamBehavior::Stall => {
            // Keep the socket open until the client gives up.
            let mut buf = [0u8; 1];
            let _ = socket.read(&mut buf).await;
        }
    }
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let content_length = parse_content_length(&buf[..header_end]);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn parse_content_length(headers: &[u8]) -> usize {
    let text = String::from_utf8_lossy(headers);
    text.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        204 => "204 No Content",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}
