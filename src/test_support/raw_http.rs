//! Hand-rolled HTTP/1.1 server for failures wiremock cannot produce:
//! connections dropped before any answer and bodies cut short.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::socket_guard::should_skip_socket_bound_test;

/// What the server does with one request.
#[derive(Debug, Clone)]
pub enum RawReply {
    /// Close the connection without answering.
    Hangup,
    /// Write these bytes, then close.
    Bytes(Vec<u8>),
}

impl RawReply {
    /// A complete `200 OK` with `body`.
    #[must_use]
    pub fn ok(body: &[u8]) -> Self {
        Self::truncated(body.len(), body)
    }

    /// A `200 OK` announcing `content_length` bytes but sending only `body`.
    #[must_use]
    pub fn truncated(content_length: usize, body: &[u8]) -> Self {
        let mut bytes = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
        )
        .into_bytes();
        bytes.extend_from_slice(body);
        Self::Bytes(bytes)
    }
}

/// A running server; accepted connections are counted.
#[derive(Debug)]
pub struct RawServer {
    base_url: String,
    connections: Arc<AtomicUsize>,
}

impl RawServer {
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.base_url
    }

    /// Connections accepted so far.
    #[must_use]
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Starts a server answering each request target with `route(target)`.
pub async fn start_raw_server_or_skip<F>(route: F) -> Option<RawServer>
where
    F: Fn(&str) -> RawReply + Send + Sync + 'static,
{
    if should_skip_socket_bound_test() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let address = listener.local_addr().ok()?;
    let connections = Arc::new(AtomicUsize::new(0));
    let route = Arc::new(route);

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let route = Arc::clone(&route);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buffer = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buffer).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buffer[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                if let RawReply::Bytes(bytes) = route(&target) {
                    let _ = stream.write_all(&bytes).await;
                    let _ = stream.flush().await;
                }
                let _ = stream.shutdown().await;
            });
        }
    });

    Some(RawServer {
        base_url: format!("http://{address}"),
        connections,
    })
}
