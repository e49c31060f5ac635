//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use shop_console::config::ConsoleConfig;
use shop_console::session::{SessionClaims, SessionKeys};
use shop_console::{ConsoleServer, Shutdown};

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A console running on an ephemeral port.
pub struct TestConsole {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<ConsoleConfig>,
}

impl TestConsole {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestConsole {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn test_config(backend_url: &str) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.upstream.base_url = backend_url.to_string();
    config.session.secret = SECRET.to_string();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config
}

pub async fn start_console(backend_url: &str) -> TestConsole {
    start_console_with(test_config(backend_url)).await
}

pub async fn start_console_with(config: ConsoleConfig) -> TestConsole {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();

    let server = ConsoleServer::new(config).unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, &server_shutdown).await;
    });

    TestConsole {
        addr,
        shutdown,
        updates,
    }
}

/// A session token for `uid`, as login would issue it.
pub fn session_token(uid: &str) -> String {
    let mut claims = SessionClaims::new(uid, 3600);
    claims.uid = Some(uid.to_string());
    claims.email = Some(format!("{}@example.com", uid));
    SessionKeys::new(SECRET.as_bytes()).issue(&claims).unwrap()
}

/// Plain client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A local address with nothing listening on it.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Start a programmable raw HTTP backend.
///
/// `f` receives the connection index and returns `(delay, status, json body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> String
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (Duration, u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        let mut index = 0;
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let n = index;
            index += 1;
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let (delay, status, body) = f(n).await;
                tokio::time::sleep(delay).await;
                let status_text = match status {
                    200 => "200 OK",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}
