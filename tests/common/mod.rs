//! Shared utilities for end-to-end protocol tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use anyhow::Context;
use bytes::Bytes;
use prost::Message;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use twirp::{handler_fn, ContentType, ServerConfig, ServiceRouter, TwirpServer};

pub const SERVICE_FQN: &str = "twitch.twirp.example.Haberdasher";

/// Request message for `MakeHat`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Size {
    #[prost(int32, tag = "1")]
    pub inches: i32,
}

/// Response message for `MakeHat`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Hat {
    #[prost(int32, tag = "1")]
    pub size: i32,
    #[prost(string, tag = "2")]
    pub color: String,
    #[prost(string, tag = "3")]
    pub name: String,
}

/// A `MakeHat` handler that echoes the requested size on a fancy red hat,
/// in whichever encoding the call negotiated.
pub fn make_hat_handler() -> Arc<dyn twirp::RpcHandler> {
    handler_fn(|body: Bytes, content_type: ContentType| async move {
        match content_type {
            ContentType::Protobuf => {
                let size = Size::decode(body).context("decoding Size")?;
                let hat = Hat {
                    size: size.inches,
                    color: "red".to_string(),
                    name: "fancy hat".to_string(),
                };
                Ok(hat.encode_to_vec())
            }
            _ => {
                let request: serde_json::Value = serde_json::from_slice(&body)?;
                let inches = request.get("inches").cloned().unwrap_or(0.into());
                let hat = serde_json::json!({
                    "size": inches,
                    "name": "fancy hat",
                    "color": "red",
                });
                Ok(serde_json::to_vec(&hat)?)
            }
        }
    })
}

/// Build the Haberdasher route table with the given `MakeHat` handler.
pub fn haberdasher_router(make_hat: Arc<dyn twirp::RpcHandler>) -> ServiceRouter {
    ServiceRouter::builder(SERVICE_FQN)
        .method("MakeHat", make_hat)
        .build()
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "twirp=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Spawn a Twirp server on an ephemeral port. The server runs until the
/// test's runtime is dropped.
pub async fn spawn_server(service: ServiceRouter) -> SocketAddr {
    spawn_server_with(ServerConfig::default(), service).await
}

/// Spawn a Twirp server with an explicit config on an ephemeral port.
pub async fn spawn_server_with(config: ServerConfig, service: ServiceRouter) -> SocketAddr {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = TwirpServer::new(config, service);
    tokio::spawn(async move {
        let _ = server
            .run_with_shutdown(listener, std::future::pending())
            .await;
    });

    addr
}

/// Start a programmable non-Twirp backend that answers every connection
/// with a fixed raw HTTP response.
#[allow(dead_code)]
pub async fn start_intermediary<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            202 => "202 Accepted",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "500 Internal Server Error",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
