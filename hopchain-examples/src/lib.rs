//! Shared pieces of the hopchain example binaries.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// One entry of the GitHub contributors API.
#[derive(Debug, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u32,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Install a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Serve a few demo routes on a background thread and return the address.
///
/// - `GET /hello` answers `Hello, World!`
/// - `GET /slow` answers after 500ms
pub fn spawn_demo_server() -> anyhow::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;

    let app = Router::new()
        .route("/hello", get(|| async { "Hello, World!" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "Hello, eventually!"
            }),
        );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::spawn(move || {
        runtime.block_on(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, "failed to register listener");
                    return;
                }
            };
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "demo server stopped");
            }
        });
    });

    Ok(addr)
}
