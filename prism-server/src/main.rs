mod error;
mod upload;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prism_core::{Assembler, Backend, StoreParams, open_store};

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<Assembler>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prism_server=info,prism_core=info".into()),
        )
        .init();

    let addr = env_or("PRISM_ADDR", "0.0.0.0:8080");
    let store_dir = env_or("PRISM_STORE_DIR", "uploads");
    let ttl_secs: u64 = env_or("PRISM_SESSION_TTL_SECS", "86400").parse()?;
    let max_chunk: usize = env_or("PRISM_MAX_CHUNK_BYTES", "33554432").parse()?;

    let store = open_store(
        Backend::Fs,
        StoreParams {
            root: store_dir.clone().into(),
        },
    )?;
    let assembler = Arc::new(Assembler::with_ttl(store, Duration::from_secs(ttl_secs)));
    let state = AppState {
        assembler: assembler.clone(),
    };

    // Reap abandoned sessions (and their leftover chunks) in the background.
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(15 * 60));
        loop {
            tick.tick().await;
            match assembler.sweep_expired() {
                Ok(0) => {}
                Ok(n) => info!(reaped = n, "expired upload sessions swept"),
                Err(e) => warn!(error = %e, "session sweep failed"),
            }
        }
    });

    let app = Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(max_chunk))
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!(%addr, store = %store_dir, "prism-server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
