//! HTTP facade: a small axum JSON API over the query layer, plus a minimal
//! landing page. Wire concerns only — every payload and failure comes from
//! the `api` module; this layer maps them to routes and status codes.

mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::SnapshotStore;
use crate::error::GitViewError;

/// First port tried when none is given on the command line.
pub const DEFAULT_PORT_RANGE: std::ops::Range<u16> = 7433..7500;

/// Shared server state: the snapshot store plus request defaults.
pub struct ServerState {
    pub store: SnapshotStore,
    /// Context lines used when a request does not specify its own.
    pub default_context: u32,
}

pub type AppState = Arc<ServerState>;

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/data", get(handlers::data))
        .route("/api/commit", get(handlers::commit))
        .route("/api/commits", get(handlers::commits))
        .route("/api/range-diff", get(handlers::range_diff))
        .route("/api/staged", get(handlers::staged))
        .route("/api/unstaged", get(handlers::unstaged))
        .route("/api/stash", get(handlers::stash))
        .route("/api/file", get(handlers::file))
        .route("/api/file-log", get(handlers::file_log))
        .route("/api/blame", get(handlers::blame))
        .route("/api/activity", get(handlers::activity))
        .route("/api/langs", get(handlers::langs))
        .route("/api/refresh", get(handlers::refresh))
        .route("/api/git", get(handlers::raw_git))
        .layer(cors)
        .with_state(state)
}

/// Bind the requested port, or walk the default range until one is free.
async fn bind(host: &str, port: Option<u16>) -> Result<TcpListener, GitViewError> {
    if let Some(port) = port {
        return Ok(TcpListener::bind(format!("{host}:{port}")).await?);
    }
    for candidate in DEFAULT_PORT_RANGE {
        if let Ok(listener) = TcpListener::bind(format!("{host}:{candidate}")).await {
            return Ok(listener);
        }
    }
    Err(GitViewError::Io(std::io::Error::new(
        std::io::ErrorKind::AddrInUse,
        "no free port in the default range",
    )))
}

/// Serve until the process is interrupted.
pub async fn run_server(
    host: &str,
    port: Option<u16>,
    state: AppState,
) -> Result<(), GitViewError> {
    let listener = bind(host, port).await?;
    let addr = listener.local_addr()?;
    info!(url = %format!("http://{addr}"), repo = %state.store.repo_root().display(), "serving");
    eprintln!("\n  gitview  →  http://{addr}");
    eprintln!("  repo     →  {}\n", state.store.repo_root().display());

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
