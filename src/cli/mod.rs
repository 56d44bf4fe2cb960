//! CLI layer: argument parsing, startup sequence, and the tokio runtime.

pub mod args;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::api::{self, SnapshotStore};
use crate::error::GitViewError;
use crate::git;
use crate::server::{self, ServerState};

pub fn run() {
    let args = args::Args::parse();

    let log_level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = serve(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn serve(args: args::Args) -> Result<(), GitViewError> {
    let start_dir = match args.path {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    // Fatal when no repository is found — nothing to serve.
    let root = git::locate_repository(&start_dir)?;
    info!(repo = %root.display(), "repository located");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        info!("collecting initial snapshot");
        let snapshot = api::collect_snapshot(&root).await?;
        info!(
            commits = snapshot.commits.len(),
            files = snapshot.file_tree.len(),
            contributors = snapshot.repo.contributors.len(),
            "ready"
        );

        let state = Arc::new(ServerState {
            store: SnapshotStore::new(root, snapshot),
            default_context: args.context,
        });
        server::run_server(&args.host, args.port, state).await
    })
}
