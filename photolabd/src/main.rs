//! Photolab Daemon - runs one photosynthesis lab session in the background
//!
//! The daemon owns:
//! - the session state (controls, run flag, history, tutor chat)
//! - the one-second simulation clock
//! - the tutor collaborator
//! - an IPC server for UI clients (JSON lines over TCP)
//!
//! Nothing is persisted; the session ends with the process.
//!
//! Config lookup:
//! - Linux: ~/.local/share/photolab/config.json
//! - Windows: %APPDATA%\photolab\config.json
//! - MacOS: ~/Library/Application Support/photolab/config.json

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod clock;
mod config;
mod error;
mod paths;
mod server;
mod session;
mod tutor;

use config::DaemonConfig;
use error::DaemonError;
use paths::AppPaths;
use session::Session;
use tutor::Tutor;

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let paths = AppPaths::new()?;
    info!("Data directory: {:?}", paths.data_dir());

    let mut config = DaemonConfig::load(&paths.config_file())?;
    config.apply_env();

    let tutor = Tutor::new(config.tutor.clone());
    info!(
        "Tutor mode: {:?}{}",
        tutor.config().mode,
        tutor
            .config()
            .endpoint
            .as_deref()
            .map(|e| format!(" ({e})"))
            .unwrap_or_default()
    );

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| DaemonError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;
    info!("Photolab daemon listening on {}", config.listen_addr);

    let session = Arc::new(Session::launch(tutor).await);
    server::serve(listener, session, Arc::new(Notify::new())).await
}
