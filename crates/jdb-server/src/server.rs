use std::sync::Arc;

use jdb_store::{DocumentStore, FileBackend, FileWatcher};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;

/// jdb document server.
pub struct JdbServer {
    config: ServerConfig,
    store: Arc<DocumentStore>,
}

impl JdbServer {
    /// Serve the file named by `config.db_path`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(DocumentStore::new(FileBackend::new(&config.db_path)));
        Self { config, store }
    }

    /// Serve an existing store (useful for testing and embedding).
    pub fn with_store(config: ServerConfig, store: Arc<DocumentStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.store.clone())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let watcher = if self.config.watch {
            FileWatcher::start(self.store.clone()).unwrap_or_else(|e| {
                warn!(error = %e, "couldn't watch document file; external edits won't be picked up");
                None
            })
        } else {
            None
        };

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            db = %self.config.db_path.display(),
            "Listening on http://localhost:{}",
            self.config.bind_addr.port()
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(watcher) = watcher {
            watcher.stop().await;
        }
        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "couldn't listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdb_store::MemoryBackend;

    #[test]
    fn server_construction() {
        let server = JdbServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(
            server.store().location(),
            Some(std::path::Path::new("./db.json"))
        );
    }

    #[test]
    fn router_builds() {
        let store = Arc::new(DocumentStore::new(MemoryBackend::new()));
        let server = JdbServer::with_store(ServerConfig::default(), store);
        let _router = server.router();
    }
}
