use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ServeOptions};

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Listener {
    listener: TcpListener,
    options: Arc<ServeOptions>,
}

impl Listener {
    /// Validates the document root and binds the listening socket.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let root = &cfg.static_files.root;
        let metadata = tokio::fs::metadata(root)
            .await
            .with_context(|| format!("document root {} is not accessible", root.display()))?;
        if !metadata.is_dir() {
            bail!("document root {} is not a directory", root.display());
        }

        let addr = cfg.server.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!(root = %root.display(), "Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            options: Arc::new(ServeOptions::from_config(cfg)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` completes, then waits for the
    /// live connections to finish.
    ///
    /// A failed accept is logged and skipped; it never ends the loop.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(live = connections.len(), "Shutdown signal received");
                    break;
                }

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!("Connection task failed: {}", e);
                    }
                }

                accepted = self.listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    if let Err(e) = socket.set_nodelay(true) {
                        warn!(%peer, error = %e, "Failed to configure socket, dropping it");
                        continue;
                    }
                    info!("Accepted connection from {}", peer);

                    let options = Arc::clone(&self.options);
                    connections.spawn(async move {
                        let mut conn = Connection::new(socket, options, peer.to_string());
                        if let Err(e) = conn.run().await {
                            warn!("Connection error from {}: {:#}", peer, e);
                        }
                    });
                }
            }
        }

        // stop accepting, let live connections drain
        drop(self.listener);
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                error!("Connection task failed: {}", e);
            }
        }
        info!("All connections closed");

        Ok(())
    }
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = Listener::bind(cfg).await?;

    listener
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for the interrupt signal");
                std::future::pending::<()>().await;
            }
        })
        .await
}
