//! # OCCI Server
//!
//! Serves the OCCI 1.1 HTTP rendering on `Axum`, backed by the in-memory
//! entity store with the Infrastructure extension registered.
//!
//! ## Example
//! ```no_run
//! use occi_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8000)
//!         .base_url("http://localhost:8000")
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod router;
mod shutdown;

use anyhow::{Context, Result};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use occi::domain::config::{ApiConfig, SslConfig};
use occi::kernel::server::state::ApiState;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Absolute URL locations are rendered under; its path becomes the base path.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.cfg.occi.base_url = base_url.into();
        self
    }

    /// Checks the TLS files, then builds the store and registers the
    /// Infrastructure categories.
    ///
    /// # Errors
    /// A configured certificate or key is missing, or the registry cannot be populated.
    pub fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            check_tls_files(ssl)?;
        }

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, base_url = %self.cfg.occi.base_url, "Initializing server");

        let state = occi::init(&self.cfg).context("Failed to initialize OCCI state")?;
        Ok(Server { state })
    }
}

/// State assembled and ready to serve.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until SIGINT/SIGTERM, then drains open connections.
    ///
    /// # Errors
    /// Binding the listener or loading the TLS certificates failed.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let app = router::init(self.state).into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(shutdown::drain_on_signal(handle.clone(), SHUTDOWN_GRACE));

        match &cfg.server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!(%address, base_url = %cfg.occi.base_url, "Listening (HTTPS)");
                axum_server::bind_rustls(address, tls).handle(handle).serve(app).await.context("HTTPS server failed")?;
            },
            None => {
                info!(%address, base_url = %cfg.occi.base_url, "Listening (HTTP)");
                axum_server::bind(address).handle(handle).serve(app).await.context("HTTP server failed")?;
            },
        }

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    for (what, path) in [("certificate", &ssl.cert), ("key", &ssl.key)] {
        if !path.is_file() {
            anyhow::bail!("SSL {what} not found at: {}", path.display());
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
            tracing::warn!(key = %ssl.key.display(), "SSL private key is readable by group or others (should be 600)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_config() {
        let server = Server::builder().port(9000).base_url("http://cloud.example.org/occi").build().unwrap();
        assert_eq!(server.state().config.server.port, 9000);
        assert_eq!(server.state().translator.base_path(), "/occi");
        assert!(server.state().registry().lookup_location("storage/").is_some());
    }

    #[test]
    fn missing_certificates_fail_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = ApiConfig::default();
        cfg.server.ssl = Some(SslConfig { cert: dir.path().join("cert.pem"), key: dir.path().join("key.pem") });

        let err = Server::builder().config(cfg).build().unwrap_err();
        assert!(err.to_string().contains("SSL certificate not found"));
    }
}
