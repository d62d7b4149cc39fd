//! HTTP server.
//!
//! One JSON endpoint per pipeline operation, plus the OpenAPI document,
//! the plugin manifest and static assets.

pub mod openapi;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::client::{CrossrefClient, ZoteroClient};
use crate::config::Config;
use crate::pipeline::PipelineContext;

pub use routes::create_router;

/// Bibliography HTTP server.
pub struct BibliographyServer {
    ctx: PipelineContext,
    config: Config,
}

impl BibliographyServer {
    /// Create a server talking to the Crossref and Zotero APIs in `config`.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let crossref = CrossrefClient::new(&config)?;
        let zotero = ZoteroClient::new(&config)?;
        let ctx = PipelineContext::new(Arc::new(crossref), zotero, config.rows);

        Ok(Self { ctx, config })
    }

    /// Create a server around an existing pipeline.
    #[must_use]
    pub const fn with_context(ctx: PipelineContext, config: Config) -> Self {
        Self { ctx, config }
    }

    /// Run the HTTP server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        let router = create_router(self.ctx, &self.config);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!(
            rows = self.config.rows,
            crossref = %self.config.crossref_api_url,
            "HTTP server listening on http://{}",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Pipeline handles shared by the handlers.
    #[must_use]
    pub const fn context(&self) -> &PipelineContext {
        &self.ctx
    }
}

impl std::fmt::Debug for BibliographyServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BibliographyServer").field("rows", &self.ctx.rows).finish()
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
