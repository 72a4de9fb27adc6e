//! HTTP Server
//!
//! Routes, body limit and request tracing on top of axum.

use crate::handler::{self, AppState};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pdf2html_core::application::{ConversionService, ShutdownToken};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Build the service router
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/convert", post(handler::convert))
        .route("/convert/full", post(handler::convert_full))
        .route("/convert/text", post(handler::convert_text))
        .route("/convert/text/full", post(handler::convert_text_full))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, conversion: Arc<ConversionService>) -> Self {
        Self {
            config,
            state: AppState::new(conversion),
        }
    }

    /// Serve until the shutdown token fires
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn run(self, mut shutdown: ShutdownToken) -> io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!(
            addr = %listener.local_addr()?,
            max_upload_bytes = self.config.max_upload_bytes,
            "HTTP server listening"
        );

        let app = router(self.state, self.config.max_upload_bytes);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
