//! pdf2html Server - Main Entry Point
//! HTTP conversion service + retention sweeper

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{LogFormat, ServiceConfig};
use pdf2html_api_http::{HttpServer, HttpServerConfig};
use pdf2html_core::application::{
    shutdown_channel, ConversionService, JobDirectoryManager, RetentionSweeper, SweeperConfig,
};
use pdf2html_core::port::id_provider::UuidProvider;
use pdf2html_core::port::time_provider::SystemTimeProvider;
use pdf2html_infra_system::{ConverterSettings, LocalFilesystem, Pdf2HtmlExConverter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "pdf2html=info,tower_http=info";
const SWEEPER_STOP_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging (+ optional OpenTelemetry)
    init_tracing(config.log_format)?;

    info!("pdf2html server v{} starting...", VERSION);
    info!(
        work_dir = %config.work_dir.display(),
        converter = %config.converter_bin.display(),
        zoom = %config.zoom,
        timeout_secs = config.timeout.as_secs(),
        retention_secs = config.retention.as_secs(),
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let fs = Arc::new(LocalFilesystem::new());

    let jobs = Arc::new(JobDirectoryManager::new(
        config.work_dir.clone(),
        fs.clone(),
        id_provider,
        time_provider.clone(),
    ));
    jobs.ensure_root()
        .with_context(|| format!("Cannot create work dir {}", jobs.root().display()))?;

    let converter = Arc::new(Pdf2HtmlExConverter::new(
        ConverterSettings {
            binary: config.converter_bin.clone(),
            zoom: config.zoom.clone(),
        },
        time_provider.clone(),
    ));

    let conversion = Arc::new(ConversionService::new(jobs, converter, config.timeout));

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    // 4. Start retention sweeper
    info!("Starting retention sweeper...");
    let sweeper = RetentionSweeper::new(
        fs,
        time_provider,
        config.work_dir.clone(),
        SweeperConfig {
            retention: config.retention,
            interval: config.sweep_interval,
        },
    );
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown_tx.subscribe()));

    // 5. Forward Ctrl+C / SIGTERM to every task
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received. Draining in-flight requests...");
        shutdown_tx.shutdown();
    });

    // 6. Serve until shutdown
    let server = HttpServer::new(
        HttpServerConfig {
            host: config.host.clone(),
            port: config.port,
            max_upload_bytes: config.max_upload_bytes,
        },
        conversion,
    );

    let served = server.run(shutdown_rx).await;
    if let Err(e) = &served {
        error!(error = %e, "HTTP server failed");
    }

    // 7. Graceful shutdown
    if tokio::time::timeout(SWEEPER_STOP_GRACE, sweeper_handle)
        .await
        .is_err()
    {
        warn!("Retention sweeper did not stop in time");
    }

    telemetry::shutdown();
    info!("Shutdown complete.");

    served.with_context(|| format!("Failed to serve on {}:{}", config.host, config.port))
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let otel = telemetry::otel_layer().context("Failed to initialize OpenTelemetry")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let registry = tracing_subscriber::registry().with(otel).with(env_filter);

    match format {
        // Production: JSON structured logging
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
