use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asset_registry::config::{Config, LogFormat};
use asset_registry::{api, storage::Database, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "asset-registry starting");

    let config = Config::load()?;
    let db = Database::open(&config.server.data_dir)?;
    info!(
        data_dir = %config.server.data_dir,
        insert_attempts = config.allocator.insert_attempts,
        "Asset database ready"
    );

    let bind_address = config.server.bind_address.clone();
    let app = api::create_router(Arc::new(AppState::new(config, db)));
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` filters, `LOG_FORMAT` picks the output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Gcp => registry.with(tracing_stackdriver::layer()).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_span_list(false))
            .init(),
        LogFormat::Plain => registry.with(fmt::layer()).init(),
    }
}

/// Resolves on Ctrl+C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    let _ = tokio::signal::ctrl_c().await;

    info!("Shutdown signal received, finishing in-flight requests");
}
