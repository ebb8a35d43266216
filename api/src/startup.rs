use axum::Router;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use application::{RecordRepository, RecordService};
use domain::Record;
use infrastructure::InMemoryRecordStore;

use crate::config::ServiceConfig;
use crate::routes::{build_info_router, build_router};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind to address {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// `INFO` by default, overridable through `RUST_LOG`.
pub fn init_logging() {
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
    info!("Logger initialized successfully.");
}

/// Wires store, service and router for record type `R`, then serves until the listener fails.
pub async fn run<R: Record>(default_port: u16) -> Result<(), StartupError> {
    init_logging();
    let config = ServiceConfig::from_env(default_port);

    // --- Dependency Injection ---
    let store = if config.seed_data {
        InMemoryRecordStore::<R>::seeded()
    } else {
        InMemoryRecordStore::<R>::new()
    };
    let repository: Arc<dyn RecordRepository<R>> = Arc::new(store);
    let service = Arc::new(RecordService::new(repository));
    info!(
        service = R::SERVICE_NAME,
        seeded = config.seed_data,
        "In-memory store and service initialized."
    );

    if let Some(info_port) = config.info_port {
        let info_listener = bind(info_port).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(info_listener, build_info_router::<R>()).await {
                error!("Banner listener error: {}", e);
            }
        });
    }

    let listener = bind(config.port).await?;
    info!("{} service ready", R::SERVICE_NAME);
    serve(listener, build_router(service)).await
}

async fn bind(port: u16) -> Result<TcpListener, StartupError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    info!("Server listening on {}", addr);
    Ok(listener)
}

async fn serve(listener: TcpListener, app: Router) -> Result<(), StartupError> {
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(StartupError::Serve)
}
