use telemetry_server::api::{self, AppState};
use telemetry_server::config::Config;
use telemetry_server::db;
use telemetry_server::services::{DatabaseSink, EventLog, EventRecorder};

use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemetry_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting telemetry server v{}", env!("CARGO_PKG_VERSION"));
    debug!("Database target: {}", config.database);

    let pool = match db::open(&config.database).await {
        Ok(pool) => {
            if let Err(e) = db::ensure_schema(&pool).await {
                error!("Failed to ensure DB schema: {:#}", e);
            } else {
                info!("Database schema ensured");
            }
            info!("Database pool created");
            Some(pool)
        }
        Err(e) => {
            error!("Failed to create database pool: {:#}", e);
            warn!("Running without a database; events go to the file log only");
            None
        }
    };

    let event_log = match EventLog::init(&config.log_dir).await {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to create log directory {}: {:#}", config.log_dir.display(), e);
            EventLog::new(&config.log_dir)
        }
    };

    let mut recorder = EventRecorder::new().with_sink(event_log);
    if let Some(pool) = &pool {
        recorder = recorder.with_sink(DatabaseSink::new(pool.clone()));
    }

    info!("Event sinks: {}", recorder.sink_names().join(", "));

    let state = AppState {
        pool: pool.clone(),
        recorder,
    };
    let app = api::build_router(state, &config.static_dir);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);
    info!("Capture endpoint: http://{}/capture/", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        db::close(pool).await;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
