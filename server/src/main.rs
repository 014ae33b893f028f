//! Posgrado backend HTTP server.

use posgrado_database::{Backend, Database, schema};
use posgrado_server::{
    AppState, EnvMap, Settings, create,
    logging::{self, LoggingConfig},
    settings::SecretsBackend,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv().ok();
    let env: EnvMap = std::env::vars().collect();

    let _log_guard = logging::init(&LoggingConfig::from_env(&env)?)?;
    info!(dotenv = ?dotenv, "Starting Posgrado backend");

    let secrets = SecretsBackend::from_env(&env)?.provider()?;
    let settings = Arc::new(Settings::resolve(secrets.as_ref(), &env).await?);

    let db = Database::connect_lazy(&settings.database, &settings.pool)?;
    if matches!(db.backend(), Backend::Sqlite) {
        schema::install(&db).await?;
    }

    let app = create(AppState::new(Arc::clone(&settings), db.clone()))?;

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.close().await;
    info!(sessions = ?db.stats(), "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
