use actix_web::{dev::Server, middleware::Logger, App, HttpServer};
use ledger_engine::{LedgerDatabase, SqliteDatabase};
use log::*;
use tokio_util::sync::CancellationToken;

use crate::{accrual_worker::start_accrual_worker, config::ServerConfig, errors::ServerError, routes::health};

/// Opens the database, starts the reconciliation pipeline and serves until the process is told to stop. Once the HTTP
/// server has stopped (actix handles SIGINT and SIGTERM), the pipeline is cancelled and given the configured grace
/// period to finish.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let shutdown = CancellationToken::new();
    let pipeline = start_accrual_worker(db.clone(), &config, shutdown.clone())?;
    let srv = create_server_instance(&config)?;
    let result = srv.await;
    info!("🚀️ HTTP server stopped. Shutting down.");
    shutdown.cancel();
    if let Some(pipeline) = pipeline {
        pipeline.shutdown(config.shutdown_grace).await;
    }
    if let Err(e) = db.close().await {
        warn!("🗃️ Could not close the database cleanly. {e}");
    }
    result.map_err(ServerError::from)
}

pub fn create_server_instance(config: &ServerConfig) -> Result<Server, ServerError> {
    let srv = HttpServer::new(|| {
        App::new().wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ledger::access_log")).service(health)
    })
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
