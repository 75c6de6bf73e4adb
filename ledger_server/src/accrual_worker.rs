use accrual_tools::AccrualApi;
use ledger_engine::{ReconciliationPipeline, SqliteDatabase};
use log::*;
use tokio_util::sync::CancellationToken;

use crate::{config::ServerConfig, errors::ServerError};

/// Starts the reconciliation pipeline against the configured accrual authority.
///
/// Returns `None` when no authority is configured. The pipeline runs until `shutdown` is cancelled; hand it to
/// [`ReconciliationPipeline::shutdown`] to wait for it to finish.
pub fn start_accrual_worker(
    db: SqliteDatabase,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<Option<ReconciliationPipeline>, ServerError> {
    if config.accrual.base_url.is_empty() {
        error!("🔄️ No accrual authority is configured. Uploaded orders will not be reconciled.");
        return Ok(None);
    }
    let api = AccrualApi::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🔄️ Reconciling orders against {}", config.accrual.base_url);
    Ok(Some(ReconciliationPipeline::start(db, api, config.reconciliation, shutdown)))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use accrual_tools::AccrualConfig;
    use ledger_engine::test_utils::prepare_env::{drop_database, prepare_test_env, random_db_path};

    use super::*;

    #[tokio::test]
    async fn no_authority_no_pipeline() {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let config = ServerConfig::default();
        let pipeline = start_accrual_worker(db, &config, CancellationToken::new()).unwrap();
        assert!(pipeline.is_none());
        drop_database(&url).await;
    }

    #[tokio::test]
    async fn pipeline_stops_on_cancellation() {
        let _ = env_logger::try_init();
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let config = ServerConfig { accrual: AccrualConfig::new("http://127.0.0.1:1"), ..Default::default() };
        let token = CancellationToken::new();
        let pipeline = start_accrual_worker(db, &config, token.clone()).unwrap().expect("Pipeline should start");
        token.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(pipeline.is_finished());
        pipeline.shutdown(Duration::from_secs(1)).await;
        drop_database(&url).await;
    }
}
