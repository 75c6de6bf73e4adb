use std::time::Duration;

use log::*;
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tokio_util::sync::CancellationToken;

use crate::{
    db::traits::{LedgerError, OrderReconciliation},
    db_types::Order,
};

/// What happened during a single listing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Non-terminal orders found in storage.
    pub listed: usize,
    /// Orders handed to the work queue.
    pub queued: usize,
    /// Orders skipped because the queue was full. They will be listed again next pass.
    pub dropped: usize,
}

pub struct OrderProducer<S> {
    store: S,
    sender: Sender<Order>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl<S: OrderReconciliation> OrderProducer<S> {
    pub fn new(store: S, sender: Sender<Order>, poll_interval: Duration, shutdown: CancellationToken) -> Self {
        Self { store, sender, poll_interval, shutdown }
    }

    /// Runs listing passes every `poll_interval` until cancelled, or until every worker has gone away.
    pub async fn run(self) {
        info!("🔄️ Order producer started");
        loop {
            let pass = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                pass = self.run_pass() => pass,
            };
            match pass {
                Ok(stats) if stats.dropped > 0 => warn!(
                    "🔄️ Work queue is full. {} of {} unprocessed orders were deferred to the next pass",
                    stats.dropped, stats.listed
                ),
                Ok(stats) => trace!("🔄️ Queued {} of {} unprocessed orders", stats.queued, stats.listed),
                Err(e) => error!("🔄️ Could not list unprocessed orders: {e}"),
            }
            if self.sender.is_closed() {
                warn!("🔄️ All reconciliation workers have stopped");
                break;
            }
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {},
            }
        }
        info!("🔄️ Order producer stopped");
    }

    /// Lists the non-terminal orders and offers each to the queue without waiting. Never blocks on a full queue.
    pub async fn run_pass(&self) -> Result<PassStats, LedgerError> {
        let orders = self.store.fetch_non_terminal_orders().await?;
        let mut stats = PassStats { listed: orders.len(), ..Default::default() };
        for order in orders {
            match self.sender.try_send(order) {
                Ok(()) => stats.queued += 1,
                Err(TrySendError::Full(_)) => stats.dropped += 1,
                Err(TrySendError::Closed(_)) => {
                    stats.dropped = stats.listed - stats.queued;
                    break;
                },
            }
        }
        Ok(stats)
    }
}
