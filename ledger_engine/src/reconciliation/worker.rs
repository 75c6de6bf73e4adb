use std::{sync::Arc, time::Duration};

use accrual_tools::AccrualResponse;
use log::*;
use tokio::sync::{mpsc::Receiver, Mutex};
use tokio_util::sync::CancellationToken;

use crate::{
    db::traits::{AccrualAuthority, OrderReconciliation},
    db_types::{Order, OrderStatusType, OrderUpdate},
};

/// The receiving end of the work queue, shared by every worker in the pool.
pub type SharedReceiver = Arc<Mutex<Receiver<Order>>>;

/// What a worker did with one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order's status changed.
    Updated(OrderStatusType),
    /// The authority reported the status we already have, or the order had already become terminal.
    AlreadyCurrent,
    /// The authority had nothing new to say.
    Unchanged,
    /// The authority asked us to back off for this long.
    RateLimited(Duration),
    /// The authority or the store failed. The order stays as it was and will be retried on a later pass.
    Failed,
}

pub struct ReconciliationWorker<S, A> {
    id: usize,
    store: S,
    authority: A,
    receiver: SharedReceiver,
    shutdown: CancellationToken,
}

impl<S, A> ReconciliationWorker<S, A>
where
    S: OrderReconciliation,
    A: AccrualAuthority,
{
    pub fn new(id: usize, store: S, authority: A, receiver: SharedReceiver, shutdown: CancellationToken) -> Self {
        Self { id, store, authority, receiver, shutdown }
    }

    /// Takes orders off the queue until it is closed or the worker is cancelled.
    pub async fn run(self) {
        debug!("🔄️ Worker {} started", self.id);
        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.next_order() => next,
            };
            let Some(order) = next else {
                debug!("🔄️ Work queue closed");
                break;
            };
            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                outcome = self.reconcile(&order) => outcome,
            };
            if let ReconcileOutcome::RateLimited(delay) = outcome {
                info!("🔄️ Worker {} is backing off for {}s", self.id, delay.as_secs());
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {},
                }
            }
        }
        debug!("🔄️ Worker {} stopped", self.id);
    }

    async fn next_order(&self) -> Option<Order> {
        self.receiver.lock().await.recv().await
    }

    /// Asks the authority about `order` once, and persists any change of status.
    pub async fn reconcile(&self, order: &Order) -> ReconcileOutcome {
        let number = &order.order_number;
        let response = match self.authority.order_status(number).await {
            Ok(response) => response,
            Err(e) => {
                warn!("📡️ Could not fetch the accrual status of order {number}: {e}");
                return ReconcileOutcome::Failed;
            },
        };
        let report = match response {
            AccrualResponse::Unchanged => return ReconcileOutcome::Unchanged,
            AccrualResponse::RateLimited(delay) => return ReconcileOutcome::RateLimited(delay),
            AccrualResponse::Report(report) => report,
        };
        let update = OrderUpdate::from(&report);
        if update.status == order.status {
            trace!("🔄️ Order {number} is still {}", order.status);
            return ReconcileOutcome::AlreadyCurrent;
        }
        match self.store.update_order_status(number, update).await {
            Ok(true) => {
                match update.accrual {
                    Some(accrual) => info!("🔄️ Order {number} is {}. {accrual} points accrued.", update.status),
                    None => debug!("🔄️ Order {number} moved from {} to {}", order.status, update.status),
                }
                ReconcileOutcome::Updated(update.status)
            },
            Ok(false) => ReconcileOutcome::AlreadyCurrent,
            Err(e) => {
                error!("🔄️ Could not save the new status of order {number}: {e}");
                ReconcileOutcome::Failed
            },
        }
    }
}
