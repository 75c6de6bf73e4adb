//! # Order reconciliation
//!
//! Uploaded orders start out as `NEW`. Their points are decided by an external accrual authority, and this module is
//! the machinery that keeps asking until every order has a final answer.
//!
//! The pipeline is a single [`OrderProducer`] feeding a bounded queue that a fixed pool of [`ReconciliationWorker`]s
//! drain:
//!
//! * Once per poll interval the producer lists every non-terminal order and offers each one to the queue. Offers never
//!   block. If the queue is full, the order is skipped until the next pass, since it is still non-terminal and will be
//!   listed again.
//! * Each worker takes one order at a time, asks the authority about it once, and writes any change of status back.
//!   When the authority signals a rate limit, the worker that received the signal sleeps for the advertised period
//!   before taking more work. Other workers carry on.
//! * Every suspension point in the pipeline is raced against a [`CancellationToken`], so
//!   [`ReconciliationPipeline::shutdown`] takes effect promptly even when the authority is slow.
//!
//! The same order can be in flight twice (once from each of two passes). That is harmless. Updates are idempotent and
//! the store refuses to touch an order once it is terminal.
mod producer;
mod worker;

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use log::*;
pub use producer::{OrderProducer, PassStats};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
pub use worker::{ReconcileOutcome, ReconciliationWorker, SharedReceiver};

use crate::db::traits::{AccrualAuthority, OrderReconciliation};

pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// The work queue holds this many orders per worker.
pub const QUEUE_SLOTS_PER_WORKER: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationConfig {
    pub worker_count: usize,
    pub poll_interval: Duration,
    /// How many orders the work queue holds before the producer starts deferring them to the next pass.
    pub channel_capacity: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT, DEFAULT_POLL_INTERVAL)
    }
}

impl ReconciliationConfig {
    /// The queue is sized at [`QUEUE_SLOTS_PER_WORKER`] orders per worker. Use [`Self::with_channel_capacity`] to
    /// change that.
    pub fn new(worker_count: usize, poll_interval: Duration) -> Self {
        let worker_count = worker_count.max(1);
        Self { worker_count, poll_interval, channel_capacity: QUEUE_SLOTS_PER_WORKER * worker_count }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// A running reconciliation pipeline: one producer task and `worker_count` worker tasks.
pub struct ReconciliationPipeline {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ReconciliationPipeline {
    /// Spawns the producer and the worker pool. They run until `shutdown` is cancelled, or [`Self::shutdown`] is
    /// called.
    pub fn start<S, A>(store: S, authority: A, config: ReconciliationConfig, shutdown: CancellationToken) -> Self
    where
        S: OrderReconciliation,
        A: AccrualAuthority,
    {
        let config = ReconciliationConfig {
            worker_count: config.worker_count.max(1),
            channel_capacity: config.channel_capacity.max(1),
            ..config
        };
        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        let mut handles = Vec::with_capacity(config.worker_count + 1);
        let producer = OrderProducer::new(store.clone(), sender, config.poll_interval, shutdown.clone());
        handles.push(tokio::spawn(producer.run()));
        for id in 0..config.worker_count {
            let worker =
                ReconciliationWorker::new(id, store.clone(), authority.clone(), receiver.clone(), shutdown.clone());
            handles.push(tokio::spawn(worker.run()));
        }
        info!(
            "🔄️ Reconciliation pipeline started with {} workers, a queue of {} and a {}ms poll interval",
            config.worker_count,
            config.channel_capacity,
            config.poll_interval.as_millis()
        );
        Self { shutdown, handles }
    }

    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(|h| h.is_finished())
    }

    /// Cancels the pipeline and waits up to `grace` for every task to wind down. Tasks that are still running after
    /// that are aborted.
    pub async fn shutdown(self, grace: Duration) {
        self.shutdown.cancel();
        let mut handles = self.handles;
        let joined = tokio::time::timeout(grace, join_all(handles.iter_mut())).await;
        match joined {
            Ok(results) => {
                for e in results.into_iter().filter_map(Result::err) {
                    error!("🔄️ A reconciliation task ended abnormally: {e}");
                }
                info!("🔄️ Reconciliation pipeline stopped");
            },
            Err(_) => {
                let stragglers = handles.iter().filter(|h| !h.is_finished()).count();
                warn!("🔄️ {stragglers} reconciliation tasks did not stop within {}ms. Aborting them.", grace.as_millis());
                handles.iter().for_each(|h| h.abort());
            },
        }
    }
}
