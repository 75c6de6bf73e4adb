use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use accrual_tools::{AccrualApiError, AccrualReport, AccrualResponse, AccrualStatus};
use ledger_common::Points;

use crate::{db::traits::AccrualAuthority, db_types::OrderNumber};

type Scripted = Result<AccrualResponse, AccrualApiError>;

#[derive(Debug, Default)]
struct Script {
    responses: HashMap<String, VecDeque<Scripted>>,
    calls: HashMap<String, Vec<Instant>>,
    latency: Duration,
}

/// An in-memory accrual authority that plays back canned responses.
///
/// Responses for each order are returned in the order they were scripted. The last one is sticky and repeats forever.
/// Orders with no script get [`AccrualResponse::Unchanged`]. Every call is timestamped so tests can check back-off.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAuthority {
    script: Arc<Mutex<Script>>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits this long before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Queues a response for `order`, after any already queued.
    pub fn push_response(&self, order: &str, response: Scripted) {
        self.lock().responses.entry(order.to_string()).or_default().push_back(response);
    }

    pub fn push_report(&self, order: &str, status: AccrualStatus, accrual: Option<Points>) {
        let report = AccrualReport { order: order.to_string(), status, accrual };
        self.push_response(order, Ok(AccrualResponse::Report(report)));
    }

    pub fn calls(&self, order: &str) -> Vec<Instant> {
        self.lock().calls.get(order).cloned().unwrap_or_default()
    }

    pub fn call_count(&self, order: &str) -> usize {
        self.lock().calls.get(order).map(Vec::len).unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_response(&self, order: &str) -> (Scripted, Duration) {
        let mut script = self.lock();
        script.calls.entry(order.to_string()).or_default().push(Instant::now());
        let latency = script.latency;
        let response = match script.responses.get_mut(order) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(AccrualResponse::Unchanged)),
            Some(queue) => queue.front().cloned().unwrap_or(Ok(AccrualResponse::Unchanged)),
            None => Ok(AccrualResponse::Unchanged),
        };
        (response, latency)
    }
}

impl AccrualAuthority for ScriptedAuthority {
    async fn order_status(&self, order_number: &OrderNumber) -> Result<AccrualResponse, AccrualApiError> {
        let (response, latency) = self.next_response(order_number.as_str());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        response
    }
}
