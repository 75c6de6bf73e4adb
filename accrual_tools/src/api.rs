use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, RETRY_AFTER},
    Client,
    StatusCode,
};

use crate::{
    data_objects::AccrualReportBody,
    AccrualApiError,
    AccrualConfig,
    AccrualReport,
    AccrualResponse,
};

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, order_number: &str) -> String {
        format!("{}/api/orders/{order_number}", self.config.base_url)
    }

    /// Asks the authority for the current status of `order_number`. Exactly one request is made.
    ///
    /// Transport failures, unparseable bodies and unexpected status codes are all returned as errors. A rate-limit
    /// signal is *not* an error; it is returned as [`AccrualResponse::RateLimited`] so that the caller can back off.
    pub async fn fetch_order_status(&self, order_number: &str) -> Result<AccrualResponse, AccrualApiError> {
        let url = self.url(order_number);
        trace!("📡️ Querying accrual authority: {url}");
        let response = self.client.get(url).send().await.map_err(|e| AccrualApiError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                trace!("📡️ No news for order {order_number}");
                Ok(AccrualResponse::Unchanged)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let delay = retry_after(response.headers());
                debug!("📡️ Accrual authority is rate limiting us. Retry after {}s", delay.as_secs());
                Ok(AccrualResponse::RateLimited(delay))
            },
            StatusCode::OK => {
                let body = response
                    .json::<AccrualReportBody>()
                    .await
                    .map_err(|e| AccrualApiError::MalformedResponse(e.to_string()))?;
                if body.order != order_number {
                    return Err(AccrualApiError::MalformedResponse(format!(
                        "Asked about order {order_number}, but the report is for order {}",
                        body.order
                    )));
                }
                let report = AccrualReport::try_from(body)?;
                trace!("📡️ Order {order_number} is {} with accrual {:?}", report.status, report.accrual);
                Ok(AccrualResponse::Report(report))
            },
            status => Err(AccrualApiError::UnexpectedStatus(status.as_u16())),
        }
    }
}

/// Reads the `Retry-After` header as a whole number of seconds. A missing or unparseable header means "no delay".
fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    Duration::from_secs(secs)
}
