use std::future::Future;

use accrual_tools::{AccrualApi, AccrualApiError, AccrualResponse};

use crate::db_types::OrderNumber;

/// Something that can tell us how many points an order earned.
///
/// Each call should make exactly one request. Back-off and retries are the caller's business.
pub trait AccrualAuthority: Clone + Send + Sync + 'static {
    fn order_status(
        &self,
        order_number: &OrderNumber,
    ) -> impl Future<Output = Result<AccrualResponse, AccrualApiError>> + Send;
}

impl AccrualAuthority for AccrualApi {
    async fn order_status(&self, order_number: &OrderNumber) -> Result<AccrualResponse, AccrualApiError> {
        self.fetch_order_status(order_number.as_str()).await
    }
}
