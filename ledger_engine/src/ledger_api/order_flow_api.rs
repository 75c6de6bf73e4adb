use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{InsertOrderResult, LedgerDatabase, LedgerError},
    db_types::{NewOrder, OrderNumber},
    ledger_api::order_objects::SubmitOrderResult,
};

/// `OrderFlowApi` is the entry point for uploaded order numbers.
///
/// Uploading only records the order. Points are credited later, once the reconciliation pipeline hears from the
/// accrual authority that the order has been processed.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Validates `raw_number` and records it against `user_id`.
    ///
    /// Order numbers are unique across all users: the first upload wins and later uploads, by anyone, change nothing.
    pub async fn submit_order(&self, user_id: i64, raw_number: &str) -> Result<SubmitOrderResult, LedgerError> {
        let order_number = OrderNumber::parse(raw_number)?;
        let result = match self.db.insert_order(NewOrder::new(order_number, user_id)).await? {
            InsertOrderResult::Inserted(order) => {
                info!("🗃️ User {user_id} uploaded order {}", order.order_number);
                SubmitOrderResult::Accepted(order)
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("🗃️ User {user_id} uploaded order {} again", order.order_number);
                SubmitOrderResult::AlreadyUploaded(order)
            },
            InsertOrderResult::AlreadyExists(order) => {
                warn!("🗃️ User {user_id} tried to upload order {}, which belongs to someone else", order.order_number);
                SubmitOrderResult::UploadedByAnotherUser
            },
        };
        Ok(result)
    }
}
