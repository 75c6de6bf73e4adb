use std::future::Future;

use crate::{
    db::traits::LedgerError,
    db_types::{Order, OrderNumber, OrderUpdate},
};

/// The view of storage the reconciliation pipeline works against.
pub trait OrderReconciliation: Clone + Send + Sync + 'static {
    /// Lists every order whose status is not terminal (`NEW`, `REGISTERED` or `PROCESSING`), oldest upload first.
    fn fetch_non_terminal_orders(&self) -> impl Future<Output = Result<Vec<Order>, LedgerError>> + Send;

    /// Writes a status (and, for `PROCESSED`, an accrual) to the given order.
    ///
    /// Orders that are already terminal are never modified. The result is `true` if a row was updated and `false` if
    /// the order does not exist or had already reached a terminal status.
    fn update_order_status(
        &self,
        order_number: &OrderNumber,
        update: OrderUpdate,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;
}
