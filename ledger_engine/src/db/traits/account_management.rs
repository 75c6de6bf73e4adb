use ledger_common::Points;
use thiserror::Error;

use crate::db_types::{Balance, Order, OrderNumber, UserAccount, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("User account {0} does not exist")]
    UserNotFound(i64),
}

/// The `AccountManagement` trait defines the read-only queries about user accounts, their orders and their
/// withdrawals.
///
/// The [`LedgerDatabase`](crate::LedgerDatabase) trait handles the write side. None of these methods modify the
/// ledger.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account with the given id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_user_account_by_login(&self, login: &str) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError>;

    /// All the orders uploaded by the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// All the withdrawals the user has made, newest first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;

    /// The sum of every withdrawal the user has made.
    async fn sum_withdrawals(&self, user_id: i64) -> Result<Points, AccountApiError>;

    /// The user's current balance (processed accruals less withdrawals) and the total withdrawn.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, AccountApiError>;
}
