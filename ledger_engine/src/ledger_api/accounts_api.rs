//! Unifies API for accessing user accounts.

use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{AccountApiError, AccountManagement, LedgerDatabase, LedgerError},
    db_types::{Balance, Order, OrderNumber, UserAccount, Withdrawal},
};

/// The `AccountApi` provides a unified API for accessing accounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the user account for the given id. If no account exists, `None` is returned.
    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account(user_id).await
    }

    pub async fn user_by_login(&self, login: &str) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account_by_login(login).await
    }

    pub async fn order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_number(order_number).await
    }

    /// Every order the user has uploaded, newest first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("🗃️ User {user_id} has {} orders", orders.len());
        Ok(orders)
    }

    /// Every withdrawal the user has made, newest first.
    pub async fn withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        self.db.fetch_withdrawals_for_user(user_id).await
    }

    /// The user's spendable balance and the total they have withdrawn so far.
    pub async fn balance_for_user(&self, user_id: i64) -> Result<Balance, AccountApiError> {
        if self.db.fetch_user_account(user_id).await?.is_none() {
            return Err(AccountApiError::UserNotFound(user_id));
        }
        self.db.fetch_balance(user_id).await
    }
}

impl<B> AccountApi<B>
where B: LedgerDatabase
{
    /// Creates a new user. The password must already be hashed; this layer never sees plain text passwords.
    pub async fn register_user(&self, login: &str, password_hash: &str) -> Result<UserAccount, LedgerError> {
        let login = login.trim();
        if login.is_empty() || password_hash.is_empty() {
            return Err(LedgerError::MissingCredentials);
        }
        let account = self.db.create_user_account(login, password_hash).await?;
        info!("🗃️ Registered user #{} ({})", account.id, account.login);
        Ok(account)
    }
}
