use std::fmt::Debug;

use ledger_common::Points;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{db_url, new_pool, orders, orders::OrderQueryFilter, user_accounts, withdrawals};
use crate::{
    db::traits::{
        AccountApiError,
        AccountManagement,
        InsertOrderResult,
        LedgerDatabase,
        LedgerError,
        OrderReconciliation,
    },
    db_types::{Balance, NewOrder, NewWithdrawal, Order, OrderNumber, OrderStatusType, OrderUpdate, UserAccount, Withdrawal},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the `DATABASE_URI` environment variable (or its default).
    pub async fn new(max_connections: u32) -> Result<Self, LedgerError> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. This is idempotent.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_user_account(&self, login: &str, password_hash: &str) -> Result<UserAccount, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        user_accounts::insert_user_account(login, password_hash, &mut conn).await
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Records the withdrawal and checks the balance inside a single transaction.
    ///
    /// The withdrawal row is written *before* the balance is computed. In SQLite the first write in a transaction
    /// takes the database-wide writer lock, so every concurrent withdrawal is serialised behind it and each one sees
    /// the rows committed by its predecessors. If the resulting balance is negative, the transaction is rolled back
    /// and nothing is persisted.
    async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let record = withdrawals::insert_withdrawal(&withdrawal, &mut tx).await?;
        let remaining = withdrawals::available_balance(withdrawal.user_id, &mut tx).await?;
        if remaining.is_negative() {
            tx.rollback().await?;
            let available = remaining + withdrawal.amount;
            debug!(
                "💸️ User {} tried to withdraw {} but only has {available}. Rolled back.",
                withdrawal.user_id, withdrawal.amount
            );
            return Err(LedgerError::InsufficientFunds { available, requested: withdrawal.amount });
        }
        tx.commit().await?;
        debug!("💸️ User {} withdrew {} against order {}", record.user_id, record.amount, record.order_number);
        Ok(record)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(user_accounts::user_account_by_id(user_id, &mut conn).await?)
    }

    async fn fetch_user_account_by_login(&self, login: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(user_accounts::user_account_by_login(login, &mut conn).await?)
    }

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(order_number, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQueryFilter::default().with_user_id(user_id).newest_first();
        Ok(orders::fetch_orders(query, &mut conn).await?)
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?)
    }

    async fn sum_withdrawals(&self, user_id: i64) -> Result<Points, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::sum_withdrawals(user_id, &mut conn).await?)
    }

    /// Both sums are read in one transaction so that the pair is consistent.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let accrued = withdrawals::sum_processed_accruals(user_id, &mut tx).await?;
        let withdrawn = withdrawals::sum_withdrawals(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(Balance { current: accrued - withdrawn, withdrawn })
    }
}

impl OrderReconciliation for SqliteDatabase {
    async fn fetch_non_terminal_orders(&self) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQueryFilter::default().with_statuses(OrderStatusType::NON_TERMINAL);
        Ok(orders::fetch_orders(query, &mut conn).await?)
    }

    async fn update_order_status(&self, order_number: &OrderNumber, update: OrderUpdate) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let updated = orders::update_order_status(order_number, update, &mut conn).await?;
        if updated {
            debug!("🗃️ Order {order_number} is now {}", update.status);
        } else {
            debug!("🗃️ Order {order_number} was not updated. It is unknown or already final.");
        }
        Ok(updated)
    }
}
