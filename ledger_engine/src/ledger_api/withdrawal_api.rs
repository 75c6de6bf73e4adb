use std::{fmt::Debug, time::Duration};

use ledger_common::Points;
use log::*;

use crate::{
    db::traits::{LedgerDatabase, LedgerError},
    db_types::{NewWithdrawal, OrderNumber, Withdrawal},
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const CONFLICT_BACKOFF: Duration = Duration::from_millis(50);

/// Spends points from a user's balance.
///
/// The atomic check-and-debit lives in the backend ([`LedgerDatabase::withdraw`]). This layer validates the request
/// and retries attempts that failed only because the ledger was locked. A shortfall is final and is never retried.
pub struct WithdrawalApi<B> {
    db: B,
    max_attempts: u32,
}

impl<B: Debug> Debug for WithdrawalApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WithdrawalApi ({:?}, {} attempts)", self.db, self.max_attempts)
    }
}

impl<B> WithdrawalApi<B>
where B: LedgerDatabase
{
    pub fn new(db: B) -> Self {
        Self { db, max_attempts: DEFAULT_MAX_ATTEMPTS }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Withdraws `amount` points from the user's balance against the order number `reference`.
    ///
    /// Fails with
    /// * [`LedgerError::InvalidAmount`] if `amount` is not positive,
    /// * [`LedgerError::InvalidOrderNumber`] if `reference` fails the Luhn check,
    /// * [`LedgerError::InsufficientFunds`] if the balance does not cover `amount`,
    /// * [`LedgerError::TransactionConflict`] if the ledger stayed locked for every attempt.
    pub async fn withdraw(&self, user_id: i64, reference: &str, amount: Points) -> Result<Withdrawal, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let order_number = OrderNumber::parse(reference)?;
        let withdrawal = NewWithdrawal::new(user_id, order_number, amount);
        let mut attempt = 1;
        loop {
            match self.db.withdraw(withdrawal.clone()).await {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!("💸️ Withdrawal attempt {attempt}/{} for user {user_id} hit a locked ledger. {e}", self.max_attempts);
                    tokio::time::sleep(CONFLICT_BACKOFF * attempt).await;
                    attempt += 1;
                },
                Err(e) => {
                    debug!("💸️ Withdrawal of {amount} for user {user_id} failed. {e}");
                    return Err(e);
                },
                Ok(w) => {
                    info!("💸️ User {user_id} withdrew {amount} against order {}", w.order_number);
                    return Ok(w);
                },
            }
        }
    }
}
