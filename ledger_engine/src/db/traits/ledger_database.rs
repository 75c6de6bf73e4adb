use std::future::Future;

use ledger_common::Points;
use thiserror::Error;

use crate::{
    db::traits::{AccountManagement, InsertOrderResult},
    db_types::{InvalidOrderNumber, NewOrder, NewWithdrawal, UserAccount, Withdrawal},
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    /// The storage engine could not acquire the locks it needed. Nothing was written, and the operation can be retried.
    #[error("The transaction could not complete because of contention for the ledger: {0}")]
    TransactionConflict(String),
    #[error("Insufficient funds. {requested} points were requested, but only {available} are available")]
    InsufficientFunds { available: Points, requested: Points },
    #[error("Withdrawal amounts must be positive. {0} is not.")]
    InvalidAmount(Points),
    #[error("{0}")]
    InvalidOrderNumber(#[from] InvalidOrderNumber),
    #[error("The login '{0}' is already in use")]
    LoginAlreadyExists(String),
    #[error("A login and password hash are both required")]
    MissingCredentials,
    #[error("User account {0} does not exist")]
    UserNotFound(i64),
}

impl LedgerError {
    /// Transient errors leave the ledger untouched, and the same request may succeed if it is repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::TransactionConflict(_))
    }
}

/// The write side of the ledger.
///
/// Implementations must be cheap to clone (typically a handle to a connection pool), and every returned future must be
/// `Send` so that callers can drive them from spawned tasks.
pub trait LedgerDatabase: Clone + AccountManagement + Send + Sync {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Creates a new user account. Logins are unique; a second registration for the same login fails with
    /// [`LedgerError::LoginAlreadyExists`].
    fn create_user_account(
        &self,
        login: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserAccount, LedgerError>> + Send;

    /// Records a newly uploaded order with status `NEW`.
    ///
    /// If the order number is already known, nothing is written and the existing record is returned as
    /// [`InsertOrderResult::AlreadyExists`], whoever owns it.
    fn insert_order(&self, order: NewOrder) -> impl Future<Output = Result<InsertOrderResult, LedgerError>> + Send;

    /// Atomically checks the user's balance and, if it covers `withdrawal.amount`, records the withdrawal.
    ///
    /// Implementations must guarantee that no interleaving of concurrent withdrawals for the same user can leave the
    /// balance negative. Two outcomes are possible when the balance does not cover the request:
    /// * [`LedgerError::InsufficientFunds`], carrying the balance available at the time of the check, and
    /// * [`LedgerError::TransactionConflict`] if the backend could not lock the ledger. Nothing is written in either
    ///   case.
    fn withdraw(&self, withdrawal: NewWithdrawal) -> impl Future<Output = Result<Withdrawal, LedgerError>> + Send;

    /// Closes the database connection.
    fn close(&mut self) -> impl Future<Output = Result<(), LedgerError>> + Send {
        async { Ok(()) }
    }
}
