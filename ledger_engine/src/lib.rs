//! Points Ledger Engine
//!
//! The ledger engine keeps track of loyalty points. Users upload the numbers of orders they have placed; an external
//! accrual authority decides how many points each order earns; and users spend those points by making withdrawals.
//! This library contains the core logic. It knows nothing about HTTP or authentication.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. The backend traits are public
//!    so that other storage engines can be plugged in. The data types stored in the database are defined in
//!    [`mod@db_types`].
//! 2. The ledger public API ([`mod@ledger_api`]). This registers users, accepts order uploads and handles withdrawals.
//!    Withdrawals are atomic: a user's balance can never go negative, however many withdrawals race each other.
//! 3. Order reconciliation ([`mod@reconciliation`]). A producer and a pool of workers that keep asking the accrual
//!    authority about unfinished orders until each one is `PROCESSED` or `INVALID`.
mod db;

pub mod db_types;
pub mod helpers;
mod ledger_api;
pub mod reconciliation;
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::{
    AccountApiError,
    AccountManagement,
    AccrualAuthority,
    InsertOrderResult,
    LedgerDatabase,
    LedgerError,
    OrderReconciliation,
};
pub use ledger_api::{
    accounts_api::AccountApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    withdrawal_api::WithdrawalApi,
};
pub use reconciliation::{ReconciliationConfig, ReconciliationPipeline};
