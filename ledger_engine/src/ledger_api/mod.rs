//! # Ledger public API
//!
//! The `ledger_api` module exposes the programmatic API for the points ledger. The API is modular, so that callers can
//! pick the parts they need.
//!
//! * [`accounts_api`] registers users and answers questions about them: their orders, balances and withdrawals.
//! * [`order_flow_api`] accepts uploaded order numbers and decides who owns them.
//! * [`withdrawal_api`] spends points, retrying transparently when the ledger is contended.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use ledger_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/ledger.db", 25).await?;
//! // SqliteDatabase implements AccountManagement
//! let api = AccountApi::new(db);
//! let balance = api.balance_for_user(user_id).await?;
//! ```
pub mod accounts_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod withdrawal_api;
