//! #  Storage backends.
//!
//! This module defines the contracts that a storage backend has to honour to serve as the ledger behind the points
//! service.
//!
//! * [`LedgerDatabase`] is the write side: user registration, order uploads and withdrawals. Withdrawals are the one
//!   operation with a hard atomicity requirement. See [`LedgerDatabase::withdraw`].
//! * [`AccountManagement`] provides read-only queries about users, their orders, withdrawals and balances.
//! * [`OrderReconciliation`] is the narrow view the reconciliation pipeline has of storage. It lists orders that are
//!   still awaiting a final verdict and writes status updates back.
//! * [`AccrualAuthority`] is the other side of reconciliation: something that can be asked what an order earned.
//!
//! Every future returned by the write and reconciliation traits is `Send`, so that backends can be driven from spawned
//! tasks.
mod account_management;
mod accrual_authority;
mod data_objects;
mod ledger_database;
mod order_reconciliation;

pub use account_management::{AccountApiError, AccountManagement};
pub use accrual_authority::AccrualAuthority;
pub use data_objects::InsertOrderResult;
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use order_reconciliation::OrderReconciliation;
