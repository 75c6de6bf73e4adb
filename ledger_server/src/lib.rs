//! # Points ledger server
//! This crate hosts the process that keeps the points ledger up to date. It is responsible for:
//! * Opening (and migrating) the ledger database.
//! * Running the reconciliation pipeline that polls the accrual authority for unfinished orders.
//! * Serving a health check.
//!
//! ## Configuration
//! The server is configured via environment variables, some of which can be overridden on the command line. See
//! [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
pub mod accrual_worker;
pub mod cli;
pub mod config;
pub mod errors;
pub mod routes;
pub mod server;
