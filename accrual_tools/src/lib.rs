//! # Accrual authority client
//!
//! The accrual authority is the external service that decides how many points an order is worth. This crate wraps its
//! single endpoint, `GET {base}/api/orders/{number}`, and maps each response onto an [`AccrualResponse`].
//!
//! The client performs exactly one request per call. Retry cadence and rate-limit back-off are left to the caller.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::AccrualApi;
pub use config::AccrualConfig;
pub use data_objects::{AccrualReport, AccrualResponse, AccrualStatus};
pub use error::AccrualApiError;
