use std::{fmt::Display, str::FromStr};

use accrual_tools::{AccrualReport, AccrualStatus};
use chrono::{DateTime, Utc};
use ledger_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::is_valid_luhn;

//--------------------------------------     OrderNumber       ---------------------------------------------------------
/// An order identifier that has passed the Luhn checksum. Numbers are kept as strings so that leading zeros and very
/// long numbers survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid order number")]
pub struct InvalidOrderNumber(pub String);

impl OrderNumber {
    /// Trims surrounding whitespace and checks that what remains is a non-empty string of digits with a valid Luhn
    /// check digit.
    pub fn parse(raw: &str) -> Result<Self, InvalidOrderNumber> {
        let number = raw.trim();
        if is_valid_luhn(number) {
            Ok(Self(number.to_string()))
        } else {
            Err(InvalidOrderNumber(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been uploaded, but the accrual authority has not said anything about it yet.
    New,
    /// The accrual authority knows about the order, but has not started processing it.
    Registered,
    /// The accrual authority is calculating the accrual.
    Processing,
    /// The order will never earn points.
    Invalid,
    /// The accrual has been calculated and credited.
    Processed,
}

impl OrderStatusType {
    /// The statuses the reconciliation pipeline still has to chase.
    pub const NON_TERMINAL: [OrderStatusType; 3] =
        [OrderStatusType::New, OrderStatusType::Registered, OrderStatusType::Processing];

    /// `Invalid` and `Processed` orders never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Invalid | OrderStatusType::Processed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Registered => write!(f, "REGISTERED"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "REGISTERED" => Ok(Self::Registered),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<AccrualStatus> for OrderStatusType {
    fn from(status: AccrualStatus) -> Self {
        match status {
            AccrualStatus::Registered => Self::Registered,
            AccrualStatus::Invalid => Self::Invalid,
            AccrualStatus::Processing => Self::Processing,
            AccrualStatus::Processed => Self::Processed,
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub order_number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatusType,
    /// Only ever set once the order is `Processed`.
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub user_id: i64,
}

impl NewOrder {
    pub fn new(order_number: OrderNumber, user_id: i64) -> Self {
        Self { order_number, user_id }
    }
}

/// A status change reported by the accrual authority, ready to be written to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: OrderStatusType,
    pub accrual: Option<Points>,
}

impl OrderUpdate {
    pub fn new(status: OrderStatusType) -> Self {
        Self { status, accrual: None }
    }

    pub fn with_accrual(mut self, accrual: Points) -> Self {
        self.accrual = Some(accrual);
        self
    }
}

impl From<&AccrualReport> for OrderUpdate {
    fn from(report: &AccrualReport) -> Self {
        let status = OrderStatusType::from(report.status);
        // Any accrual attached to a non-final status is provisional, and never lands on the ledger.
        let accrual = match status {
            OrderStatusType::Processed => Some(report.accrual.unwrap_or_default()),
            _ => None,
        };
        Self { status, accrual }
    }
}

//--------------------------------------     UserAccount       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserAccount {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     Withdrawal        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    /// The reference the points were spent against. This is a Luhn-valid order number, but it need not have been
    /// uploaded.
    pub order_number: String,
    pub amount: Points,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub user_id: i64,
    pub order_number: OrderNumber,
    pub amount: Points,
}

impl NewWithdrawal {
    pub fn new(user_id: i64, order_number: OrderNumber, amount: Points) -> Self {
        Self { user_id, order_number, amount }
    }
}

//--------------------------------------       Balance         ---------------------------------------------------------
/// `current` is the sum of all processed accruals less everything withdrawn. It is never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub current: Points,
    pub withdrawn: Points,
}

impl Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "current: {}, withdrawn: {}", self.current, self.withdrawn)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_numbers_are_trimmed_and_checked() {
        let number = OrderNumber::parse("  12345678903\n").unwrap();
        assert_eq!(number.as_str(), "12345678903");
        assert!(OrderNumber::parse("12345678902").is_err());
        assert!(OrderNumber::parse("").is_err());
        assert!(OrderNumber::parse("   ").is_err());
        assert!(OrderNumber::parse("1234-5678-903").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatusType::Processed.is_terminal());
        assert!(OrderStatusType::Invalid.is_terminal());
        assert!(OrderStatusType::NON_TERMINAL.iter().all(|s| !s.is_terminal()));
    }

    #[test]
    fn status_strings() {
        for s in ["NEW", "REGISTERED", "PROCESSING", "INVALID", "PROCESSED"] {
            assert_eq!(OrderStatusType::from_str(s).unwrap().to_string(), s);
        }
        assert!(OrderStatusType::from_str("Paid").is_err());
    }

    #[test]
    fn provisional_accruals_are_discarded() {
        let report = AccrualReport {
            order: "12345678903".into(),
            status: AccrualStatus::Processing,
            accrual: Some(Points::from(100)),
        };
        assert_eq!(OrderUpdate::from(&report), OrderUpdate::new(OrderStatusType::Processing));
        let report = AccrualReport { status: AccrualStatus::Processed, accrual: Some(Points::from(5050)), ..report };
        assert_eq!(OrderUpdate::from(&report), OrderUpdate::new(OrderStatusType::Processed).with_accrual(5050.into()));
        let report = AccrualReport { accrual: None, ..report };
        assert_eq!(OrderUpdate::from(&report).accrual, Some(Points::default()));
    }
}
