use std::{fmt::Display, time::Duration};

use ledger_common::Points;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AccrualApiError;

/// The order statuses the accrual authority reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    /// The authority knows about the order but has not started working on it.
    Registered,
    /// The order will never earn points.
    Invalid,
    /// The authority is calculating the accrual.
    Processing,
    /// The accrual has been calculated. This is final.
    Processed,
}

impl Display for AccrualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccrualStatus::Registered => write!(f, "REGISTERED"),
            AccrualStatus::Invalid => write!(f, "INVALID"),
            AccrualStatus::Processing => write!(f, "PROCESSING"),
            AccrualStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

/// A definitive status report for a single order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualReport {
    pub order: String,
    pub status: AccrualStatus,
    pub accrual: Option<Points>,
}

/// The JSON body of a `200 OK` response, as it comes off the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccrualReportBody {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
}

impl TryFrom<AccrualReportBody> for AccrualReport {
    type Error = AccrualApiError;

    fn try_from(body: AccrualReportBody) -> Result<Self, Self::Error> {
        let accrual = match body.accrual {
            Some(value) if value.is_sign_negative() && !value.is_zero() => {
                return Err(AccrualApiError::MalformedResponse(format!(
                    "Order {} has a negative accrual of {value}",
                    body.order
                )));
            },
            Some(value) => {
                let points =
                    Points::try_from(value).map_err(|e| AccrualApiError::MalformedResponse(e.to_string()))?;
                Some(points)
            },
            None => None,
        };
        Ok(Self { order: body.order, status: body.status, accrual })
    }
}

/// The outcome of a single query against the accrual authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualResponse {
    /// `204 No Content`. The authority has nothing new to say about the order.
    Unchanged,
    /// `429 Too Many Requests`. The caller must not query the authority again for at least this long.
    RateLimited(Duration),
    /// `200 OK` with a definitive status.
    Report(AccrualReport),
}
