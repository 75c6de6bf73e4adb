use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// How an order upload was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOrderResult {
    /// The number is new. It now belongs to the uploader, with status `NEW`.
    Accepted(Order),
    /// The uploader has already submitted this number. Nothing changed.
    AlreadyUploaded(Order),
    /// Somebody else owns this number. Nothing changed, and the owner is not revealed.
    UploadedByAnotherUser,
}

impl SubmitOrderResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOrderResult::Accepted(_))
    }
}
