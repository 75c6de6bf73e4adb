use crate::db_types::Order;

/// The result of uploading an order number. Order numbers are unique across all users, so when the number is already
/// known, the existing record is returned and the caller can decide who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(Order),
    AlreadyExists(Order),
}

impl InsertOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            InsertOrderResult::Inserted(order) | InsertOrderResult::AlreadyExists(order) => order,
        }
    }
}
