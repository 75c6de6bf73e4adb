use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccrualApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the accrual authority: {0}")]
    Transport(String),
    #[error("Malformed response from the accrual authority: {0}")]
    MalformedResponse(String),
    #[error("Unexpected status code from the accrual authority: {0}")]
    UnexpectedStatus(u16),
}
