use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Clone, Serialize)]
pub enum LedgerError {
    /// Percentages do not sum to 100, or the split request is malformed
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Explicit share amounts do not sum to the bill total
    #[error("Share amounts sum to {actual}, expected {expected}")]
    AmountMismatch { expected: f64, actual: f64 },

    /// A computed or supplied share is zero or negative
    #[error("Invalid share for participant {0}")]
    InvalidParticipant(String),

    /// The participant set as a whole is unacceptable
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    /// The same user appears twice in the participant list
    #[error("Duplicate participant {0}")]
    DuplicateParticipant(String),

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Bill with given ID not found
    #[error("Bill {0} not found")]
    BillNotFound(String),

    /// Group with given ID not found
    #[error("Group {0} not found")]
    GroupNotFound(String),

    /// Payment record with given ID not found on the bill
    #[error("Payment {0} not found")]
    PaymentNotFound(String),

    /// Caller may not perform this operation on the bill
    #[error("User {0} is not authorized for this operation")]
    Unauthorized(String),

    /// User is not an active member of the group
    #[error("User {0} is not an active group member")]
    NotGroupMember(String),

    /// Participant share has already been marked paid
    #[error("Participant {0} has already paid")]
    AlreadyPaid(String),

    /// Participant has already rejected their share
    #[error("Participant {0} has already rejected their share")]
    AlreadyRejected(String),

    /// Confirmer already appears on the payment's confirmation list
    #[error("Payment {0} already confirmed by this user")]
    AlreadyConfirmed(String),

    /// Bill was cancelled and refuses further mutation
    #[error("Bill {0} is cancelled")]
    BillCancelled(String),

    /// Cancellation requested twice
    #[error("Bill {0} is already cancelled")]
    BillAlreadyCancelled(String),

    /// Settled bills cannot be cancelled
    #[error("Bill {0} is already settled")]
    BillAlreadySettled(String),

    /// Versioned write lost a race; retried internally
    #[error("Concurrent write detected on bill {0}")]
    WriteConflict(String),

    /// Retries exhausted on a contended bill; caller may retry
    #[error("Concurrent writes on bill {0} exhausted retries")]
    ConflictRetryExhausted(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Audit error: {0}")]
    AuditError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
