use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::LedgerError;
use crate::models::{PaymentMethod, ReminderKind, SplitType};
use crate::split::ShareSpec;

// Request structs for JSON payloads. The caller id travels in the body; the
// deployment fronts this service with its session layer.

#[derive(Deserialize, ToSchema)]
pub struct CreateBillRequest {
    pub creator_id: String,
    pub description: String,
    pub total_amount: f64,
    pub group_id: Option<String>,
    pub shares: Vec<ShareSpec>,
    pub split_type: SplitType,
    pub category: Option<String>,
    pub currency: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CallerRequest {
    pub caller_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub caller_id: String,
    pub participant_id: String,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddReminderRequest {
    pub caller_id: String,
    pub target_user_id: String,
    pub kind: ReminderKind,
    pub message: String,
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelBillRequest {
    pub caller_id: String,
    pub reason: Option<String>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub kind: String,
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind) = match &self.0 {
            LedgerError::InvalidSplit(_) => (StatusCode::BAD_REQUEST, "invalid_split"),
            LedgerError::AmountMismatch { .. } => (StatusCode::BAD_REQUEST, "amount_mismatch"),
            LedgerError::InvalidParticipant(_) => (StatusCode::BAD_REQUEST, "invalid_participant"),
            LedgerError::InvalidParticipants(_) => {
                (StatusCode::BAD_REQUEST, "invalid_participants")
            }
            LedgerError::DuplicateParticipant(_) => {
                (StatusCode::BAD_REQUEST, "duplicate_participant")
            }
            LedgerError::InvalidInput(_, _) => (StatusCode::BAD_REQUEST, "invalid_input"),
            LedgerError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
            LedgerError::NotGroupMember(_) => (StatusCode::FORBIDDEN, "not_group_member"),
            LedgerError::BillNotFound(_) => (StatusCode::NOT_FOUND, "bill_not_found"),
            LedgerError::GroupNotFound(_) => (StatusCode::NOT_FOUND, "group_not_found"),
            LedgerError::PaymentNotFound(_) => (StatusCode::NOT_FOUND, "payment_not_found"),
            LedgerError::AlreadyPaid(_) => (StatusCode::CONFLICT, "already_paid"),
            LedgerError::AlreadyRejected(_) => (StatusCode::CONFLICT, "already_rejected"),
            LedgerError::AlreadyConfirmed(_) => (StatusCode::CONFLICT, "already_confirmed"),
            LedgerError::BillCancelled(_) => (StatusCode::CONFLICT, "bill_cancelled"),
            LedgerError::BillAlreadyCancelled(_) => {
                (StatusCode::CONFLICT, "bill_already_cancelled")
            }
            LedgerError::BillAlreadySettled(_) => (StatusCode::CONFLICT, "bill_already_settled"),
            LedgerError::WriteConflict(_) | LedgerError::ConflictRetryExhausted(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "conflict_retry_exhausted")
            }
            LedgerError::StorageError(_)
            | LedgerError::AuditError(_)
            | LedgerError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = ErrorResponse {
            kind: kind.to_string(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
