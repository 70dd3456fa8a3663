use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Card,
    Cash,
    BankTransfer,
    Other,
}

/// One repayment event on a bill. Append-only: money flows from a
/// participant back to whoever fronted the expense.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    pub id: String,
    pub from_user_id: String,
    /// Always the bill creator.
    pub to_user_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
    /// Users who acknowledged this payment. Audit trail only.
    pub confirmed_by: Vec<String>,
}
