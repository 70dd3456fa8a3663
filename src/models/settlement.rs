use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// One pairwise transfer in a settlement plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transfer {
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: f64,
}

/// Result of netting a group's unsettled bills. Recomputed fresh on every
/// call; never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupSettlement {
    pub group_id: String,
    /// Positive: is owed money. Negative: owes money.
    pub balances: HashMap<String, f64>,
    pub transfers: Vec<Transfer>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantStatus {
    pub user_id: String,
    pub amount: f64,
    pub percentage: Option<f64>,
    pub is_paid: bool,
    pub is_rejected: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Read projection of a single bill's repayment state.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSummary {
    pub bill_id: String,
    pub total_owed: f64,
    pub total_paid: f64,
    pub remaining_amount: f64,
    pub is_settled: bool,
    pub participants: Vec<ParticipantStatus>,
}
