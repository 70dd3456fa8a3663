use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Upcoming,
    Due,
    Overdue,
}

/// A due reminder attached to a bill. Delivery is an external concern; the
/// scheduler collaborator reads these and writes `sent_at` back.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub kind: ReminderKind,
    pub message: String,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub escalation_level: u8,
}
