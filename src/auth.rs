//! Authorization Guard: pure predicates over a bill and a caller. Group
//! membership checks live in the service, next to the directory lookup.

use crate::models::SplitBill;

/// Creator or any participant may read the bill, confirm payments on it and
/// view its summary.
pub fn can_view(bill: &SplitBill, user_id: &str) -> bool {
    bill.created_by == user_id || bill.is_participant(user_id)
}

/// The creator may mark any participant paid; a participant may only mark
/// themself.
pub fn can_mark_paid(bill: &SplitBill, caller_id: &str, target_participant_id: &str) -> bool {
    caller_id == bill.created_by || caller_id == target_participant_id
}

/// Reminders and cancellation are creator-only operations.
pub fn is_creator(bill: &SplitBill, user_id: &str) -> bool {
    bill.created_by == user_id
}
