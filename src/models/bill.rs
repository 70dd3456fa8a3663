use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::SPLIT_TOLERANCE;
use crate::models::payment::PaymentRecord;
use crate::models::reminder::Reminder;
use crate::models::user_ref::UserRef;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Percentage,
    Custom,
    Itemized,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub user: UserRef,
    /// Share of the total this user owes.
    pub amount: f64,
    /// Retained for percentage splits so the original ratio stays auditable.
    pub percentage: Option<f64>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_rejected: bool,
}

impl Participant {
    pub fn new(user: UserRef, amount: f64, percentage: Option<f64>) -> Self {
        Participant {
            user,
            amount,
            percentage,
            is_paid: false,
            paid_at: None,
            is_rejected: false,
        }
    }

    /// Paid or rejected shares carry no outstanding obligation.
    pub fn is_resolved(&self) -> bool {
        self.is_paid || self.is_rejected
    }
}

/// The durable record of one shared expense and its repayment state.
///
/// `total_amount` and `group_id` never change after creation; everything else
/// mutates only through the ledger service. Settlement is derived from the
/// participant list, never set directly.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitBill {
    pub id: String,
    pub description: String,
    pub total_amount: f64,
    pub currency: String,
    pub created_by: String,
    /// Absent for a peer-to-peer bill, which group netting ignores.
    pub group_id: Option<String>,
    pub category: Option<String>,
    pub split_type: SplitType,
    pub participants: Vec<Participant>,
    pub payments: Vec<PaymentRecord>,
    pub reminders: Vec<Reminder>,
    pub is_settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
    pub is_cancelled: bool,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SplitBill {
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user.is(user_id))
    }

    pub fn participant_mut(&mut self, user_id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user.is(user_id))
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participant(user_id).is_some()
    }

    pub fn payment(&self, payment_id: &str) -> Option<&PaymentRecord> {
        self.payments.iter().find(|p| p.id == payment_id)
    }

    pub fn payment_mut(&mut self, payment_id: &str) -> Option<&mut PaymentRecord> {
        self.payments.iter_mut().find(|p| p.id == payment_id)
    }

    /// Sum of shares already marked paid.
    pub fn total_paid(&self) -> f64 {
        self.participants
            .iter()
            .filter(|p| p.is_paid)
            .map(|p| p.amount)
            .sum()
    }

    /// Sum of shares neither paid nor rejected.
    pub fn outstanding_amount(&self) -> f64 {
        self.participants
            .iter()
            .filter(|p| !p.is_resolved())
            .map(|p| p.amount)
            .sum()
    }

    /// Re-derives `is_settled` from the participant list. `settled_at` is
    /// written exactly once, on the transition into the settled state.
    pub fn recompute_settlement(&mut self, now: DateTime<Utc>) {
        let settled = self.participants.iter().all(|p| p.is_resolved());
        if settled && !self.is_settled {
            self.settled_at = Some(now);
        }
        self.is_settled = settled;
    }

    /// `|sum(shares) - total| <= tolerance`, the core ledger invariant.
    pub fn shares_balance(&self) -> bool {
        let sum: f64 = self.participants.iter().map(|p| p.amount).sum();
        (sum - self.total_amount).abs() <= SPLIT_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill_with_participants(participants: Vec<Participant>) -> SplitBill {
        let now = Utc::now();
        SplitBill {
            id: "b1".to_string(),
            description: "Dinner".to_string(),
            total_amount: 100.0,
            currency: "INR".to_string(),
            created_by: "u1".to_string(),
            group_id: None,
            category: None,
            split_type: SplitType::Equal,
            participants,
            payments: Vec::new(),
            reminders: Vec::new(),
            is_settled: false,
            settled_at: None,
            is_cancelled: false,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn settlement_is_derived_from_participants() {
        let mut bill = bill_with_participants(vec![
            Participant::new("u1".into(), 50.0, None),
            Participant::new("u2".into(), 50.0, None),
        ]);
        bill.recompute_settlement(Utc::now());
        assert!(!bill.is_settled);

        bill.participant_mut("u1").unwrap().is_paid = true;
        bill.participant_mut("u2").unwrap().is_rejected = true;
        bill.recompute_settlement(Utc::now());
        assert!(bill.is_settled);
        assert!(bill.settled_at.is_some());
    }

    #[test]
    fn settled_at_is_written_once() {
        let mut bill = bill_with_participants(vec![Participant::new("u1".into(), 100.0, None)]);
        bill.participant_mut("u1").unwrap().is_paid = true;
        bill.recompute_settlement(Utc::now());
        let first = bill.settled_at;
        assert!(first.is_some());

        bill.recompute_settlement(Utc::now());
        assert_eq!(bill.settled_at, first);
    }

    #[test]
    fn outstanding_excludes_resolved_shares() {
        let mut bill = bill_with_participants(vec![
            Participant::new("u1".into(), 40.0, None),
            Participant::new("u2".into(), 35.0, None),
            Participant::new("u3".into(), 25.0, None),
        ]);
        bill.participant_mut("u1").unwrap().is_paid = true;
        bill.participant_mut("u3").unwrap().is_rejected = true;
        assert_eq!(bill.total_paid(), 40.0);
        assert_eq!(bill.outstanding_amount(), 35.0);
    }
}
