//! Group Netting: aggregates per-member balances across a set of bills and
//! reduces them to a small list of pairwise transfers.
//!
//! Unsettled bills enter at face value: the creator is credited the full
//! total and every participant (creator included) is debited their share, so
//! balances always conserve to zero. Settled and cancelled bills carry no
//! outstanding debt and are skipped.

use std::collections::HashMap;

use crate::constants::SPLIT_TOLERANCE;
use crate::models::{SplitBill, Transfer};
use crate::split::round2;

/// Net balance per member. Positive means the member is owed money.
pub fn net_balances(bills: &[SplitBill]) -> HashMap<String, f64> {
    let mut balances: HashMap<String, f64> = HashMap::new();

    for bill in bills.iter().filter(|b| !b.is_settled && !b.is_cancelled) {
        *balances.entry(bill.created_by.clone()).or_insert(0.0) += bill.total_amount;
        for participant in &bill.participants {
            *balances
                .entry(participant.user.id().to_string())
                .or_insert(0.0) -= participant.amount;
        }
    }

    balances
}

/// Greedy plan: repeatedly match the largest creditor against the largest
/// debtor. Not globally transaction-count-optimal, but deterministic (ties
/// broken by user id) and cheap for the small groups this serves.
pub fn settlement_transfers(balances: &HashMap<String, f64>) -> Vec<Transfer> {
    let mut creditors: Vec<(String, f64)> = balances
        .iter()
        .filter(|(_, &bal)| bal > SPLIT_TOLERANCE)
        .map(|(user, &bal)| (user.clone(), bal))
        .collect();
    let mut debtors: Vec<(String, f64)> = balances
        .iter()
        .filter(|(_, &bal)| bal < -SPLIT_TOLERANCE)
        .map(|(user, &bal)| (user.clone(), -bal))
        .collect();

    let by_amount_desc = |a: &(String, f64), b: &(String, f64)| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    };
    creditors.sort_by(by_amount_desc);
    debtors.sort_by(by_amount_desc);

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let settled = debtors[i].1.min(creditors[j].1);

        if settled > SPLIT_TOLERANCE {
            transfers.push(Transfer {
                from_user_id: debtors[i].0.clone(),
                to_user_id: creditors[j].0.clone(),
                amount: round2(settled),
            });
        }

        debtors[i].1 -= settled;
        creditors[j].1 -= settled;

        if debtors[i].1 <= SPLIT_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 <= SPLIT_TOLERANCE {
            j += 1;
        }
    }

    transfers
}
