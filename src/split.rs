//! Share Calculator: turns a total and a participant list into per-user
//! shares for a chosen split strategy. Pure computation, no storage access.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::SPLIT_TOLERANCE;
use crate::error::LedgerError;
use crate::models::SplitType;

/// Caller-supplied share input. `amount` is required for custom/itemized
/// splits, `percentage` for percentage splits; equal splits need neither.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareSpec {
    pub user_id: String,
    pub amount: Option<f64>,
    pub percentage: Option<f64>,
}

impl ShareSpec {
    pub fn user(user_id: &str) -> Self {
        ShareSpec {
            user_id: user_id.to_string(),
            amount: None,
            percentage: None,
        }
    }

    pub fn amount(user_id: &str, amount: f64) -> Self {
        ShareSpec {
            user_id: user_id.to_string(),
            amount: Some(amount),
            percentage: None,
        }
    }

    pub fn percentage(user_id: &str, percentage: f64) -> Self {
        ShareSpec {
            user_id: user_id.to_string(),
            amount: None,
            percentage: Some(percentage),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComputedShare {
    pub user_id: String,
    pub amount: f64,
    pub percentage: Option<f64>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes per-participant shares. Rounding rule for equal and percentage
/// splits: every share is rounded to two decimals and the last participant
/// absorbs the remainder, so the shares always sum exactly to the total.
pub fn compute_shares(
    total_amount: f64,
    split_type: &SplitType,
    specs: &[ShareSpec],
) -> Result<Vec<ComputedShare>, LedgerError> {
    if specs.is_empty() {
        return Err(LedgerError::InvalidParticipants(
            "at least one participant is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.user_id.as_str()) {
            return Err(LedgerError::DuplicateParticipant(spec.user_id.clone()));
        }
    }

    let shares = match split_type {
        SplitType::Equal => equal_shares(total_amount, specs),
        SplitType::Percentage => percentage_shares(total_amount, specs)?,
        SplitType::Custom | SplitType::Itemized => explicit_shares(total_amount, specs)?,
    };

    for share in &shares {
        if share.amount <= 0.0 {
            return Err(LedgerError::InvalidParticipant(share.user_id.clone()));
        }
    }

    Ok(shares)
}

fn equal_shares(total_amount: f64, specs: &[ShareSpec]) -> Vec<ComputedShare> {
    let base = round2(total_amount / specs.len() as f64);
    let mut allocated = 0.0;
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let amount = if i + 1 == specs.len() {
                round2(total_amount - allocated)
            } else {
                allocated += base;
                base
            };
            ComputedShare {
                user_id: spec.user_id.clone(),
                amount,
                percentage: None,
            }
        })
        .collect()
}

fn percentage_shares(
    total_amount: f64,
    specs: &[ShareSpec],
) -> Result<Vec<ComputedShare>, LedgerError> {
    let mut percent_sum = 0.0;
    for spec in specs {
        let pct = spec.percentage.ok_or_else(|| {
            LedgerError::InvalidSplit(format!("missing percentage for {}", spec.user_id))
        })?;
        if pct <= 0.0 {
            return Err(LedgerError::InvalidParticipant(spec.user_id.clone()));
        }
        percent_sum += pct;
    }
    if (percent_sum - 100.0).abs() > SPLIT_TOLERANCE {
        return Err(LedgerError::InvalidSplit(format!(
            "percentages sum to {percent_sum}, expected 100"
        )));
    }

    let mut allocated = 0.0;
    Ok(specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let pct = spec.percentage.unwrap_or_default();
            let amount = if i + 1 == specs.len() {
                round2(total_amount - allocated)
            } else {
                let share = round2(total_amount * pct / 100.0);
                allocated += share;
                share
            };
            ComputedShare {
                user_id: spec.user_id.clone(),
                amount,
                percentage: Some(pct),
            }
        })
        .collect())
}

fn explicit_shares(
    total_amount: f64,
    specs: &[ShareSpec],
) -> Result<Vec<ComputedShare>, LedgerError> {
    let mut shares = Vec::with_capacity(specs.len());
    let mut sum = 0.0;
    for spec in specs {
        let amount = spec.amount.ok_or_else(|| {
            LedgerError::InvalidSplit(format!("missing amount for {}", spec.user_id))
        })?;
        sum += amount;
        shares.push(ComputedShare {
            user_id: spec.user_id.clone(),
            amount,
            percentage: None,
        });
    }
    if (sum - total_amount).abs() > SPLIT_TOLERANCE {
        return Err(LedgerError::AmountMismatch {
            expected: total_amount,
            actual: round2(sum),
        });
    }
    Ok(shares)
}
