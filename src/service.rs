use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::constants::{
    BILL_CANCELLED, BILL_CREATED, DEFAULT_CURRENCY, MAX_BILL_AMOUNT, MAX_DESCRIPTION_LENGTH,
    MAX_WRITE_RETRIES, PAYMENT_CONFIRMED, PAYMENT_RECORDED, REMINDER_SCHEDULED,
    SETTLEMENT_CALCULATED, SHARE_REJECTED,
};
use crate::error::{FieldError, LedgerError};
use crate::infrastructure::groups::GroupDirectory;
use crate::infrastructure::logging::AuditSink;
use crate::infrastructure::notify::{LedgerEvent, Notifier};
use crate::infrastructure::storage::{BillStore, VersionedBill};
use crate::models::{
    AuditEntry, BillAudit, GroupSettlement, Participant, ParticipantStatus, PaymentMethod,
    PaymentRecord, PaymentSummary, Reminder, ReminderKind, SplitBill, SplitType,
};
use crate::netting;
use crate::split::{self, round2, ShareSpec};

/// The ledger engine. Every read and mutation of a bill goes through here;
/// the optimistic-concurrency retry lives in one place instead of being
/// duplicated per call site.
pub struct LedgerService<A: AuditSink, S: BillStore, G: GroupDirectory, N: Notifier> {
    storage: S,
    audit: A,
    groups: G,
    notifier: N,
}

impl<A: AuditSink, S: BillStore, G: GroupDirectory, N: Notifier> LedgerService<A, S, G, N> {
    pub fn new(storage: S, audit: A, groups: G, notifier: N) -> Self {
        LedgerService {
            storage,
            audit,
            groups,
            notifier,
        }
    }

    // BILL CREATION

    #[allow(clippy::too_many_arguments)]
    pub async fn create_split_bill(
        &self,
        creator_id: &str,
        description: String,
        total_amount: f64,
        group_id: Option<String>,
        shares: Vec<ShareSpec>,
        split_type: SplitType,
        category: Option<String>,
        currency: Option<String>,
    ) -> Result<SplitBill, LedgerError> {
        info!(
            "Creating {:?} bill for {} by {}",
            split_type, total_amount, creator_id
        );
        self.validate_string_input("description", &description, MAX_DESCRIPTION_LENGTH)?;
        self.validate_amount_input("total_amount", total_amount)?;

        let computed = split::compute_shares(total_amount, &split_type, &shares)?;

        match group_id.as_deref() {
            Some(gid) => {
                if !self.groups.group_exists(gid).await? {
                    return Err(LedgerError::GroupNotFound(gid.to_string()));
                }
                if !self.groups.is_active_member(gid, creator_id).await? {
                    return Err(LedgerError::NotGroupMember(creator_id.to_string()));
                }
                for share in &computed {
                    if !self.groups.is_active_member(gid, &share.user_id).await? {
                        return Err(LedgerError::NotGroupMember(share.user_id.clone()));
                    }
                }
            }
            None => {
                // Direct bills must involve someone other than the creator.
                if !computed.iter().any(|s| s.user_id != creator_id) {
                    return Err(LedgerError::InvalidParticipants(
                        "a direct bill needs at least one participant besides the creator"
                            .to_string(),
                    ));
                }
            }
        }

        let now = Utc::now();
        let participants: Vec<Participant> = computed
            .into_iter()
            .map(|share| {
                let mut participant =
                    Participant::new(share.user_id.clone().into(), share.amount, share.percentage);
                // Creator fronted the money; their own share starts paid.
                if share.user_id == creator_id {
                    participant.is_paid = true;
                    participant.paid_at = Some(now);
                }
                participant
            })
            .collect();

        let mut bill = SplitBill {
            id: Uuid::new_v4().to_string(),
            description,
            total_amount,
            currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            created_by: creator_id.to_string(),
            group_id,
            category,
            split_type,
            participants,
            payments: Vec::new(),
            reminders: Vec::new(),
            is_settled: false,
            settled_at: None,
            is_cancelled: false,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };
        bill.recompute_settlement(now);

        // Re-checked here no matter which component computed the shares.
        if !bill.shares_balance() {
            let actual: f64 = bill.participants.iter().map(|p| p.amount).sum();
            return Err(LedgerError::AmountMismatch {
                expected: total_amount,
                actual: round2(actual),
            });
        }

        self.storage.insert_bill(bill.clone()).await?;
        debug!("Bill created with ID: {}", bill.id);

        self.log_and_audit(
            Some(&bill.id),
            BILL_CREATED,
            json!({
                "bill_id": bill.id,
                "group_id": bill.group_id,
                "total_amount": bill.total_amount,
                "participant_count": bill.participants.len(),
            }),
            Some(creator_id),
        )
        .await?;
        self.notify(LedgerEvent::BillCreated {
            bill_id: bill.id.clone(),
            group_id: bill.group_id.clone(),
            created_by: bill.created_by.clone(),
            total_amount: bill.total_amount,
        })
        .await;

        Ok(bill)
    }

    // PAYMENT RECORDER

    pub async fn mark_participant_paid(
        &self,
        bill_id: &str,
        caller_id: &str,
        target_participant_id: &str,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<SplitBill, LedgerError> {
        info!(
            "User {} marking participant {} paid on bill {}",
            caller_id, target_participant_id, bill_id
        );
        let (bill, payment_id) = self
            .mutate_bill(bill_id, |bill| {
                if bill.is_cancelled {
                    return Err(LedgerError::BillCancelled(bill.id.clone()));
                }
                if !auth::can_mark_paid(bill, caller_id, target_participant_id) {
                    warn!(
                        "User {} not permitted to mark {} paid on bill {}",
                        caller_id, target_participant_id, bill.id
                    );
                    return Err(LedgerError::Unauthorized(caller_id.to_string()));
                }

                let creator = bill.created_by.clone();
                let now = Utc::now();
                let participant =
                    bill.participant_mut(target_participant_id)
                        .ok_or_else(|| {
                            LedgerError::InvalidParticipants(format!(
                                "{target_participant_id} is not a participant of this bill"
                            ))
                        })?;
                if participant.is_rejected {
                    return Err(LedgerError::AlreadyRejected(
                        target_participant_id.to_string(),
                    ));
                }
                if participant.is_paid {
                    return Err(LedgerError::AlreadyPaid(target_participant_id.to_string()));
                }

                participant.is_paid = true;
                participant.paid_at = Some(now);
                let amount = participant.amount;

                let payment = PaymentRecord {
                    id: Uuid::new_v4().to_string(),
                    from_user_id: target_participant_id.to_string(),
                    to_user_id: creator.clone(),
                    amount,
                    method: method.clone(),
                    notes: notes.clone(),
                    paid_at: now,
                    confirmed_by: vec![creator],
                };
                let payment_id = payment.id.clone();
                bill.payments.push(payment);

                bill.recompute_settlement(now);
                Ok(payment_id)
            })
            .await?;

        self.log_and_audit(
            Some(bill_id),
            PAYMENT_RECORDED,
            json!({
                "bill_id": bill_id,
                "payment_id": payment_id,
                "participant_id": target_participant_id,
                "settled": bill.is_settled,
            }),
            Some(caller_id),
        )
        .await?;

        let amount = bill
            .participant(target_participant_id)
            .map(|p| p.amount)
            .unwrap_or_default();
        self.notify(LedgerEvent::PaymentRecorded {
            bill_id: bill.id.clone(),
            payment_id,
            from_user_id: target_participant_id.to_string(),
            amount,
        })
        .await;
        if bill.is_settled {
            self.notify(LedgerEvent::SettlementChanged {
                bill_id: bill.id.clone(),
                group_id: bill.group_id.clone(),
                is_settled: true,
            })
            .await;
        }

        Ok(bill)
    }

    // CONFIRMATION WORKFLOW

    pub async fn confirm_payment(
        &self,
        bill_id: &str,
        payment_id: &str,
        caller_id: &str,
    ) -> Result<(), LedgerError> {
        info!(
            "User {} confirming payment {} on bill {}",
            caller_id, payment_id, bill_id
        );
        self.mutate_bill(bill_id, |bill| {
            if bill.is_cancelled {
                return Err(LedgerError::BillCancelled(bill.id.clone()));
            }
            if !auth::can_view(bill, caller_id) {
                return Err(LedgerError::Unauthorized(caller_id.to_string()));
            }
            let payment = bill
                .payment_mut(payment_id)
                .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))?;
            if payment.confirmed_by.iter().any(|c| c == caller_id) {
                return Err(LedgerError::AlreadyConfirmed(payment_id.to_string()));
            }
            payment.confirmed_by.push(caller_id.to_string());
            Ok(())
        })
        .await?;

        self.log_and_audit(
            Some(bill_id),
            PAYMENT_CONFIRMED,
            json!({ "bill_id": bill_id, "payment_id": payment_id }),
            Some(caller_id),
        )
        .await
    }

    // SHARE REJECTION

    pub async fn reject_share(
        &self,
        bill_id: &str,
        caller_id: &str,
    ) -> Result<SplitBill, LedgerError> {
        info!("User {} rejecting their share on bill {}", caller_id, bill_id);
        let (bill, _) = self
            .mutate_bill(bill_id, |bill| {
                if bill.is_cancelled {
                    return Err(LedgerError::BillCancelled(bill.id.clone()));
                }
                let now = Utc::now();
                // Declining is personal: only the participant themself.
                let participant = bill
                    .participant_mut(caller_id)
                    .ok_or_else(|| LedgerError::Unauthorized(caller_id.to_string()))?;
                if participant.is_paid {
                    return Err(LedgerError::AlreadyPaid(caller_id.to_string()));
                }
                if participant.is_rejected {
                    return Err(LedgerError::AlreadyRejected(caller_id.to_string()));
                }
                participant.is_rejected = true;
                bill.recompute_settlement(now);
                Ok(())
            })
            .await?;

        self.log_and_audit(
            Some(bill_id),
            SHARE_REJECTED,
            json!({ "bill_id": bill_id, "settled": bill.is_settled }),
            Some(caller_id),
        )
        .await?;
        if bill.is_settled {
            self.notify(LedgerEvent::SettlementChanged {
                bill_id: bill.id.clone(),
                group_id: bill.group_id.clone(),
                is_settled: true,
            })
            .await;
        }

        Ok(bill)
    }

    // REMINDERS

    pub async fn add_reminder(
        &self,
        bill_id: &str,
        caller_id: &str,
        target_user_id: &str,
        kind: ReminderKind,
        message: String,
        scheduled_for: chrono::DateTime<Utc>,
    ) -> Result<Reminder, LedgerError> {
        info!(
            "User {} scheduling {:?} reminder for {} on bill {}",
            caller_id, kind, target_user_id, bill_id
        );
        self.validate_string_input("message", &message, MAX_DESCRIPTION_LENGTH)?;

        let (_, reminder) = self
            .mutate_bill(bill_id, |bill| {
                if bill.is_cancelled {
                    return Err(LedgerError::BillCancelled(bill.id.clone()));
                }
                if !auth::is_creator(bill, caller_id) {
                    return Err(LedgerError::Unauthorized(caller_id.to_string()));
                }
                if !bill.is_participant(target_user_id) {
                    return Err(LedgerError::InvalidParticipants(format!(
                        "{target_user_id} is not a participant of this bill"
                    )));
                }
                let reminder = Reminder {
                    id: Uuid::new_v4().to_string(),
                    user_id: target_user_id.to_string(),
                    kind: kind.clone(),
                    message: message.clone(),
                    scheduled_for,
                    sent_at: None,
                    is_read: false,
                    escalation_level: 0,
                };
                bill.reminders.push(reminder.clone());
                Ok(reminder)
            })
            .await?;

        self.log_and_audit(
            Some(bill_id),
            REMINDER_SCHEDULED,
            json!({
                "bill_id": bill_id,
                "reminder_id": reminder.id,
                "target_user_id": target_user_id,
            }),
            Some(caller_id),
        )
        .await?;

        Ok(reminder)
    }

    // CANCELLATION

    pub async fn cancel_bill(
        &self,
        bill_id: &str,
        caller_id: &str,
        reason: Option<String>,
    ) -> Result<SplitBill, LedgerError> {
        info!("User {} cancelling bill {}", caller_id, bill_id);
        let (bill, _) = self
            .mutate_bill(bill_id, |bill| {
                if !auth::is_creator(bill, caller_id) {
                    return Err(LedgerError::Unauthorized(caller_id.to_string()));
                }
                if bill.is_cancelled {
                    return Err(LedgerError::BillAlreadyCancelled(bill.id.clone()));
                }
                if bill.is_settled {
                    return Err(LedgerError::BillAlreadySettled(bill.id.clone()));
                }
                bill.is_cancelled = true;
                bill.cancel_reason = reason.clone();
                Ok(())
            })
            .await?;

        self.log_and_audit(
            Some(bill_id),
            BILL_CANCELLED,
            json!({ "bill_id": bill_id, "reason": bill.cancel_reason }),
            Some(caller_id),
        )
        .await?;

        Ok(bill)
    }

    // GROUP NETTING

    pub async fn calculate_group_settlement(
        &self,
        group_id: &str,
        caller_id: &str,
    ) -> Result<GroupSettlement, LedgerError> {
        debug!(
            "Calculating settlement for group {} on behalf of {}",
            group_id, caller_id
        );
        if !self.groups.group_exists(group_id).await? {
            return Err(LedgerError::GroupNotFound(group_id.to_string()));
        }
        if !self.groups.is_active_member(group_id, caller_id).await? {
            return Err(LedgerError::Unauthorized(caller_id.to_string()));
        }

        // Recomputed fresh on every call; nothing here is cached.
        let bills = self.storage.list_open_bills_by_group(group_id).await?;
        let balances: HashMap<String, f64> = netting::net_balances(&bills)
            .into_iter()
            .map(|(user, balance)| (user, round2(balance)))
            .collect();
        let transfers = netting::settlement_transfers(&balances);

        self.log_and_audit(
            None,
            SETTLEMENT_CALCULATED,
            json!({
                "group_id": group_id,
                "open_bills": bills.len(),
                "transfer_count": transfers.len(),
            }),
            Some(caller_id),
        )
        .await?;

        Ok(GroupSettlement {
            group_id: group_id.to_string(),
            balances,
            transfers,
            computed_at: Utc::now(),
        })
    }

    // READS

    pub async fn get_bill(&self, bill_id: &str, caller_id: &str) -> Result<SplitBill, LedgerError> {
        let bill = self.load_bill(bill_id).await?;
        if !auth::can_view(&bill, caller_id) {
            return Err(LedgerError::Unauthorized(caller_id.to_string()));
        }
        Ok(bill)
    }

    pub async fn get_payment_summary(
        &self,
        bill_id: &str,
        caller_id: &str,
    ) -> Result<PaymentSummary, LedgerError> {
        let bill = self.get_bill(bill_id, caller_id).await?;
        let participants = bill
            .participants
            .iter()
            .map(|p| ParticipantStatus {
                user_id: p.user.id().to_string(),
                amount: p.amount,
                percentage: p.percentage,
                is_paid: p.is_paid,
                is_rejected: p.is_rejected,
                paid_at: p.paid_at,
            })
            .collect();
        Ok(PaymentSummary {
            bill_id: bill.id.clone(),
            total_owed: bill.total_amount,
            total_paid: round2(bill.total_paid()),
            remaining_amount: round2(bill.outstanding_amount()),
            is_settled: bill.is_settled,
            participants,
        })
    }

    pub async fn get_bill_audits(
        &self,
        bill_id: &str,
        caller_id: &str,
    ) -> Result<Vec<BillAudit>, LedgerError> {
        let bill = self.load_bill(bill_id).await?;
        if !auth::can_view(&bill, caller_id) {
            return Err(LedgerError::Unauthorized(caller_id.to_string()));
        }
        self.storage.get_bill_audits(bill_id).await
    }

    pub async fn get_audit_log(&self) -> Result<Vec<AuditEntry>, LedgerError> {
        self.audit.get_entries().await
    }

    // INTERNALS

    async fn load_bill(&self, bill_id: &str) -> Result<SplitBill, LedgerError> {
        Ok(self
            .storage
            .get_bill(bill_id)
            .await?
            .ok_or_else(|| LedgerError::BillNotFound(bill_id.to_string()))?
            .bill)
    }

    /// Versioned read-modify-write with bounded retry. Validation errors out
    /// of `apply` abort immediately; only a lost version race is retried.
    async fn mutate_bill<T, F>(&self, bill_id: &str, mut apply: F) -> Result<(SplitBill, T), LedgerError>
    where
        F: FnMut(&mut SplitBill) -> Result<T, LedgerError>,
    {
        let mut attempts = 0;
        loop {
            let VersionedBill { mut bill, version } = self
                .storage
                .get_bill(bill_id)
                .await?
                .ok_or_else(|| LedgerError::BillNotFound(bill_id.to_string()))?;
            let out = apply(&mut bill)?;
            bill.updated_at = Utc::now();
            match self.storage.update_bill(bill.clone(), version).await {
                Ok(_) => return Ok((bill, out)),
                Err(LedgerError::WriteConflict(_)) => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_RETRIES {
                        warn!("Write retries exhausted on bill {}", bill_id);
                        return Err(LedgerError::ConflictRetryExhausted(bill_id.to_string()));
                    }
                    debug!("Retrying contended write on bill {}", bill_id);
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn log_and_audit(
        &self,
        bill_id: Option<&str>,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), LedgerError> {
        self.audit
            .log_action(action, details.clone(), user_id)
            .await?;
        if let Some(bid) = bill_id {
            self.storage
                .save_bill_audit(BillAudit {
                    id: Uuid::new_v4().to_string(),
                    bill_id: bid.to_string(),
                    action: action.to_string(),
                    user_id: user_id.map(String::from),
                    details,
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    /// Fire-and-forget: delivery failures are logged, never surfaced.
    async fn notify(&self, event: LedgerEvent) {
        if let Err(err) = self.notifier.publish(event).await {
            warn!("Failed to publish ledger event: {}", err);
        }
    }

    fn validate_string_input(
        &self,
        field: &str,
        value: &str,
        max_length: usize,
    ) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {field}"),
                    description: format!("{field} cannot be empty"),
                },
            ));
        }
        if value.len() > max_length {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{field} too long"),
                    description: format!("{field} cannot exceed {max_length} characters"),
                },
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), LedgerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: "Invalid amount".to_string(),
                    description: "Amount must be a positive finite number".to_string(),
                },
            ));
        }
        if amount > MAX_BILL_AMOUNT {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: "Amount too large".to_string(),
                    description: format!("Amount cannot exceed {MAX_BILL_AMOUNT}"),
                },
            ));
        }
        let cents = amount * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: "Invalid amount".to_string(),
                    description: "Amount cannot have more than 2 decimal places".to_string(),
                },
            ));
        }
        Ok(())
    }
}
