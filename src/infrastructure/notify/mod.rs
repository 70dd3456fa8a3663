use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Events published to the real-time delivery collaborator. At-least-once is
/// acceptable; the ledger does not retry failed publishes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    BillCreated {
        bill_id: String,
        group_id: Option<String>,
        created_by: String,
        total_amount: f64,
    },
    PaymentRecorded {
        bill_id: String,
        payment_id: String,
        from_user_id: String,
        amount: f64,
    },
    SettlementChanged {
        bill_id: String,
        group_id: Option<String>,
        is_settled: bool,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> Result<(), LedgerError>;
}

pub mod in_memory;
