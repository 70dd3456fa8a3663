pub mod audit;
pub mod bill;
pub mod payment;
pub mod reminder;
pub mod settlement;
pub mod user_ref;

pub use audit::{AuditEntry, BillAudit};
pub use bill::{Participant, SplitBill, SplitType};
pub use payment::{PaymentMethod, PaymentRecord};
pub use reminder::{Reminder, ReminderKind};
pub use settlement::{GroupSettlement, ParticipantStatus, PaymentSummary, Transfer};
pub use user_ref::{UserProfile, UserRef};
