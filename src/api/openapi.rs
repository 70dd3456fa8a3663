use utoipa::OpenApi;

use crate::api::models::{
    AddReminderRequest, CallerRequest, CancelBillRequest, CreateBillRequest, ErrorResponse,
    RecordPaymentRequest,
};
use crate::models::{
    AuditEntry, BillAudit, GroupSettlement, Participant, ParticipantStatus, PaymentMethod,
    PaymentRecord, PaymentSummary, Reminder, ReminderKind, SplitBill, SplitType, Transfer,
    UserProfile, UserRef,
};
use crate::split::ShareSpec;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_bill,
        super::handlers::get_bill,
        super::handlers::record_payment,
        super::handlers::confirm_payment,
        super::handlers::reject_share,
        super::handlers::add_reminder,
        super::handlers::cancel_bill,
        super::handlers::get_payment_summary,
        super::handlers::get_group_settlement,
        super::handlers::get_bill_audits,
        super::handlers::get_audit_log
    ),
    components(schemas(
        CreateBillRequest,
        CallerRequest,
        RecordPaymentRequest,
        AddReminderRequest,
        CancelBillRequest,
        ErrorResponse,
        ShareSpec,
        SplitBill,
        SplitType,
        Participant,
        UserRef,
        UserProfile,
        PaymentRecord,
        PaymentMethod,
        Reminder,
        ReminderKind,
        GroupSettlement,
        Transfer,
        PaymentSummary,
        ParticipantStatus,
        AuditEntry,
        BillAudit
    )),
    info(
        title = "Split Ledger API",
        description = "Split-bill ledger and group settlement engine",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
