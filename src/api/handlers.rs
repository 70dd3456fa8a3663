use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::api::models::*;
use crate::infrastructure::{
    groups::in_memory::InMemoryGroupDirectory, logging::in_memory::InMemoryAuditSink,
    notify::in_memory::InMemoryNotifier, storage::in_memory::InMemoryBillStore,
};
use crate::models::{AuditEntry, BillAudit, GroupSettlement, PaymentSummary, Reminder, SplitBill};
use crate::service::LedgerService;

pub type AppService =
    LedgerService<InMemoryAuditSink, InMemoryBillStore, InMemoryGroupDirectory, InMemoryNotifier>;

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/bills", post(create_bill))
        .route("/bills/{bill_id}", post(get_bill))
        .route("/bills/{bill_id}/payments", post(record_payment))
        .route(
            "/bills/{bill_id}/payments/{payment_id}/confirm",
            post(confirm_payment),
        )
        .route("/bills/{bill_id}/reject", post(reject_share))
        .route("/bills/{bill_id}/reminders", post(add_reminder))
        .route("/bills/{bill_id}/cancel", post(cancel_bill))
        .route("/bills/{bill_id}/summary", post(get_payment_summary))
        .route("/bills/{bill_id}/audits", post(get_bill_audits))
        .route("/groups/{group_id}/settlement", post(get_group_settlement))
        .route("/logs", get(get_audit_log))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/bills",
    request_body = CreateBillRequest,
    responses(
        (status = 201, description = "Bill created", body = SplitBill),
        (status = 400, description = "Invalid split or input", body = ErrorResponse),
        (status = 403, description = "Caller or participant not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn create_bill(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<SplitBill>), ApiError> {
    let bill = service
        .create_split_bill(
            &req.creator_id,
            req.description,
            req.total_amount,
            req.group_id,
            req.shares,
            req.split_type,
            req.category,
            req.currency,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}",
    params(("bill_id" = String, Path, description = "Bill to fetch")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Bill", body = SplitBill),
        (status = 403, description = "Caller not on the bill", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse)
    )
)]
async fn get_bill(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<SplitBill>, ApiError> {
    let bill = service.get_bill(&bill_id, &req.caller_id).await?;
    Ok(Json(bill))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/payments",
    params(("bill_id" = String, Path, description = "Bill to record a payment on")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Updated bill", body = SplitBill),
        (status = 403, description = "Caller may not mark this participant", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse),
        (status = 409, description = "Share already paid or rejected", body = ErrorResponse),
        (status = 503, description = "Contended bill, retry", body = ErrorResponse)
    )
)]
async fn record_payment(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<Json<SplitBill>, ApiError> {
    let bill = service
        .mark_participant_paid(
            &bill_id,
            &req.caller_id,
            &req.participant_id,
            req.method,
            req.notes,
        )
        .await?;
    Ok(Json(bill))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/payments/{payment_id}/confirm",
    params(
        ("bill_id" = String, Path, description = "Bill the payment belongs to"),
        ("payment_id" = String, Path, description = "Payment to confirm")
    ),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Confirmation recorded"),
        (status = 404, description = "Bill or payment not found", body = ErrorResponse),
        (status = 409, description = "Already confirmed by this user", body = ErrorResponse)
    )
)]
async fn confirm_payment(
    State(service): State<Arc<AppService>>,
    Path((bill_id, payment_id)): Path<(String, String)>,
    Json(req): Json<CallerRequest>,
) -> Result<StatusCode, ApiError> {
    service
        .confirm_payment(&bill_id, &payment_id, &req.caller_id)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/reject",
    params(("bill_id" = String, Path, description = "Bill whose share is declined")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Updated bill", body = SplitBill),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 409, description = "Share already paid or rejected", body = ErrorResponse)
    )
)]
async fn reject_share(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<SplitBill>, ApiError> {
    let bill = service.reject_share(&bill_id, &req.caller_id).await?;
    Ok(Json(bill))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/reminders",
    params(("bill_id" = String, Path, description = "Bill to attach the reminder to")),
    request_body = AddReminderRequest,
    responses(
        (status = 201, description = "Reminder scheduled", body = Reminder),
        (status = 403, description = "Only the creator schedules reminders", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse)
    )
)]
async fn add_reminder(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<AddReminderRequest>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let reminder = service
        .add_reminder(
            &bill_id,
            &req.caller_id,
            &req.target_user_id,
            req.kind,
            req.message,
            req.scheduled_for,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/cancel",
    params(("bill_id" = String, Path, description = "Bill to cancel")),
    request_body = CancelBillRequest,
    responses(
        (status = 200, description = "Cancelled bill", body = SplitBill),
        (status = 403, description = "Only the creator cancels", body = ErrorResponse),
        (status = 409, description = "Already settled or cancelled", body = ErrorResponse)
    )
)]
async fn cancel_bill(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<CancelBillRequest>,
) -> Result<Json<SplitBill>, ApiError> {
    let bill = service
        .cancel_bill(&bill_id, &req.caller_id, req.reason)
        .await?;
    Ok(Json(bill))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/summary",
    params(("bill_id" = String, Path, description = "Bill to summarize")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Payment summary", body = PaymentSummary),
        (status = 403, description = "Caller not on the bill", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse)
    )
)]
async fn get_payment_summary(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<PaymentSummary>, ApiError> {
    let summary = service.get_payment_summary(&bill_id, &req.caller_id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/settlement",
    params(("group_id" = String, Path, description = "Group to net")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Balances and transfer plan", body = GroupSettlement),
        (status = 403, description = "Caller not an active member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
async fn get_group_settlement(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<GroupSettlement>, ApiError> {
    let settlement = service
        .calculate_group_settlement(&group_id, &req.caller_id)
        .await?;
    Ok(Json(settlement))
}

#[utoipa::path(
    post,
    path = "/bills/{bill_id}/audits",
    params(("bill_id" = String, Path, description = "Bill whose audit trail to read")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Bill audit entries", body = [BillAudit]),
        (status = 403, description = "Caller not on the bill", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse)
    )
)]
async fn get_bill_audits(
    State(service): State<Arc<AppService>>,
    Path(bill_id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<Vec<BillAudit>>, ApiError> {
    let audits = service.get_bill_audits(&bill_id, &req.caller_id).await?;
    Ok(Json(audits))
}

#[utoipa::path(
    get,
    path = "/logs",
    responses((status = 200, description = "Application audit log", body = [AuditEntry]))
)]
async fn get_audit_log(
    State(service): State<Arc<AppService>>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let entries = service.get_audit_log().await?;
    Ok(Json(entries))
}
