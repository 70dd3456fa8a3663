use crate::error::LedgerError;
use crate::infrastructure::notify::LedgerEvent;
use crate::models::{PaymentMethod, SplitType};
use crate::split::ShareSpec;
use crate::tests::{create_test_context, TestContext};

async fn four_way_bill(ctx: &TestContext) -> String {
    // "u4" is the creator; the other three owe their share back.
    ctx.service
        .create_split_bill(
            "u4",
            "Weekend trip".to_string(),
            200.0,
            None,
            ["u1", "u2", "u3", "u4"]
                .iter()
                .map(|id| ShareSpec::user(id))
                .collect(),
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn settlement_flips_only_when_every_share_is_resolved() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let bill = ctx
        .service
        .mark_participant_paid(&bill_id, "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap();
    assert!(!bill.is_settled);

    let bill = ctx
        .service
        .mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Cash, None)
        .await
        .unwrap();
    assert!(!bill.is_settled);
    assert!(bill.settled_at.is_none());

    let bill = ctx
        .service
        .mark_participant_paid(&bill_id, "u3", "u3", PaymentMethod::Card, None)
        .await
        .unwrap();
    assert!(bill.is_settled);
    let settled_at = bill.settled_at.expect("settled_at set on transition");

    // The timestamp does not move afterwards.
    let bill = ctx.service.get_bill(&bill_id, "u4").await.unwrap();
    assert_eq!(bill.settled_at, Some(settled_at));
}

#[tokio::test]
async fn payment_record_flows_back_to_the_creator() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let bill = ctx
        .service
        .mark_participant_paid(
            &bill_id,
            "u1",
            "u1",
            PaymentMethod::Upi,
            Some("gpay ref 123".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(bill.payments.len(), 1);
    let payment = &bill.payments[0];
    assert_eq!(payment.from_user_id, "u1");
    assert_eq!(payment.to_user_id, "u4");
    assert_eq!(payment.amount, 50.0);
    assert_eq!(payment.notes.as_deref(), Some("gpay ref 123"));
    // Auto-confirmed by the creator on record.
    assert_eq!(payment.confirmed_by, vec!["u4".to_string()]);

    let participant = bill.participant("u1").unwrap();
    assert!(participant.is_paid);
    assert!(participant.paid_at.is_some());
}

#[tokio::test]
async fn creator_can_mark_any_participant_paid() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let bill = ctx
        .service
        .mark_participant_paid(&bill_id, "u4", "u2", PaymentMethod::Cash, None)
        .await
        .unwrap();
    assert!(bill.participant("u2").unwrap().is_paid);
}

#[tokio::test]
async fn participants_cannot_mark_each_other_paid() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let err = ctx
        .service
        .mark_participant_paid(&bill_id, "u1", "u2", PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(ref id) if id == "u1"));

    let err = ctx
        .service
        .mark_participant_paid(&bill_id, "stranger", "u2", PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(_)));
}

#[tokio::test]
async fn repeated_mark_paid_is_a_benign_conflict() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    ctx.service
        .mark_participant_paid(&bill_id, "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap();
    let err = ctx
        .service
        .mark_participant_paid(&bill_id, "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyPaid(ref id) if id == "u1"));

    // No duplicate payment entry was appended.
    let bill = ctx.service.get_bill(&bill_id, "u1").await.unwrap();
    assert_eq!(bill.payments.len(), 1);
}

#[tokio::test]
async fn missing_bill_is_not_found() {
    let ctx = create_test_context();
    let err = ctx
        .service
        .mark_participant_paid("missing", "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::BillNotFound(_)));
}

#[tokio::test]
async fn payment_and_settlement_events_are_published() {
    let ctx = create_test_context();
    let bill_id = ctx
        .service
        .create_split_bill(
            "u1",
            "Cab".to_string(),
            60.0,
            None,
            vec![ShareSpec::user("u1"), ShareSpec::user("u2")],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap()
        .id;

    ctx.service
        .mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Upi, None)
        .await
        .unwrap();

    let events = ctx.notifier.events().await;
    assert!(events
        .iter()
        .any(|e| matches!(e, LedgerEvent::PaymentRecorded { from_user_id, .. } if from_user_id == "u2")));
    let settled_events: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, LedgerEvent::SettlementChanged { is_settled: true, .. }))
        .collect();
    assert_eq!(settled_events.len(), 1);
}

#[tokio::test]
async fn confirmation_is_an_audit_trail_only() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let bill = ctx
        .service
        .mark_participant_paid(&bill_id, "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap();
    let payment_id = bill.payments[0].id.clone();
    let was_settled = bill.is_settled;

    ctx.service
        .confirm_payment(&bill_id, &payment_id, "u2")
        .await
        .unwrap();

    let bill = ctx.service.get_bill(&bill_id, "u1").await.unwrap();
    let payment = bill.payment(&payment_id).unwrap();
    assert!(payment.confirmed_by.contains(&"u2".to_string()));
    assert_eq!(bill.is_settled, was_settled);

    let err = ctx
        .service
        .confirm_payment(&bill_id, &payment_id, "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyConfirmed(_)));

    let err = ctx
        .service
        .confirm_payment(&bill_id, &payment_id, "stranger")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(_)));

    let err = ctx
        .service
        .confirm_payment(&bill_id, "missing", "u3")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::PaymentNotFound(_)));
}

#[tokio::test]
async fn rejection_is_personal_and_exclusive_with_payment() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    let bill = ctx.service.reject_share(&bill_id, "u1").await.unwrap();
    assert!(bill.participant("u1").unwrap().is_rejected);

    // A rejected share cannot be paid, and vice versa.
    let err = ctx
        .service
        .mark_participant_paid(&bill_id, "u4", "u1", PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyRejected(_)));

    ctx.service
        .mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Upi, None)
        .await
        .unwrap();
    let err = ctx.service.reject_share(&bill_id, "u2").await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyPaid(_)));

    let err = ctx.service.reject_share(&bill_id, "u1").await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyRejected(_)));

    let err = ctx
        .service
        .reject_share(&bill_id, "stranger")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(_)));
}

#[tokio::test]
async fn rejection_can_complete_settlement() {
    let ctx = create_test_context();
    let bill_id = ctx
        .service
        .create_split_bill(
            "u1",
            "Cab".to_string(),
            60.0,
            None,
            vec![ShareSpec::user("u1"), ShareSpec::user("u2")],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap()
        .id;

    let bill = ctx.service.reject_share(&bill_id, "u2").await.unwrap();
    assert!(bill.is_settled);
    assert!(bill.settled_at.is_some());
}

#[tokio::test]
async fn payment_summary_tracks_the_breakdown() {
    let ctx = create_test_context();
    let bill_id = four_way_bill(&ctx).await;

    ctx.service
        .mark_participant_paid(&bill_id, "u1", "u1", PaymentMethod::Upi, None)
        .await
        .unwrap();
    ctx.service.reject_share(&bill_id, "u3").await.unwrap();

    let summary = ctx
        .service
        .get_payment_summary(&bill_id, "u4")
        .await
        .unwrap();
    assert_eq!(summary.total_owed, 200.0);
    // Creator's pre-paid share plus u1's payment.
    assert_eq!(summary.total_paid, 100.0);
    // Only u2's share is still outstanding; u3 declined.
    assert_eq!(summary.remaining_amount, 50.0);
    assert!(!summary.is_settled);
    assert_eq!(summary.participants.len(), 4);

    let u3 = summary
        .participants
        .iter()
        .find(|p| p.user_id == "u3")
        .unwrap();
    assert!(u3.is_rejected);

    let err = ctx
        .service
        .get_payment_summary(&bill_id, "stranger")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized(_)));
}
