//! Status transitions: payment, verification, rejection and the
//! conditional-update contract.

mod common;

use common::{build_receipt, sample_input, test_service, TEST_SECRET};
use receipt_service::models::{ReceiptStatus, StatusUpdate};
use service_core::error::AppError;

#[tokio::test]
async fn mark_paid_sets_timestamp_and_is_idempotent() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    assert!(receipt.paid_at.is_none());

    let paid = service.mark_paid(&receipt.id).await.expect("mark_paid failed");
    assert_eq!(paid.status, ReceiptStatus::Paid);
    assert!(paid.paid_at.is_some());

    // Re-entry from paid is allowed
    let paid_again = service.mark_paid(&receipt.id).await.expect("second mark_paid failed");
    assert_eq!(paid_again.status, ReceiptStatus::Paid);

    // Monetary fields and hash untouched
    assert_eq!(paid_again.total, receipt.total);
    assert_eq!(paid_again.integrity_hash, receipt.integrity_hash);
}

#[tokio::test]
async fn mark_verified_records_audit_fields() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    service.mark_paid(&receipt.id).await.expect("mark_paid failed");

    let verified = service
        .mark_verified(&receipt.id, "front-desk", Some("ID checked".to_string()))
        .await
        .expect("mark_verified failed");

    assert_eq!(verified.status, ReceiptStatus::Verified);
    assert_eq!(verified.verified_by.as_deref(), Some("front-desk"));
    assert!(verified.verified_at.is_some());
    assert_eq!(verified.verification_notes.as_deref(), Some("ID checked"));
}

#[tokio::test]
async fn mark_verified_without_notes_stores_empty_notes() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    let verified = service
        .mark_verified(&receipt.id, "front-desk", None)
        .await
        .expect("mark_verified failed");

    assert_eq!(verified.verification_notes.as_deref(), Some(""));
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");

    let result = service.reject(&receipt.id, "front-desk", "").await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let result = service.reject(&receipt.id, "front-desk", "   ").await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // Status unchanged after the failed rejections
    let unchanged = service.get(&receipt.id).await.expect("get failed");
    assert_eq!(unchanged.status, ReceiptStatus::Pending);
}

#[tokio::test]
async fn reject_records_reason_in_notes() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    let rejected = service
        .reject(&receipt.id, "front-desk", "Amount does not match the booking")
        .await
        .expect("reject failed");

    assert_eq!(rejected.status, ReceiptStatus::Rejected);
    assert_eq!(
        rejected.verification_notes.as_deref(),
        Some("Amount does not match the booking")
    );
    assert_eq!(rejected.verified_by.as_deref(), Some("front-desk"));
    assert!(rejected.verified_at.is_some());
}

#[tokio::test]
async fn rejected_receipt_cannot_be_verified() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    service
        .reject(&receipt.id, "front-desk", "Suspected forgery")
        .await
        .expect("reject failed");

    let result = service
        .mark_verified(&receipt.id, "front-desk", None)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let unchanged = service.get(&receipt.id).await.expect("get failed");
    assert_eq!(unchanged.status, ReceiptStatus::Rejected);
}

#[tokio::test]
async fn rejected_receipt_cannot_be_paid() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    service
        .reject(&receipt.id, "front-desk", "Suspected forgery")
        .await
        .expect("reject failed");

    let result = service.mark_paid(&receipt.id).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn cancelled_receipt_admits_no_transitions() {
    let (service, store) = test_service();

    let receipt = build_receipt(ReceiptStatus::Cancelled, TEST_SECRET);
    let receipt = store.insert(receipt).await.expect("seed failed");

    assert!(matches!(
        service.mark_paid(&receipt.id).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.mark_verified(&receipt.id, "front-desk", None).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.reject(&receipt.id, "front-desk", "reason").await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn transitions_on_unknown_id_are_hard_failures() {
    let (service, _store) = test_service();

    assert!(matches!(
        service.mark_paid("no-such-id").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.mark_verified("no-such-id", "front-desk", None).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.reject("no-such-id", "front-desk", "reason").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn verifier_identity_is_required() {
    let (service, _store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");

    assert!(matches!(
        service.mark_verified(&receipt.id, " ", None).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.reject(&receipt.id, "", "reason").await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn conditional_update_skips_stale_status() {
    let (service, store) = test_service();

    let receipt = service.create(sample_input()).await.expect("create failed");
    service.mark_paid(&receipt.id).await.expect("mark_paid failed");

    // A writer holding a stale view (expects pending) must not win
    let stale = StatusUpdate {
        status: ReceiptStatus::Rejected,
        verification_notes: Some("stale writer".to_string()),
        ..Default::default()
    };
    let outcome = store
        .update_status(&receipt.id, &[ReceiptStatus::Pending], &stale)
        .await
        .expect("update_status failed");
    assert!(outcome.is_none(), "conditional update must not match");

    let current = service.get(&receipt.id).await.expect("get failed");
    assert_eq!(current.status, ReceiptStatus::Paid);
}

#[tokio::test]
async fn listings_are_scoped_and_newest_first() {
    let (service, _store) = test_service();

    let first = service.create(sample_input()).await.expect("create failed");
    let mut other = sample_input();
    other.booking_id = "booking-002".to_string();
    let second = service.create(other).await.expect("create failed");

    let mut foreign = sample_input();
    foreign.booking_id = "booking-003".to_string();
    foreign.user_id = "user-002".to_string();
    foreign.provider_id = Some("provider-002".to_string());
    service.create(foreign).await.expect("create failed");

    let mine = service.list_for_user("user-001").await.expect("list failed");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().any(|r| r.id == first.id));
    assert!(mine.iter().any(|r| r.id == second.id));
    assert!(mine[0].created_at >= mine[1].created_at);

    let provided = service
        .list_for_provider("provider-001")
        .await
        .expect("list failed");
    assert_eq!(provided.len(), 2);
}
