//! Engagement admission tests

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use test_context::test_context;

use crate::common::{
    booking_request, create_approved_provider, create_provider, create_student, profile,
    TestHarness,
};
use marketplace_core::common::{AuthError, MarketplaceError, ProviderId, ValidationError};
use marketplace_core::domains::engagements::{
    create_engagement, EngagementStatus, MeetingMode, SessionLength,
};
use marketplace_core::domains::notifications::NotificationKind;
use marketplace_core::domains::providers::ApprovalStatus;
use marketplace_core::kernel::BaseRecordStore;

#[test_context(TestHarness)]
#[tokio::test]
async fn admitted_request_is_pending_priced_counted_and_notified(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let engagement = create_engagement(
        booking_request(student.id, tutor.id),
        &ctx.as_account(&student),
    )
    .await
    .unwrap();

    assert_eq!(engagement.lifecycle_status, EngagementStatus::Pending);
    assert_eq!(engagement.total_amount, Decimal::from(30));
    assert_eq!(engagement.location, None);

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.engagement_request_count, 1);

    let sent = ctx.notifier().sent_of_kind(NotificationKind::NewBooking);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_account_id, tutor.id);
    assert_eq!(sent[0].title, "New Booking Request");
    assert_eq!(sent[0].body, "Sam has requested a 1.5-hour session");
    assert_eq!(sent[0].related_entity_id, Some(engagement.id.into_uuid()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn second_open_request_for_the_same_pair_is_a_duplicate(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = ctx.as_account(&student);

    let first = create_engagement(booking_request(student.id, tutor.id), &deps)
        .await
        .unwrap();
    let writes = ctx.store().write_count();

    let second = create_engagement(booking_request(student.id, tutor.id), &deps).await;

    assert!(matches!(
        second,
        Err(MarketplaceError::DuplicateEngagement { existing: Some(id) }) if id == first.id
    ));
    assert_eq!(ctx.store().write_count(), writes);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_requests_admit_exactly_one(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = Arc::new(ctx.as_account(&student));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let deps = deps.clone();
            let request = booking_request(student.id, tutor.id);
            tokio::spawn(async move { create_engagement(request, &deps).await })
        })
        .collect();

    let mut admitted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(MarketplaceError::DuplicateEngagement { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(duplicates, 7);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn a_closed_engagement_does_not_block_a_new_request(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = ctx.as_account(&student);

    let first = create_engagement(booking_request(student.id, tutor.id), &deps)
        .await
        .unwrap();
    marketplace_core::domains::engagements::cancel_engagement(first.id, &deps)
        .await
        .unwrap();

    assert!(create_engagement(booking_request(student.id, tutor.id), &deps)
        .await
        .is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn past_schedule_is_rejected_without_writes(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let writes = ctx.store().write_count();

    let mut request = booking_request(student.id, tutor.id);
    request.scheduled_at = Utc::now() - Duration::hours(1);

    let result = create_engagement(request, &ctx.as_account(&student)).await;

    assert!(matches!(result, Err(MarketplaceError::InvalidSchedule { .. })));
    assert_eq!(ctx.store().write_count(), writes);
    assert!(ctx.notifier().sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn in_person_without_location_is_rejected_without_writes(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let writes = ctx.store().write_count();

    let mut request = booking_request(student.id, tutor.id);
    request.meeting_mode = MeetingMode::InPerson;
    request.location = Some("   ".into());

    let result = create_engagement(request, &ctx.as_account(&student)).await;

    assert!(matches!(
        result,
        Err(MarketplaceError::Validation(ValidationError::MissingField { field: "location" }))
    ));
    assert_eq!(ctx.store().write_count(), writes);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn in_person_keeps_its_location(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let mut request = booking_request(student.id, tutor.id);
    request.meeting_mode = MeetingMode::InPerson;
    request.location = Some(" Bonamoussadi library ".into());
    request.duration = SessionLength::ThreeHours;

    let engagement = create_engagement(request, &ctx.as_account(&student))
        .await
        .unwrap();

    assert_eq!(engagement.location.as_deref(), Some("Bonamoussadi library"));
    assert_eq!(engagement.total_amount, Decimal::from(60));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn subject_and_level_are_checked_against_the_catalog(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = ctx.as_account(&student);

    let mut blank = booking_request(student.id, tutor.id);
    blank.subject = " ".into();
    assert!(matches!(
        create_engagement(blank, &deps).await,
        Err(MarketplaceError::Validation(ValidationError::MissingField { field: "subject" }))
    ));

    let mut unknown = booking_request(student.id, tutor.id);
    unknown.level = "Kindergarten".into();
    assert!(matches!(
        create_engagement(unknown, &deps).await,
        Err(MarketplaceError::Validation(ValidationError::NotInCatalog { field: "level", .. }))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn schedule_is_checked_before_fields(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let mut request = booking_request(student.id, tutor.id);
    request.scheduled_at = Utc::now() - Duration::days(1);
    request.subject = String::new();

    let result = create_engagement(request, &ctx.as_account(&student)).await;
    assert!(matches!(result, Err(MarketplaceError::InvalidSchedule { .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_or_unapproved_tutors_cannot_be_booked(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (pending, _) = create_provider(
        ctx.store(),
        "Pending",
        ApprovalStatus::Pending,
        profile(&["Physics"], 20),
    )
    .await;
    let deps = ctx.as_account(&student);

    let missing = create_engagement(booking_request(student.id, ProviderId::new()), &deps).await;
    assert!(matches!(missing, Err(MarketplaceError::NotFound { .. })));

    let unapproved = create_engagement(booking_request(student.id, pending.id), &deps).await;
    assert!(matches!(
        unapproved,
        Err(MarketplaceError::Validation(ValidationError::ProviderNotBookable(id))) if id == pending.id
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn students_book_only_for_themselves(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let other = create_student(ctx.store(), "Other").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let result = create_engagement(
        booking_request(other.id, tutor.id),
        &ctx.as_account(&student),
    )
    .await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Authorization(AuthError::IdentityMismatch))
    ));

    let as_tutor = create_engagement(booking_request(tutor.id, tutor.id), &ctx.as_account(&tutor)).await;
    assert!(matches!(
        as_tutor,
        Err(MarketplaceError::Authorization(AuthError::RoleRequired { .. }))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn notification_failure_does_not_fail_admission(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    ctx.notifier().fail_sends(true);

    let result = create_engagement(
        booking_request(student.id, tutor.id),
        &ctx.as_account(&student),
    )
    .await;

    assert!(result.is_ok());
    assert!(ctx.notifier().sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn store_outage_is_retryable(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    ctx.store().set_unavailable(true);

    let err = create_engagement(
        booking_request(student.id, tutor.id),
        &ctx.as_account(&student),
    )
    .await
    .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.kind(), "store_unavailable");
}
