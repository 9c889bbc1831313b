//! Engagement lifecycle, tutor onboarding and notification inbox tests

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use test_context::test_context;

use crate::common::{
    booking_request, create_account, create_approved_provider, create_provider, create_student,
    profile, TestHarness,
};
use marketplace_core::common::{AuthError, MarketplaceError, ValidationError};
use marketplace_core::domains::accounts::AccountRole;
use marketplace_core::domains::engagements::{
    cancel_engagement, complete_engagement, confirm_engagement, create_engagement,
    decline_engagement, list_engagements_for_actor, EngagementStatus,
};
use marketplace_core::domains::notifications::{notifications_for, NotificationKind};
use marketplace_core::domains::providers::{submit_provider_profile, ApprovalStatus};
use marketplace_core::kernel::{
    BaseRecordStore, MarketplaceDeps, StoreBackedIdentity, StoreNotificationSink,
};

#[test_context(TestHarness)]
#[tokio::test]
async fn tutor_confirms_then_completes(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let as_tutor = ctx.as_account(&tutor);

    let engagement = create_engagement(booking_request(student.id, tutor.id), &ctx.as_account(&student))
        .await
        .unwrap();

    let confirmed = confirm_engagement(engagement.id, &as_tutor).await.unwrap();
    assert_eq!(confirmed.lifecycle_status, EngagementStatus::Confirmed);

    let confirmations = ctx.notifier().sent_of_kind(NotificationKind::BookingConfirmed);
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0].recipient_account_id, student.id);

    let completed = complete_engagement(engagement.id, &as_tutor).await.unwrap();
    assert_eq!(completed.lifecycle_status, EngagementStatus::Completed);

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.engagement_request_count, 1);
    assert_eq!(provider.completed_engagement_count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn declined_request_frees_the_pair(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let as_student = ctx.as_account(&student);

    let engagement = create_engagement(booking_request(student.id, tutor.id), &as_student)
        .await
        .unwrap();
    let declined = decline_engagement(engagement.id, &ctx.as_account(&tutor))
        .await
        .unwrap();
    assert_eq!(declined.lifecycle_status, EngagementStatus::Rejected);
    assert_eq!(
        ctx.notifier().sent_of_kind(NotificationKind::BookingDeclined).len(),
        1
    );

    create_engagement(booking_request(student.id, tutor.id), &as_student)
        .await
        .unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn student_may_cancel_but_not_confirm(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let as_student = ctx.as_account(&student);

    let engagement = create_engagement(booking_request(student.id, tutor.id), &as_student)
        .await
        .unwrap();

    let result = confirm_engagement(engagement.id, &as_student).await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Authorization(AuthError::RoleRequired {
            required: AccountRole::Provider,
            actual: AccountRole::Student,
        }))
    ));

    let cancelled = cancel_engagement(engagement.id, &as_student).await.unwrap();
    assert_eq!(cancelled.lifecycle_status, EngagementStatus::Cancelled);

    let notices = ctx.notifier().sent_of_kind(NotificationKind::BookingCancelled);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].recipient_account_id, tutor.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn outsiders_cannot_touch_an_engagement(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let (other_tutor, _) = create_approved_provider(ctx.store(), "Eric", &["Physics"], 20).await;

    let engagement = create_engagement(booking_request(student.id, tutor.id), &ctx.as_account(&student))
        .await
        .unwrap();

    let result = confirm_engagement(engagement.id, &ctx.as_account(&other_tutor)).await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Authorization(AuthError::NotAParticipant))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn administrators_do_not_respond_to_bookings(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let engagement = create_engagement(booking_request(student.id, tutor.id), &ctx.as_account(&student))
        .await
        .unwrap();

    let result = decline_engagement(engagement.id, &ctx.as_admin()).await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Authorization(AuthError::RoleRequired { .. }))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancelled_engagement_cannot_be_confirmed(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let engagement = create_engagement(booking_request(student.id, tutor.id), &ctx.as_account(&student))
        .await
        .unwrap();
    cancel_engagement(engagement.id, &ctx.as_account(&student))
        .await
        .unwrap();

    let result = confirm_engagement(engagement.id, &ctx.as_account(&tutor)).await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { ref from, .. }))
            if from == "cancelled"
    ));
    let stored = ctx.store().get_engagement(engagement.id).await.unwrap().unwrap();
    assert_eq!(stored.lifecycle_status, EngagementStatus::Cancelled);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_engagement_cannot_be_completed(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let engagement = create_engagement(booking_request(student.id, tutor.id), &ctx.as_account(&student))
        .await
        .unwrap();
    let writes = ctx.store().write_count();

    let result = complete_engagement(engagement.id, &ctx.as_account(&tutor)).await;

    assert!(matches!(
        result,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))
    ));
    assert_eq!(ctx.store().write_count(), writes);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn each_party_sees_their_own_engagements(ctx: &mut TestHarness) {
    let sam = create_student(ctx.store(), "Sam").await;
    let ama = create_student(ctx.store(), "Ama").await;
    let (nadia, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let (eric, _) = create_approved_provider(ctx.store(), "Eric", &["Physics"], 20).await;

    create_engagement(booking_request(sam.id, nadia.id), &ctx.as_account(&sam))
        .await
        .unwrap();
    create_engagement(booking_request(sam.id, eric.id), &ctx.as_account(&sam))
        .await
        .unwrap();
    create_engagement(booking_request(ama.id, nadia.id), &ctx.as_account(&ama))
        .await
        .unwrap();

    let sams = list_engagements_for_actor(None, &ctx.as_account(&sam)).await.unwrap();
    assert_eq!(sams.len(), 2);
    assert!(sams.iter().all(|e| e.student_account_id == sam.id));

    let nadias = list_engagements_for_actor(None, &ctx.as_account(&nadia)).await.unwrap();
    assert_eq!(nadias.len(), 2);
    assert!(nadias.iter().all(|e| e.provider_account_id == nadia.id));

    let limited = list_engagements_for_actor(Some(1), &ctx.as_account(&nadia)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn first_profile_submission_is_pending(ctx: &mut TestHarness) {
    let tutor = create_account(ctx.store(), "Nadia", AccountRole::Provider).await;

    let provider = submit_provider_profile(profile(&["Physics"], 18), &ctx.as_account(&tutor))
        .await
        .unwrap();

    assert_eq!(provider.approval_status, ApprovalStatus::Pending);
    assert_eq!(provider.hourly_rate, Decimal::from(18));
    let account = ctx.store().get_account(tutor.id).await.unwrap().unwrap();
    assert!(account.profile_completed);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn editing_an_approved_profile_keeps_it_approved(ctx: &mut TestHarness) {
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let provider = submit_provider_profile(
        profile(&["Physics", "Mathematics"], 25),
        &ctx.as_account(&tutor),
    )
    .await
    .unwrap();

    assert_eq!(provider.approval_status, ApprovalStatus::Approved);
    assert_eq!(provider.subjects, vec!["Physics", "Mathematics"]);
    assert_eq!(provider.hourly_rate, Decimal::from(25));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejected_tutors_cannot_resubmit(ctx: &mut TestHarness) {
    let (tutor, _) = create_provider(
        ctx.store(),
        "Nadia",
        ApprovalStatus::Rejected,
        profile(&["Physics"], 20),
    )
    .await;

    let result = submit_provider_profile(profile(&["Physics"], 20), &ctx.as_account(&tutor)).await;

    assert!(matches!(
        result,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn profile_subjects_must_be_in_the_catalog(ctx: &mut TestHarness) {
    let tutor = create_account(ctx.store(), "Nadia", AccountRole::Provider).await;
    let writes = ctx.store().write_count();

    let result =
        submit_provider_profile(profile(&["Astrology"], 20), &ctx.as_account(&tutor)).await;

    assert!(matches!(
        result,
        Err(MarketplaceError::Validation(ValidationError::NotInCatalog { .. }))
    ));
    assert_eq!(ctx.store().write_count(), writes);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn students_cannot_submit_tutor_profiles(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;

    let result = submit_provider_profile(profile(&["Physics"], 20), &ctx.as_account(&student)).await;

    assert!(matches!(result, Err(MarketplaceError::Authorization(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn store_backed_notifications_land_in_the_inbox(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let store: Arc<dyn BaseRecordStore> = Arc::new(ctx.store().clone());
    let deps_for = |account_id| {
        MarketplaceDeps::new(
            store.clone(),
            Arc::new(StoreBackedIdentity::new(store.clone(), account_id)),
            Arc::new(StoreNotificationSink::new(store.clone())),
        )
    };

    create_engagement(booking_request(student.id, tutor.id), &deps_for(student.id))
        .await
        .unwrap();

    let inbox = notifications_for(tutor.id, None, &deps_for(tutor.id)).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::NewBooking);
    assert!(!inbox[0].read);

    let result = notifications_for(tutor.id, None, &deps_for(student.id)).await;
    assert!(matches!(
        result,
        Err(MarketplaceError::Authorization(AuthError::IdentityMismatch))
    ));
}
