//! Rating aggregation and review moderation tests

mod common;

use test_context::test_context;

use crate::common::{
    booking_request, create_approved_provider, create_review, create_student, TestHarness,
};
use marketplace_core::common::{MarketplaceError, ValidationError};
use marketplace_core::domains::engagements::{
    complete_engagement, confirm_engagement, create_engagement,
};
use marketplace_core::domains::providers::ProviderPatch;
use marketplace_core::domains::reviews::{
    approve_review, approved_reviews_for, on_review_approved, reconcile_ratings, reject_review,
    submit_review, ModerationStatus, ReviewSubmission,
};
use marketplace_core::kernel::BaseRecordStore;

#[test_context(TestHarness)]
#[tokio::test]
async fn rating_follows_approved_reviews(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let admin = ctx.as_admin();

    for rating in [5, 4, 3] {
        let review =
            create_review(ctx.store(), tutor.id, student.id, rating, ModerationStatus::Pending).await;
        approve_review(review.id, true, &admin).await.unwrap();
    }

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.average_rating, 4.0);
    assert_eq!(provider.review_count, 3);

    let review = create_review(ctx.store(), tutor.id, student.id, 2, ModerationStatus::Pending).await;
    approve_review(review.id, true, &admin).await.unwrap();

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.average_rating, 3.5);
    assert_eq!(provider.review_count, 4);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_and_rejected_reviews_do_not_count(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    create_review(ctx.store(), tutor.id, student.id, 5, ModerationStatus::Approved).await;
    create_review(ctx.store(), tutor.id, student.id, 1, ModerationStatus::Pending).await;
    create_review(ctx.store(), tutor.id, student.id, 1, ModerationStatus::Rejected).await;

    let summary = on_review_approved(tutor.id, &ctx.as_admin()).await.unwrap();

    assert_eq!(summary.average_rating, 5.0);
    assert_eq!(summary.review_count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn recompute_with_no_reviews_is_zero(ctx: &mut TestHarness) {
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;

    let summary = on_review_approved(tutor.id, &ctx.as_admin()).await.unwrap();

    assert_eq!(summary.average_rating, 0.0);
    assert_eq!(summary.review_count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reapproving_heals_a_missed_rating_write(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let review = create_review(ctx.store(), tutor.id, student.id, 4, ModerationStatus::Approved).await;

    // Stored aggregate never got the approval
    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.review_count, 0);

    let approved = approve_review(review.id, true, &ctx.as_admin()).await.unwrap();
    assert_eq!(approved.moderation_status, ModerationStatus::Approved);

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.average_rating, 4.0);
    assert_eq!(provider.review_count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn moderation_states_are_terminal(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let admin = ctx.as_admin();

    let rejected = create_review(ctx.store(), tutor.id, student.id, 1, ModerationStatus::Pending).await;
    reject_review(rejected.id, true, &admin).await.unwrap();
    assert!(matches!(
        approve_review(rejected.id, true, &admin).await,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))
    ));
    // Rejecting again is a no-op
    let again = reject_review(rejected.id, true, &admin).await.unwrap();
    assert_eq!(again.moderation_status, ModerationStatus::Rejected);

    let approved = create_review(ctx.store(), tutor.id, student.id, 5, ModerationStatus::Pending).await;
    approve_review(approved.id, true, &admin).await.unwrap();
    assert!(matches!(
        reject_review(approved.id, true, &admin).await,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn students_cannot_moderate(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let review = create_review(ctx.store(), tutor.id, student.id, 5, ModerationStatus::Pending).await;

    let result = approve_review(review.id, true, &ctx.as_account(&student)).await;
    assert!(matches!(result, Err(MarketplaceError::Authorization(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn submitted_reviews_wait_for_moderation(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = ctx.as_account(&student);

    let review = submit_review(
        ReviewSubmission::builder()
            .provider_account_id(tutor.id)
            .rating(5)
            .comment("Patient and thorough")
            .build(),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(review.moderation_status, ModerationStatus::Pending);
    assert!(approved_reviews_for(tutor.id, None, &deps).await.unwrap().is_empty());

    approve_review(review.id, true, &ctx.as_admin()).await.unwrap();
    let public = approved_reviews_for(tutor.id, None, &deps).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, review.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn review_rating_must_be_one_to_five(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let deps = ctx.as_account(&student);

    for rating in [0, 6, -3] {
        let result = submit_review(
            ReviewSubmission::builder()
                .provider_account_id(tutor.id)
                .rating(rating)
                .comment("Fine")
                .build(),
            &deps,
        )
        .await;
        assert!(matches!(
            result,
            Err(MarketplaceError::Validation(ValidationError::RatingOutOfRange(r))) if r == rating
        ));
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reviews_tied_to_a_session_need_it_completed(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let as_student = ctx.as_account(&student);
    let as_tutor = ctx.as_account(&tutor);

    let engagement = create_engagement(
        booking_request(student.id, tutor.id),
        &as_student,
    )
    .await
    .unwrap();

    let submission = || {
        ReviewSubmission::builder()
            .provider_account_id(tutor.id)
            .engagement_id(engagement.id)
            .rating(4)
            .comment("Good session")
            .build()
    };

    let early = submit_review(submission(), &as_student).await;
    assert!(matches!(
        early,
        Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))
    ));

    confirm_engagement(engagement.id, &as_tutor).await.unwrap();
    complete_engagement(engagement.id, &as_tutor).await.unwrap();

    let review = submit_review(submission(), &as_student).await.unwrap();
    assert_eq!(review.engagement_id, Some(engagement.id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reconciliation_repairs_drifted_aggregates(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (drifted, _) = create_approved_provider(ctx.store(), "Drifted", &["Physics"], 20).await;
    let (accurate, _) = create_approved_provider(ctx.store(), "Accurate", &["Physics"], 20).await;

    create_review(ctx.store(), drifted.id, student.id, 5, ModerationStatus::Approved).await;
    create_review(ctx.store(), drifted.id, student.id, 2, ModerationStatus::Approved).await;
    let mut wrong = ProviderPatch::default();
    wrong.average_rating = Some(1.0);
    wrong.review_count = Some(9);
    ctx.store().update_provider(drifted.id, wrong).await.unwrap();

    let report = reconcile_ratings(&ctx.as_admin()).await.unwrap();

    assert_eq!(report.examined, 2);
    assert_eq!(report.corrected, 1);
    assert!(report.failed.is_empty());

    let provider = ctx.store().get_provider(drifted.id).await.unwrap().unwrap();
    assert_eq!(provider.average_rating, 3.5);
    assert_eq!(provider.review_count, 2);

    let untouched = ctx.store().get_provider(accurate.id).await.unwrap().unwrap();
    assert_eq!(untouched.review_count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reconciliation_restores_engagement_counters(ctx: &mut TestHarness) {
    let student = create_student(ctx.store(), "Sam").await;
    let (tutor, _) = create_approved_provider(ctx.store(), "Nadia", &["Physics"], 20).await;
    let as_tutor = ctx.as_account(&tutor);

    let engagement = create_engagement(
        booking_request(student.id, tutor.id),
        &ctx.as_account(&student),
    )
    .await
    .unwrap();
    confirm_engagement(engagement.id, &as_tutor).await.unwrap();
    complete_engagement(engagement.id, &as_tutor).await.unwrap();

    let mut reset = ProviderPatch::default();
    reset.engagement_request_count = Some(0);
    reset.completed_engagement_count = Some(0);
    ctx.store().update_provider(tutor.id, reset).await.unwrap();

    reconcile_ratings(&ctx.as_admin()).await.unwrap();

    let provider = ctx.store().get_provider(tutor.id).await.unwrap().unwrap();
    assert_eq!(provider.engagement_request_count, 1);
    assert_eq!(provider.completed_engagement_count, 1);
}
