//! Test fixtures for creating test data.
//!
//! These write straight to the store, bypassing validation, so tests can set
//! up any state including ones the activities would refuse to produce.
#![allow(dead_code)]

use chrono::{Duration, Utc, Weekday};
use rust_decimal::Decimal;

use marketplace_core::common::{AccountId, ProviderId, ReviewId};
use marketplace_core::domains::accounts::{Account, AccountRole};
use marketplace_core::domains::engagements::{EngagementRequest, MeetingMode, SessionLength};
use marketplace_core::domains::providers::{
    ApprovalStatus, AvailabilitySlot, Provider, ProviderProfileInput,
};
use marketplace_core::domains::reviews::{ModerationStatus, Review};
use marketplace_core::kernel::{BaseRecordStore, MemoryStore};

pub async fn create_account(store: &MemoryStore, name: &str, role: AccountRole) -> Account {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let account = Account::new(name, email, role).with_location("Douala");
    store
        .create_account(account.clone())
        .await
        .expect("Failed to create account");
    account
}

pub async fn create_student(store: &MemoryStore, name: &str) -> Account {
    create_account(store, name, AccountRole::Student).await
}

pub fn profile(subjects: &[&str], rate: i64) -> ProviderProfileInput {
    ProviderProfileInput {
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        teaching_levels: vec!["University".into(), "Upper Sixth".into()],
        hourly_rate: Decimal::from(rate),
        bio: Some(format!("Experienced {} tutor", subjects.join(" and "))),
        location: None,
        availability: vec![AvailabilitySlot::new(Weekday::Wed, "16:00-18:00")],
    }
}

/// A provider account plus its provider record in the given state.
pub async fn create_provider(
    store: &MemoryStore,
    name: &str,
    status: ApprovalStatus,
    profile: ProviderProfileInput,
) -> (Account, Provider) {
    let account = create_account(store, name, AccountRole::Provider).await;
    let mut provider = Provider::pending(account.id, profile);
    provider.approval_status = status;
    store
        .create_provider(provider.clone())
        .await
        .expect("Failed to create provider");
    (account, provider)
}

pub async fn create_approved_provider(
    store: &MemoryStore,
    name: &str,
    subjects: &[&str],
    rate: i64,
) -> (Account, Provider) {
    create_provider(store, name, ApprovalStatus::Approved, profile(subjects, rate)).await
}

pub async fn create_review(
    store: &MemoryStore,
    provider_id: ProviderId,
    student_id: AccountId,
    rating: u8,
    status: ModerationStatus,
) -> Review {
    let review = Review {
        id: ReviewId::new(),
        provider_account_id: provider_id,
        student_account_id: student_id,
        engagement_id: None,
        rating,
        comment: "Clear explanations".into(),
        moderation_status: status,
        moderated_at: None,
        moderated_by: None,
        created_at: Utc::now(),
    };
    store
        .create_review(review.clone())
        .await
        .expect("Failed to create review");
    review
}

/// A valid remote request for tomorrow.
pub fn booking_request(student_id: AccountId, provider_id: ProviderId) -> EngagementRequest {
    EngagementRequest::builder()
        .student_account_id(student_id)
        .provider_account_id(provider_id)
        .scheduled_at(Utc::now() + Duration::days(1))
        .duration(SessionLength::NinetyMinutes)
        .subject("Physics")
        .level("University")
        .meeting_mode(MeetingMode::Remote)
        .build()
}
