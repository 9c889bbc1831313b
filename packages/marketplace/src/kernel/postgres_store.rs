//! PostgreSQL-backed record store.
//!
//! Enum columns are TEXT and go through the domain `FromStr` impls; a value
//! that no longer parses surfaces as `StoreError::Unavailable`. The
//! one-open-engagement rule is enforced by the partial unique index
//! `engagements_one_open_per_pair`, so the conditional insert is a single
//! statement.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::traits::{BaseRecordStore, Collection, Query, RecordOrder, StoreError, StoreResult};
use crate::common::{AccountId, EngagementId, NotificationId, ProviderId, ReviewId};
use crate::domains::accounts::{Account, AccountFilter, AccountPatch};
use crate::domains::engagements::{
    Engagement, EngagementFilter, EngagementPatch, EngagementStatus, SessionLength,
};
use crate::domains::notifications::{Notification, NotificationFilter};
use crate::domains::providers::{
    AvailabilitySlot, Provider, ProviderCounter, ProviderFilter, ProviderPatch,
};
use crate::domains::reviews::{Review, ReviewFilter, ReviewPatch};

const OPEN_ENGAGEMENT_INDEX: &str = "engagements_one_open_per_pair";

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.into())
}

fn count(value: i32, column: &str) -> anyhow::Result<u32> {
    u32::try_from(value).with_context(|| format!("negative {} in store: {}", column, value))
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Appends ORDER BY and LIMIT. Unordered queries fall back to id order,
/// which follows insertion order for v7 ids.
fn push_order_and_limit<F>(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &Query<F>,
    timestamp_column: &str,
) {
    match query.order {
        Some(RecordOrder::NewestFirst) => {
            builder.push(format!(" ORDER BY {} DESC, id DESC", timestamp_column));
        }
        None => {
            builder.push(" ORDER BY id ASC");
        }
    }
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(FromRow)]
struct AccountRow {
    id: AccountId,
    display_name: String,
    email_address: String,
    role: String,
    lifecycle_status: String,
    profile_completed: bool,
    location: Option<String>,
    suspension_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(row: AccountRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            display_name: row.display_name,
            email_address: row.email_address,
            role: row.role.parse()?,
            lifecycle_status: row.lifecycle_status.parse()?,
            profile_completed: row.profile_completed,
            location: row.location,
            suspension_reason: row.suspension_reason,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProviderRow {
    account_id: ProviderId,
    subjects: Vec<String>,
    teaching_levels: Vec<String>,
    hourly_rate: Decimal,
    bio: Option<String>,
    location: Option<String>,
    availability: Json<Vec<AvailabilitySlot>>,
    approval_status: String,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<AccountId>,
    rejected_at: Option<DateTime<Utc>>,
    rejected_by: Option<AccountId>,
    rejection_reason: Option<String>,
    average_rating: f64,
    review_count: i32,
    engagement_request_count: i32,
    completed_engagement_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = anyhow::Error;

    fn try_from(row: ProviderRow) -> anyhow::Result<Self> {
        Ok(Self {
            account_id: row.account_id,
            subjects: row.subjects,
            teaching_levels: row.teaching_levels,
            hourly_rate: row.hourly_rate,
            bio: row.bio,
            location: row.location,
            availability: row.availability.0,
            approval_status: row.approval_status.parse()?,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            rejected_at: row.rejected_at,
            rejected_by: row.rejected_by,
            rejection_reason: row.rejection_reason,
            average_rating: row.average_rating,
            review_count: count(row.review_count, "review_count")?,
            engagement_request_count: count(
                row.engagement_request_count,
                "engagement_request_count",
            )?,
            completed_engagement_count: count(
                row.completed_engagement_count,
                "completed_engagement_count",
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EngagementRow {
    id: EngagementId,
    student_account_id: AccountId,
    provider_account_id: ProviderId,
    scheduled_at: DateTime<Utc>,
    duration_hours: Decimal,
    subject: String,
    level: String,
    meeting_mode: String,
    location: Option<String>,
    notes: Option<String>,
    total_amount: Decimal,
    lifecycle_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EngagementRow> for Engagement {
    type Error = anyhow::Error;

    fn try_from(row: EngagementRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            student_account_id: row.student_account_id,
            provider_account_id: row.provider_account_id,
            scheduled_at: row.scheduled_at,
            duration: SessionLength::try_from(row.duration_hours).map_err(anyhow::Error::msg)?,
            subject: row.subject,
            level: row.level,
            meeting_mode: row.meeting_mode.parse()?,
            location: row.location,
            notes: row.notes,
            total_amount: row.total_amount,
            lifecycle_status: row.lifecycle_status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: ReviewId,
    provider_account_id: ProviderId,
    student_account_id: AccountId,
    engagement_id: Option<EngagementId>,
    rating: i16,
    comment: String,
    moderation_status: String,
    moderated_at: Option<DateTime<Utc>>,
    moderated_by: Option<AccountId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = anyhow::Error;

    fn try_from(row: ReviewRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            provider_account_id: row.provider_account_id,
            student_account_id: row.student_account_id,
            engagement_id: row.engagement_id,
            rating: u8::try_from(row.rating).context("rating out of range in store")?,
            comment: row.comment,
            moderation_status: row.moderation_status.parse()?,
            moderated_at: row.moderated_at,
            moderated_by: row.moderated_by,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: NotificationId,
    recipient_account_id: AccountId,
    kind: String,
    title: String,
    body: String,
    related_entity_id: Option<Uuid>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = anyhow::Error;

    fn try_from(row: NotificationRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            recipient_account_id: row.recipient_account_id,
            kind: row.kind.parse()?,
            title: row.title,
            body: row.body,
            related_entity_id: row.related_entity_id,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    Ok(rows
        .into_iter()
        .map(T::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?)
}

fn convert_one<R, T>(row: Option<R>, collection: Collection, id: Uuid) -> StoreResult<T>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    let row = row.ok_or_else(|| StoreError::not_found(collection, id))?;
    Ok(T::try_from(row)?)
}

fn convert_opt<R, T>(row: Option<R>) -> StoreResult<Option<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    Ok(row.map(T::try_from).transpose()?)
}

// =============================================================================
// Store
// =============================================================================

#[async_trait]
impl BaseRecordStore for PgRecordStore {
    async fn create_account(&self, account: Account) -> StoreResult<AccountId> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, display_name, email_address, role, lifecycle_status,
                profile_completed, location, suspension_reason, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id)
        .bind(&account.display_name)
        .bind(&account.email_address)
        .bind(account.role.as_str())
        .bind(account.lifecycle_status.as_str())
        .bind(account.profile_completed)
        .bind(&account.location)
        .bind(&account.suspension_reason)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(account.id)
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_opt(row)
    }

    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET lifecycle_status = COALESCE($2, lifecycle_status),
                profile_completed = COALESCE($3, profile_completed),
                suspension_reason = COALESCE($4, suspension_reason)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.lifecycle_status.map(|s| s.as_str()))
        .bind(patch.profile_completed)
        .bind(patch.suspension_reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        convert_one(row, Collection::Accounts, id.into_uuid())
    }

    async fn query_accounts(&self, query: Query<AccountFilter>) -> StoreResult<Vec<Account>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM accounts WHERE TRUE");
        if let Some(role) = query.filter.role {
            builder.push(" AND role = ").push_bind(role.as_str());
        }
        push_order_and_limit(&mut builder, &query, "created_at");

        let rows = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_all(rows)
    }

    async fn create_provider(&self, provider: Provider) -> StoreResult<ProviderId> {
        sqlx::query(
            r#"
            INSERT INTO providers (
                account_id, subjects, teaching_levels, hourly_rate, bio, location,
                availability, approval_status, approved_at, approved_by, rejected_at,
                rejected_by, rejection_reason, average_rating, review_count,
                engagement_request_count, completed_engagement_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(provider.account_id)
        .bind(&provider.subjects)
        .bind(&provider.teaching_levels)
        .bind(provider.hourly_rate)
        .bind(&provider.bio)
        .bind(&provider.location)
        .bind(Json(&provider.availability))
        .bind(provider.approval_status.as_str())
        .bind(provider.approved_at)
        .bind(provider.approved_by)
        .bind(provider.rejected_at)
        .bind(provider.rejected_by)
        .bind(&provider.rejection_reason)
        .bind(provider.average_rating)
        .bind(to_i32(provider.review_count))
        .bind(to_i32(provider.engagement_request_count))
        .bind(to_i32(provider.completed_engagement_count))
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(provider.account_id)
    }

    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>> {
        let row = sqlx::query_as::<_, ProviderRow>("SELECT * FROM providers WHERE account_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_opt(row)
    }

    async fn update_provider(&self, id: ProviderId, patch: ProviderPatch) -> StoreResult<Provider> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            UPDATE providers
            SET subjects = COALESCE($2, subjects),
                teaching_levels = COALESCE($3, teaching_levels),
                hourly_rate = COALESCE($4, hourly_rate),
                bio = COALESCE($5, bio),
                location = COALESCE($6, location),
                availability = COALESCE($7, availability),
                approval_status = COALESCE($8, approval_status),
                approved_at = COALESCE($9, approved_at),
                approved_by = COALESCE($10, approved_by),
                rejected_at = COALESCE($11, rejected_at),
                rejected_by = COALESCE($12, rejected_by),
                rejection_reason = COALESCE($13, rejection_reason),
                average_rating = COALESCE($14, average_rating),
                review_count = COALESCE($15, review_count),
                engagement_request_count = COALESCE($16, engagement_request_count),
                completed_engagement_count = COALESCE($17, completed_engagement_count),
                updated_at = NOW()
            WHERE account_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.subjects)
        .bind(patch.teaching_levels)
        .bind(patch.hourly_rate)
        .bind(patch.bio)
        .bind(patch.location)
        .bind(patch.availability.map(Json))
        .bind(patch.approval_status.map(|s| s.as_str()))
        .bind(patch.approved_at)
        .bind(patch.approved_by)
        .bind(patch.rejected_at)
        .bind(patch.rejected_by)
        .bind(patch.rejection_reason)
        .bind(patch.average_rating)
        .bind(patch.review_count.map(to_i32))
        .bind(patch.engagement_request_count.map(to_i32))
        .bind(patch.completed_engagement_count.map(to_i32))
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        convert_one(row, Collection::Providers, id.into_uuid())
    }

    async fn query_providers(&self, query: Query<ProviderFilter>) -> StoreResult<Vec<Provider>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM providers WHERE TRUE");
        if let Some(status) = query.filter.approval_status {
            builder
                .push(" AND approval_status = ")
                .push_bind(status.as_str());
        }
        // providers are keyed by account_id, not id
        let order = match query.order {
            Some(RecordOrder::NewestFirst) => " ORDER BY created_at DESC, account_id DESC",
            None => " ORDER BY account_id ASC",
        };
        builder.push(order);
        if let Some(limit) = query.limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = builder
            .build_query_as::<ProviderRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_all(rows)
    }

    async fn increment_provider_counter(
        &self,
        id: ProviderId,
        counter: ProviderCounter,
    ) -> StoreResult<u32> {
        // column() is a closed set of identifiers, never user input
        let column = counter.column();
        let sql = format!(
            "UPDATE providers SET {column} = {column} + 1, updated_at = NOW() \
             WHERE account_id = $1 RETURNING {column}"
        );
        let value: Option<i32> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let value = value.ok_or_else(|| StoreError::not_found(Collection::Providers, id))?;
        Ok(count(value, column)?)
    }

    async fn create_engagement(&self, engagement: Engagement) -> StoreResult<EngagementId> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO engagements (
                id, student_account_id, provider_account_id, scheduled_at, duration_hours,
                subject, level, meeting_mode, location, notes, total_amount,
                lifecycle_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(engagement.id)
        .bind(engagement.student_account_id)
        .bind(engagement.provider_account_id)
        .bind(engagement.scheduled_at)
        .bind(engagement.duration.hours())
        .bind(&engagement.subject)
        .bind(&engagement.level)
        .bind(engagement.meeting_mode.as_str())
        .bind(&engagement.location)
        .bind(&engagement.notes)
        .bind(engagement.total_amount)
        .bind(engagement.lifecycle_status.as_str())
        .bind(engagement.created_at)
        .bind(engagement.updated_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(engagement.id),
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(OPEN_ENGAGEMENT_INDEX) => {
                let open = EngagementFilter::open_between(
                    engagement.student_account_id,
                    engagement.provider_account_id,
                );
                let existing = self
                    .query_engagements(Query::new(open).limit(1))
                    .await
                    .ok()
                    .and_then(|found| found.into_iter().next())
                    .map(|e| e.id);
                Err(StoreError::OpenEngagementExists { existing })
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn get_engagement(&self, id: EngagementId) -> StoreResult<Option<Engagement>> {
        let row = sqlx::query_as::<_, EngagementRow>("SELECT * FROM engagements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_opt(row)
    }

    async fn update_engagement(
        &self,
        id: EngagementId,
        expected: EngagementStatus,
        patch: EngagementPatch,
    ) -> StoreResult<Engagement> {
        let row = sqlx::query_as::<_, EngagementRow>(
            r#"
            UPDATE engagements
            SET lifecycle_status = COALESCE($3, lifecycle_status),
                updated_at = NOW()
            WHERE id = $1 AND lifecycle_status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(patch.lifecycle_status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        if let Some(row) = row {
            return Ok(Engagement::try_from(row)?);
        }

        // Nothing matched: either the row is gone or its status moved on
        let current: Option<String> =
            sqlx::query_scalar("SELECT lifecycle_status FROM engagements WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;
        match current {
            None => Err(StoreError::not_found(Collection::Engagements, id)),
            Some(current) => Err(StoreError::StatusChanged {
                collection: Collection::Engagements,
                id: id.into_uuid(),
                expected: expected.to_string(),
                current,
            }),
        }
    }

    async fn query_engagements(
        &self,
        query: Query<EngagementFilter>,
    ) -> StoreResult<Vec<Engagement>> {
        let filter = &query.filter;
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM engagements WHERE TRUE");
        if let Some(student) = filter.student {
            builder.push(" AND student_account_id = ").push_bind(student);
        }
        if let Some(provider) = filter.provider {
            builder.push(" AND provider_account_id = ").push_bind(provider);
        }
        if let Some(participant) = filter.participant {
            builder
                .push(" AND (student_account_id = ")
                .push_bind(participant)
                .push(" OR provider_account_id = ")
                .push_bind(participant)
                .push(")");
        }
        if let Some(statuses) = &filter.statuses {
            let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            builder
                .push(" AND lifecycle_status = ANY(")
                .push_bind(statuses)
                .push(")");
        }
        push_order_and_limit(&mut builder, &query, "scheduled_at");

        let rows = builder
            .build_query_as::<EngagementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_all(rows)
    }

    async fn create_review(&self, review: Review) -> StoreResult<ReviewId> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, provider_account_id, student_account_id, engagement_id, rating, comment,
                moderation_status, moderated_at, moderated_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(review.id)
        .bind(review.provider_account_id)
        .bind(review.student_account_id)
        .bind(review.engagement_id)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .bind(review.moderation_status.as_str())
        .bind(review.moderated_at)
        .bind(review.moderated_by)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(review.id)
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_opt(row)
    }

    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> StoreResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews
            SET moderation_status = COALESCE($2, moderation_status),
                moderated_at = COALESCE($3, moderated_at),
                moderated_by = COALESCE($4, moderated_by)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.moderation_status.map(|s| s.as_str()))
        .bind(patch.moderated_at)
        .bind(patch.moderated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        convert_one(row, Collection::Reviews, id.into_uuid())
    }

    async fn query_reviews(&self, query: Query<ReviewFilter>) -> StoreResult<Vec<Review>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM reviews WHERE TRUE");
        if let Some(provider) = query.filter.provider {
            builder.push(" AND provider_account_id = ").push_bind(provider);
        }
        if let Some(status) = query.filter.moderation_status {
            builder
                .push(" AND moderation_status = ")
                .push_bind(status.as_str());
        }
        push_order_and_limit(&mut builder, &query, "created_at");

        let rows = builder
            .build_query_as::<ReviewRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_all(rows)
    }

    async fn create_notification(
        &self,
        notification: Notification,
    ) -> StoreResult<NotificationId> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_account_id, kind, title, body, related_entity_id, read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient_account_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.related_entity_id)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(notification.id)
    }

    async fn query_notifications(
        &self,
        query: Query<NotificationFilter>,
    ) -> StoreResult<Vec<Notification>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE TRUE");
        if let Some(recipient) = query.filter.recipient {
            builder
                .push(" AND recipient_account_id = ")
                .push_bind(recipient);
        }
        push_order_and_limit(&mut builder, &query, "created_at");

        let rows = builder
            .build_query_as::<NotificationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        convert_all(rows)
    }
}
