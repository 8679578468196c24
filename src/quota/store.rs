use async_trait::async_trait;
use sqlx::PgPool;

use crate::store::{classify_write_error, StoreResult};

use super::models::{Plan, Subscription};

/// Persistence seam for the quota subsystem. The Pg implementation below is
/// the production store; tests substitute in-memory fakes.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn subscription_for_user(&self, user_id: i32) -> StoreResult<Option<Subscription>>;
    async fn plan(&self, plan_id: &str) -> StoreResult<Option<Plan>>;
    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription>;
    async fn update_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription>;
}

#[derive(Clone)]
pub struct PgQuotaStore {
    pool: PgPool,
}

impl PgQuotaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaStore for PgQuotaStore {
    async fn subscription_for_user(&self, user_id: i32) -> StoreResult<Option<Subscription>> {
        let record = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn plan(&self, plan_id: &str) -> StoreResult<Option<Plan>> {
        let record =
            sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1 AND active = TRUE")
                .bind(plan_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let record = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (
                id,
                user_id,
                plan_id,
                status,
                video_generations_used,
                comic_generations_used,
                reset_date,
                renewal_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(&subscription.plan_id)
        .bind(&subscription.status)
        .bind(subscription.video_generations_used)
        .bind(subscription.comic_generations_used)
        .bind(subscription.reset_date)
        .bind(subscription.renewal_date)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;
        Ok(record)
    }

    // Last-write-wins by design: callers resubmit the same record on a
    // transient conflict without re-reading, so racing increments can lose
    // an update. Enforcement happens in the gate before any paid work.
    async fn update_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let record = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions SET
                plan_id = $2,
                status = $3,
                video_generations_used = $4,
                comic_generations_used = $5,
                reset_date = $6,
                renewal_date = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(subscription.id)
        .bind(&subscription.plan_id)
        .bind(&subscription.status)
        .bind(subscription.video_generations_used)
        .bind(subscription.comic_generations_used)
        .bind(subscription.reset_date)
        .bind(subscription.renewal_date)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;
        Ok(record)
    }
}
