use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};

use super::models::{GenerationKind, STATUS_EXPIRED};
use super::store::QuotaStore;
use super::write_with_conflict_retry;

#[derive(Debug, Clone, Serialize)]
pub struct UsageReceipt {
    pub kind: GenerationKind,
    pub recorded_at: DateTime<Utc>,
}

/// Bookkeeping after a successful generation. Never enforces the limit;
/// that already happened at the gate.
pub struct UsageRecorder {
    store: Arc<dyn QuotaStore>,
}

impl UsageRecorder {
    pub fn new(store: Arc<dyn QuotaStore>) -> Self {
        Self { store }
    }

    pub async fn increment(
        &self,
        user_id: i32,
        kind: GenerationKind,
        now: DateTime<Utc>,
    ) -> AppResult<UsageReceipt> {
        let subscription = self
            .store
            .subscription_for_user(user_id)
            .await?
            .ok_or(AppError::NoSubscription)?;
        if !subscription.is_active() {
            return Err(AppError::NoSubscription);
        }

        if subscription.renewal_overdue(now) {
            let mut expired = subscription;
            expired.status = STATUS_EXPIRED.to_string();
            if let Err(err) = write_with_conflict_retry(self.store.as_ref(), &expired).await {
                tracing::warn!(user_id, ?err, "failed to mark subscription expired");
            }
            return Err(AppError::SubscriptionExpired);
        }

        let mut next = subscription;
        kind.record_use(&mut next);
        write_with_conflict_retry(self.store.as_ref(), &next).await?;

        Ok(UsageReceipt {
            kind,
            recorded_at: now,
        })
    }
}
