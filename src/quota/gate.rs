use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config;
use crate::error::{AppError, AppResult};

use super::cache::DecisionCache;
use super::models::{GenerationKind, Subscription, UsageDecision};
use super::store::QuotaStore;
use super::write_with_conflict_retry;

/// Decides whether a generation may run. Checked before any paid external
/// call; the recorder never re-checks.
pub struct UsageGate {
    store: Arc<dyn QuotaStore>,
    cache: Arc<dyn DecisionCache>,
}

impl UsageGate {
    pub fn new(store: Arc<dyn QuotaStore>, cache: Arc<dyn DecisionCache>) -> Self {
        Self { store, cache }
    }

    /// Read-and-maybe-reset: a check that lands on or past the subscription's
    /// reset date zeroes the counters and advances the date before the
    /// decision is computed, so the triggering request already benefits.
    pub async fn check_and_advise(
        &self,
        user_id: i32,
        kind: GenerationKind,
        now: DateTime<Utc>,
    ) -> AppResult<UsageDecision> {
        if let Some(cached) = self.cache.get(user_id, kind, now) {
            return Ok(cached);
        }

        let subscription = match self.store.subscription_for_user(user_id).await? {
            Some(subscription) => subscription,
            None => self.start_trial(user_id, now).await?,
        };
        if !subscription.is_active() {
            return Err(AppError::NoSubscription);
        }

        let plan = self
            .store
            .plan(&subscription.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "subscription {} references missing plan {}",
                    subscription.id, subscription.plan_id
                ))
            })?;

        let subscription = if subscription.reset_due(now) {
            self.reset_usage(subscription, now).await?
        } else {
            subscription
        };

        let decision = UsageDecision::compute(&plan, &subscription, kind);
        self.cache.put(user_id, kind, &decision, now);
        Ok(decision)
    }

    async fn start_trial(&self, user_id: i32, now: DateTime<Utc>) -> AppResult<Subscription> {
        let trial = Subscription::trial(user_id, config::TRIAL_PLAN_ID.as_str(), now);
        let created = self.store.create_subscription(&trial).await?;
        tracing::info!(user_id, plan = %created.plan_id, "started trial subscription");
        Ok(created)
    }

    async fn reset_usage(
        &self,
        mut subscription: Subscription,
        now: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let previous_reset = subscription.reset_date;
        subscription.apply_monthly_reset();
        let updated = write_with_conflict_retry(self.store.as_ref(), &subscription).await?;
        tracing::info!(
            user_id = updated.user_id,
            %previous_reset,
            next_reset = %updated.reset_date,
            at = %now,
            "monthly usage reset"
        );
        Ok(updated)
    }
}
