mod cache;
mod gate;
mod models;
mod recorder;
mod store;

pub mod api;

pub use cache::{DecisionCache, MemoryDecisionCache};
pub use gate::UsageGate;
pub use models::{
    advance_one_month, GenerationKind, Plan, Subscription, UsageDecision, STATUS_ACTIVE,
    STATUS_EXPIRED,
};
pub use recorder::{UsageReceipt, UsageRecorder};
pub use store::{PgQuotaStore, QuotaStore};

use std::time::Duration;

use crate::store::{StoreError, StoreResult};

const WRITE_RETRIES: u32 = 3;
const WRITE_RETRY_BASE: Duration = Duration::from_millis(100);

/// Resubmits the same subscription write after a transient conflict, up to
/// three times with 100ms, 200ms, 300ms pauses. The payload is intentionally
/// not re-read between attempts; see the store for the consequences.
pub(crate) async fn write_with_conflict_retry(
    store: &dyn QuotaStore,
    subscription: &Subscription,
) -> StoreResult<Subscription> {
    let mut attempt = 0;
    loop {
        match store.update_subscription(subscription).await {
            Ok(record) => return Ok(record),
            Err(StoreError::Conflict) if attempt < WRITE_RETRIES => {
                attempt += 1;
                tracing::warn!(
                    user_id = subscription.user_id,
                    attempt,
                    "subscription write conflicted; retrying"
                );
                tokio::time::sleep(WRITE_RETRY_BASE * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}
