use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::models::{GenerationKind, UsageDecision};

/// Short-lived cache of usage decisions. Injected rather than a module
/// singleton so tests control expiry and a multi-instance deployment can
/// swap in a shared implementation without touching the gate.
pub trait DecisionCache: Send + Sync {
    fn get(
        &self,
        user_id: i32,
        kind: GenerationKind,
        now: DateTime<Utc>,
    ) -> Option<UsageDecision>;
    fn put(
        &self,
        user_id: i32,
        kind: GenerationKind,
        decision: &UsageDecision,
        now: DateTime<Utc>,
    );
}

struct CachedDecision {
    decision: UsageDecision,
    computed_at: DateTime<Utc>,
}

/// Process-local TTL map. Entries are lost on restart, which is safe: the
/// store remains the source of truth and the next check repopulates.
pub struct MemoryDecisionCache {
    ttl: Duration,
    entries: DashMap<(i32, GenerationKind), CachedDecision>,
}

impl MemoryDecisionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Duration::seconds(*crate::config::USAGE_CACHE_TTL_SECS))
    }
}

impl DecisionCache for MemoryDecisionCache {
    fn get(
        &self,
        user_id: i32,
        kind: GenerationKind,
        now: DateTime<Utc>,
    ) -> Option<UsageDecision> {
        let key = (user_id, kind);
        if let Some(entry) = self.entries.get(&key) {
            if now - entry.computed_at < self.ttl {
                return Some(entry.decision.clone());
            }
        }
        self.entries.remove(&key);
        None
    }

    fn put(
        &self,
        user_id: i32,
        kind: GenerationKind,
        decision: &UsageDecision,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            (user_id, kind),
            CachedDecision {
                decision: decision.clone(),
                computed_at: now,
            },
        );
    }
}
