use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_EXPIRED: &str = "expired";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub video_generations_per_month: i32,
    pub comic_generations_per_month: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: i32,
    pub plan_id: String,
    pub status: String,
    pub video_generations_used: i32,
    pub comic_generations_used: i32,
    pub reset_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Fresh trial-plan subscription for a user generating for the first time.
    pub fn trial(user_id: i32, plan_id: &str, now: DateTime<Utc>) -> Self {
        let next_month = advance_one_month(now);
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan_id.to_string(),
            status: STATUS_ACTIVE.to_string(),
            video_generations_used: 0,
            comic_generations_used: 0,
            reset_date: next_month,
            renewal_date: next_month,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub fn reset_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_date
    }

    pub fn renewal_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.renewal_date
    }

    /// Zeroes both counters and advances the reset date by one calendar month.
    pub fn apply_monthly_reset(&mut self) {
        self.video_generations_used = 0;
        self.comic_generations_used = 0;
        self.reset_date = advance_one_month(self.reset_date);
    }
}

pub fn advance_one_month(date: DateTime<Utc>) -> DateTime<Utc> {
    date.checked_add_months(Months::new(1)).unwrap_or(date)
}

/// The two gated generation kinds. Per-kind plan limits and usage counters
/// are resolved through this enum so a new kind cannot be added without the
/// compiler pointing at every site that needs a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Video,
    Comic,
}

impl GenerationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "video" => Some(GenerationKind::Video),
            "comic" => Some(GenerationKind::Comic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Video => "video",
            GenerationKind::Comic => "comic",
        }
    }

    pub fn monthly_limit(&self, plan: &Plan) -> i32 {
        match self {
            GenerationKind::Video => plan.video_generations_per_month,
            GenerationKind::Comic => plan.comic_generations_per_month,
        }
    }

    pub fn used(&self, subscription: &Subscription) -> i32 {
        match self {
            GenerationKind::Video => subscription.video_generations_used,
            GenerationKind::Comic => subscription.comic_generations_used,
        }
    }

    pub fn record_use(&self, subscription: &mut Subscription) {
        match self {
            GenerationKind::Video => subscription.video_generations_used += 1,
            GenerationKind::Comic => subscription.comic_generations_used += 1,
        }
    }
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDecision {
    pub allowed: bool,
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
    pub percentage_used: i32,
    pub plan_id: String,
    pub plan_name: String,
}

impl UsageDecision {
    pub fn compute(plan: &Plan, subscription: &Subscription, kind: GenerationKind) -> Self {
        let limit = kind.monthly_limit(plan);
        let used = kind.used(subscription);
        let percentage_used = if limit <= 0 {
            0
        } else {
            (((used as f64) * 100.0 / limit as f64).round() as i32).clamp(0, 100)
        };
        Self {
            allowed: used < limit,
            used,
            limit,
            remaining: (limit - used).max(0),
            percentage_used,
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
        }
    }
}
