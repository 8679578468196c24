use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;

use super::{
    DecisionCache, GenerationKind, PgQuotaStore, Plan, QuotaStore, UsageDecision, UsageGate,
};

pub async fn list_plans(Extension(pool): Extension<PgPool>) -> AppResult<Json<Vec<Plan>>> {
    let plans = sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE active = TRUE ORDER BY created_at ASC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(plans))
}

pub async fn check_usage(
    user: AuthUser,
    Path(kind): Path<String>,
    Extension(pool): Extension<PgPool>,
    Extension(cache): Extension<Arc<dyn DecisionCache>>,
) -> AppResult<Json<UsageCheckResponse>> {
    let kind = GenerationKind::parse(&kind)
        .ok_or_else(|| AppError::Validation(format!("unknown generation kind '{kind}'")))?;

    let store: Arc<dyn QuotaStore> = Arc::new(PgQuotaStore::new(pool));
    let gate = UsageGate::new(store, cache);
    let decision = gate.check_and_advise(user.user_id, kind, Utc::now()).await?;
    Ok(Json(UsageCheckResponse::from(decision)))
}

#[derive(Debug, Serialize)]
pub struct UsageCheckResponse {
    pub can_use: bool,
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
    pub percentage_used: i32,
    pub plan_id: String,
    pub plan_name: String,
}

impl From<UsageDecision> for UsageCheckResponse {
    fn from(decision: UsageDecision) -> Self {
        Self {
            can_use: decision.allowed,
            used: decision.used,
            limit: decision.limit,
            remaining: decision.remaining,
            percentage_used: decision.percentage_used,
            plan_id: decision.plan_id,
            plan_name: decision.plan_name,
        }
    }
}
