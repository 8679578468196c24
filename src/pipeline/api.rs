use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;
use crate::projects::{GeneratedProject, PgProjectStore, ProjectStore};
use crate::providers::Providers;
use crate::quota::{DecisionCache, PgQuotaStore, QuotaStore, UsageGate, UsageRecorder};
use crate::retry::RetryPolicy;

use super::{GenerationRequest, PipelineOrchestrator};

pub async fn run_generation(
    user: AuthUser,
    Extension(pool): Extension<PgPool>,
    Extension(providers): Extension<Arc<Providers>>,
    Extension(cache): Extension<Arc<dyn DecisionCache>>,
    Json(request): Json<GenerationRequest>,
) -> AppResult<Json<GeneratedProject>> {
    let quota_store: Arc<dyn QuotaStore> = Arc::new(PgQuotaStore::new(pool.clone()));
    let projects: Arc<dyn ProjectStore> = Arc::new(PgProjectStore::new(pool));
    let orchestrator = PipelineOrchestrator::new(
        UsageGate::new(quota_store.clone(), cache),
        UsageRecorder::new(quota_store),
        providers,
        projects,
        RetryPolicy::from_env(),
    );
    let project = orchestrator.run(user.user_id, request, Utc::now()).await?;
    Ok(Json(project))
}

pub async fn list_projects(
    user: AuthUser,
    Extension(pool): Extension<PgPool>,
) -> AppResult<Json<Vec<GeneratedProject>>> {
    let store = PgProjectStore::new(pool);
    let projects = store.list_for_user(user.user_id).await?;
    Ok(Json(projects))
}

pub async fn get_project(
    user: AuthUser,
    Path(id): Path<Uuid>,
    Extension(pool): Extension<PgPool>,
) -> AppResult<Json<GeneratedProject>> {
    let store = PgProjectStore::new(pool);
    let project = store
        .get(id, user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(project))
}
