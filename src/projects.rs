use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::quota::GenerationKind;
use crate::store::{classify_write_error, StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "failed" => Some(ProjectStatus::Failed),
            _ => None,
        }
    }
}

/// One assembled scene (a video scene or a comic panel). Media URLs stay
/// empty/absent when generation for that scene failed; the project is still
/// completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: i32,
    pub image_url: String,
    pub narrator_text: String,
    pub dialogue: String,
    pub sound_effect: String,
    pub camera_angle: String,
    pub transition: String,
    pub emotional_beat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue_audio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedProject {
    pub id: Uuid,
    pub user_id: i32,
    pub kind: GenerationKind,
    pub title: String,
    pub synopsis: String,
    pub cover_image_url: String,
    pub status: ProjectStatus,
    pub scenes: Vec<Scene>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: i32,
    pub kind: GenerationKind,
    pub title: String,
    pub synopsis: String,
    pub cover_image_url: String,
    pub status: ProjectStatus,
    pub scenes: Vec<Scene>,
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, project: &NewProject) -> StoreResult<GeneratedProject>;
    async fn get(&self, id: Uuid, user_id: i32) -> StoreResult<Option<GeneratedProject>>;
    async fn list_for_user(&self, user_id: i32) -> StoreResult<Vec<GeneratedProject>>;
}

#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn project_from_row(row: sqlx::postgres::PgRow) -> StoreResult<GeneratedProject> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    let scenes: serde_json::Value = row.get("scenes");
    Ok(GeneratedProject {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: GenerationKind::parse(&kind)
            .ok_or_else(|| StoreError::Db(sqlx::Error::Decode(format!("bad kind {kind}").into())))?,
        title: row.get("title"),
        synopsis: row.get("synopsis"),
        cover_image_url: row.get("cover_image_url"),
        status: ProjectStatus::parse(&status).ok_or_else(|| {
            StoreError::Db(sqlx::Error::Decode(format!("bad status {status}").into()))
        })?,
        scenes: serde_json::from_value(scenes)
            .map_err(|e| StoreError::Db(sqlx::Error::Decode(e.to_string().into())))?,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create(&self, project: &NewProject) -> StoreResult<GeneratedProject> {
        let scenes = serde_json::to_value(&project.scenes)
            .map_err(|e| StoreError::Db(sqlx::Error::Decode(e.to_string().into())))?;
        let row = sqlx::query(
            r#"
            INSERT INTO projects (
                id,
                user_id,
                kind,
                title,
                synopsis,
                cover_image_url,
                status,
                scenes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project.user_id)
        .bind(project.kind.as_str())
        .bind(&project.title)
        .bind(&project.synopsis)
        .bind(&project.cover_image_url)
        .bind(project.status.as_str())
        .bind(scenes)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;
        project_from_row(row)
    }

    async fn get(&self, id: Uuid, user_id: i32) -> StoreResult<Option<GeneratedProject>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(project_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: i32) -> StoreResult<Vec<GeneratedProject>> {
        let rows =
            sqlx::query("SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(project_from_row).collect()
    }
}
