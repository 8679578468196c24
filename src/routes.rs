use axum::{
    routing::{get, post},
    Router,
};

use crate::{pipeline, quota};

pub fn api_routes() -> Router {
    Router::new()
        .route("/api/plans", get(quota::api::list_plans))
        .route("/api/usage/:kind", get(quota::api::check_usage))
        .route("/api/generations", post(pipeline::api::run_generation))
        .route("/api/projects", get(pipeline::api::list_projects))
        .route("/api/projects/:id", get(pipeline::api::get_project))
}
