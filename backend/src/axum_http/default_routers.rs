use axum::{Json, response::IntoResponse};
use crates::domain::errors::AppError;
use serde_json::json;

use super::error_responses::ApiError;

pub async fn not_found() -> impl IntoResponse {
    ApiError(AppError::not_found("Route not found"))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "message": "200 OK" }))
}
