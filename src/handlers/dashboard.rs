// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, config::AppState};

pub async fn get_summary(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}
