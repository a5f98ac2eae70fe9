// src/handlers/clients.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, handlers::validate_not_negative,
    middleware::rbac::RequireAdmin, models::crm::ClientStatus,
};

// ---
// Payload: CreateClient
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub document_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub credit_limit: Decimal,

    #[validate(range(min = 1, message = "O prazo de bloqueio deve ser de ao menos 1 dia."))]
    pub auto_block_days: Option<i32>,

    pub notes: Option<String>,
}

// ---
// Payload: UpdateClient
// ---
// O status entra aqui (reativar, inativar), mas BLOCKED é rejeitado
// pelo serviço: bloqueio é decisão da varredura, não de input.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub document_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub credit_limit: Decimal,

    #[validate(range(min = 1, message = "O prazo de bloqueio deve ser de ao menos 1 dia."))]
    pub auto_block_days: Option<i32>,

    pub status: ClientStatus,

    pub notes: Option<String>,
}

// ---
// Handlers: CRUD
// ---

pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let client = app_state
        .client_service
        .create_client(
            &payload.name,
            payload.document_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
            payload.credit_limit,
            payload.auto_block_days,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.client_service.list_clients().await?;
    Ok((StatusCode::OK, Json(clients)))
}

pub async fn get_client(
    State(app_state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get_client(client_id).await?;
    Ok((StatusCode::OK, Json(client)))
}

pub async fn update_client(
    State(app_state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let client = app_state
        .client_service
        .update_client(
            client_id,
            &payload.name,
            payload.document_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
            payload.credit_limit,
            payload.auto_block_days,
            payload.status,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// ---
// Handler: credit_status (avaliação crua do bloqueio, para a UI)
// ---
pub async fn credit_status(
    State(app_state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.client_service.credit_status(client_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

// ---
// Handler: status_sweep (varredura de bloqueio automático, só admins)
// ---
pub async fn status_sweep(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.client_service.run_status_sweep().await?;
    Ok((StatusCode::OK, Json(report)))
}
