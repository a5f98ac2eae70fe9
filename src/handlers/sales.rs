// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validate_not_negative, validate_positive},
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    services::sale_service::NewSaleItem,
};

// ---
// Payload: CreateSale
// ---
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    // Venda à vista pode não ter cliente; venda a prazo precisa.
    pub client_id: Option<Uuid>,

    pub due_date: Option<DateTime<Utc>>,

    // Quanto foi pago na hora. O que sobrar vira remaining_amount.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub paid_amount: Decimal,

    #[validate(length(min = 1, message = "A venda precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,
}

// ---
// Handler: create_sale
// ---
pub async fn create_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(operator): AuthenticatedUser,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let items: Vec<NewSaleItem> = payload
        .items
        .iter()
        .map(|item| NewSaleItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let sale = app_state
        .sale_service
        .create_sale(
            &operator,
            payload.client_id,
            payload.due_date,
            payload.paid_amount,
            items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// ---
// Handler: list_sales
// ---
pub async fn list_sales(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sale_service.list_sales().await?;
    Ok((StatusCode::OK, Json(sales)))
}

// ---
// Handler: list_pending (fila de aprovação, só admins)
// ---
pub async fn list_pending(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sale_service.list_pending_approval().await?;
    Ok((StatusCode::OK, Json(sales)))
}

// ---
// Query: GET /sales/unpaid?filter=<all|N>&clientId=<id>
// ---
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidQuery {
    pub filter: Option<String>,
    pub client_id: Option<Uuid>,
}

impl UnpaidQuery {
    // "all" (ou ausência) = sem corte; número = mínimo de dias de atraso.
    fn min_days_overdue(&self) -> Result<Option<i64>, AppError> {
        match self.filter.as_deref() {
            None | Some("all") => Ok(None),
            Some(raw) => {
                let days = raw.parse::<i64>().map_err(|_| {
                    let mut errors = ValidationErrors::new();
                    let mut err = ValidationError::new("invalid_filter");
                    err.message = Some("O filtro deve ser 'all' ou um número de dias.".into());
                    errors.add("filter", err);
                    AppError::ValidationError(errors)
                })?;
                Ok(Some(days))
            }
        }
    }
}

// ---
// Handler: list_unpaid
// ---
pub async fn list_unpaid(
    State(app_state): State<AppState>,
    Query(query): Query<UnpaidQuery>,
) -> Result<impl IntoResponse, AppError> {
    let min_days = query.min_days_overdue()?;

    let rows = app_state
        .sale_service
        .list_unpaid(min_days, query.client_id)
        .await?;

    Ok((StatusCode::OK, Json(rows)))
}

// ---
// Handler: approve_sale (só admins)
// ---
pub async fn approve_sale(
    State(app_state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sale_service.approve_sale(sale_id, &admin).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// ---
// Handler: reject_sale (só admins)
// ---
pub async fn reject_sale(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.sale_service.reject_sale(sale_id).await?;
    Ok((StatusCode::OK, Json(response)))
}
