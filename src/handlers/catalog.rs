// src/handlers/catalog.rs

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
    common::error::AppError,
    config::AppState,
    handlers::{validate_not_negative, validate_positive},
    middleware::auth::AuthenticatedUser,
    models::sales::StockMovementReason,
};

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub supplier_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub initial_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_stock: Decimal,
}

// ---
// Payload: UpdateProduct
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub supplier_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub min_stock: Decimal,
}

// --- DTO: Entrada de Estoque ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStockPayload {
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub reason: StockMovementReason, // Ex: "PURCHASE"
    pub notes: Option<String>,
}

// ---
// Handlers: Produtos
// ---

pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .create_product(
            &user,
            payload.supplier_id,
            &payload.sku,
            &payload.name,
            payload.description.as_deref(),
            payload.price,
            payload.initial_stock,
            payload.min_stock,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.catalog_service.list_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.get_product(product_id).await?;
    Ok((StatusCode::OK, Json(product)))
}

pub async fn update_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .update_product(
            product_id,
            payload.supplier_id,
            &payload.name,
            payload.description.as_deref(),
            payload.price,
            payload.min_stock,
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

pub async fn add_stock(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<AddStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Retorna o produto com o novo saldo para o frontend atualizar a tela
    let product = app_state
        .catalog_service
        .add_stock(
            &user,
            product_id,
            payload.quantity,
            payload.reason,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: Fornecedores
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub document_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
}

// ---
// Handlers: Fornecedores
// ---

pub async fn create_supplier(
    State(app_state): State<AppState>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .catalog_service
        .create_supplier(
            &payload.name,
            payload.document_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.catalog_service.list_suppliers().await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

pub async fn update_supplier(
    State(app_state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .catalog_service
        .update_supplier(
            supplier_id,
            &payload.name,
            payload.document_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(supplier)))
}
