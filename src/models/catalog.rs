// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- PRODUTO ---
// Catálogo + saldo de estoque em uma tabela só: este PDV opera em
// um único local, sem lotes nem posições.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,

    pub sku: String,
    pub name: String,
    pub description: Option<String>,

    pub price: Decimal,

    pub stock_quantity: Decimal,
    pub min_stock: Decimal, // Alerta de estoque baixo

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- FORNECEDOR ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
