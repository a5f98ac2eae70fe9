// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- VENDA ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub sale_number: i64,

    // Venda a prazo referencia um cliente; venda à vista pode não ter.
    pub client_id: Option<Uuid>,
    // O operador que registrou a venda (não o aprovador).
    pub user_id: Uuid,

    pub total: Decimal,
    // Diminui conforme pagamentos chegam; nunca negativo.
    pub remaining_amount: Decimal,
    // Derivado: true sse remaining_amount == 0.
    pub is_paid: bool,

    // Definido na criação pelo motor de regras; limpo exatamente uma vez,
    // pela aprovação.
    pub requires_admin_approval: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,

    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- ITEM DA VENDA ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

// --- MOVIMENTAÇÃO DE ESTOQUE (Histórico) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "stock_movement_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementReason {
    Sale,
    Purchase,
    Adjustment,
    Return,
}

// Livro-razão: registro imutável, criado junto com a efetivação da venda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: Decimal, // Delta com sinal (venda = negativo)
    pub reason: StockMovementReason,
    pub sale_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- LISTAGEM DE TÍTULOS EM ABERTO ---
// Linha da listagem de vendas não pagas, enriquecida com o nome do
// cliente e os dias de atraso calculados (com a carência de exibição).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidSaleRow {
    pub id: Uuid,
    pub sale_number: i64,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub total: Decimal,
    pub remaining_amount: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,

    // Calculado pelo serviço, não vem do banco.
    #[sqlx(default)]
    pub days_overdue: i64,
}

// Resposta da rejeição de uma venda pendente.
#[derive(Debug, Serialize)]
pub struct RejectResponse {
    pub success: bool,
    pub message: String,
}
