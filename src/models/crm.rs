// src/models/crm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE client_status do banco.
// O status BLOCKED nunca vem de input do usuário: ou é resultado da
// varredura de bloqueio automático, ou consistente com ela.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "client_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Active,
    Blocked,
    Inactive,
}

// --- CLIENTE (Conta de crédito) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    pub name: String,
    pub document_number: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    // Limite concedido x saldo devedor acumulado de vendas a prazo.
    pub credit_limit: Decimal,
    pub current_balance: Decimal,

    pub status: ClientStatus,

    // Override por cliente do prazo global de bloqueio (dias).
    // None = usa o default configurado.
    pub auto_block_days: Option<i32>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resultado da avaliação de crédito de um cliente (exposto para a UI).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreditStatus {
    pub should_block: bool,
    // Idade (em dias) do título em aberto mais antigo.
    // Sempre reportada, mesmo quando não bloqueia.
    pub oldest_unpaid_days: i64,
}

// Relatório da varredura de bloqueio automático.
#[derive(Debug, Clone, Copy, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub evaluated: u32,
    pub blocked: u32,
}
