// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// Resumo do painel. Tudo lido em uma transação só (snapshot consistente).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub sales_today: Decimal,
    pub pending_approval_count: i64,
    pub blocked_client_count: i64,
    pub receivables_total: Decimal,
    pub low_stock_count: i64,
}
