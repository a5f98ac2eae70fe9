// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resumo geral do painel.
    // Tudo dentro de uma transação para um snapshot consistente dos dados.
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Vendas de Hoje (só as já efetivadas)
        let sales_today = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total), 0)
            FROM sales
            WHERE requires_admin_approval = FALSE
              AND created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Fila de aprovação
        let pending_approval_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM sales
            WHERE requires_admin_approval = TRUE AND approved_by IS NULL
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Clientes bloqueados
        let blocked_client_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE status = 'BLOCKED'")
                .fetch_one(&mut *tx)
                .await?;

        // D. Total a receber
        let receivables_total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(remaining_amount), 0)
            FROM sales
            WHERE remaining_amount > 0 AND requires_admin_approval = FALSE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // E. Produtos no alerta de estoque baixo
        let low_stock_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE stock_quantity <= min_stock",
        )
        .fetch_one(&mut *tx)
        .await?;

        // Fecha a transação (para leitura tanto faz, mas commit é clean)
        tx.commit().await?;

        Ok(DashboardSummary {
            sales_today,
            pending_approval_count,
            blocked_client_count,
            receivables_total,
            low_stock_count,
        })
    }
}
