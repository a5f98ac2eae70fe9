// src/db/sale_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Sale, SaleItem, StockMovement, StockMovementReason, UnpaidSaleRow},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list_sales<'e, E>(&self, executor: E) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY created_at DESC")
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    /// Fila de aprovação: vendas aguardando um admin.
    pub async fn list_pending_approval<'e, E>(&self, executor: E) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE requires_admin_approval = TRUE AND approved_by IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(sales)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Carrega a venda travando a linha (FOR UPDATE). As guardas de estado
    /// são re-checadas sobre esta leitura, dentro da MESMA transação que
    /// muta, para que dois admins não aprovem a mesma venda em corrida.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>("SELECT * FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    /// Título em aberto mais antigo do cliente (base do bloqueio automático).
    pub async fn find_oldest_unpaid_by_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE client_id = $1 AND remaining_amount > 0
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(client_id)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    /// Vendas em aberto (não pagas e fora da fila de aprovação),
    /// opcionalmente filtradas por cliente. O days_overdue é preenchido
    /// pelo serviço; aqui sai zerado.
    pub async fn list_unpaid<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
    ) -> Result<Vec<UnpaidSaleRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, UnpaidSaleRow>(
            r#"
            SELECT s.id, s.sale_number, s.client_id, c.name AS client_name,
                   s.total, s.remaining_amount, s.due_date, s.created_at
            FROM sales s
            LEFT JOIN clients c ON c.id = s.client_id
            WHERE s.remaining_amount > 0
              AND s.requires_admin_approval = FALSE
              AND ($1::uuid IS NULL OR s.client_id = $1)
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // ---
    // Escritas
    // ---

    pub async fn next_sale_number<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, i64>("SELECT nextval('sale_number_seq')")
            .fetch_one(executor)
            .await?;
        Ok(number)
    }

    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        sale_number: i64,
        client_id: Option<Uuid>,
        user_id: Uuid,
        total: Decimal,
        remaining_amount: Decimal,
        requires_admin_approval: bool,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (sale_number, client_id, user_id, total,
                               remaining_amount, is_paid, requires_admin_approval, due_date)
            VALUES ($1, $2, $3, $4, $5, $5 = 0, $6, $7)
            RETURNING *
            "#,
        )
        .bind(sale_number)
        .bind(client_id)
        .bind(user_id)
        .bind(total)
        .bind(remaining_amount)
        .bind(requires_admin_approval)
        .bind(due_date)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
        subtotal: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Carimbo de aprovação: define approved_by/approved_at e limpa a flag,
    /// tudo de uma vez. Chamado exatamente uma vez na vida da venda.
    pub async fn stamp_approval<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        admin_id: Uuid,
        approved_at: DateTime<Utc>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET approved_by = $2, approved_at = $3, requires_admin_approval = FALSE
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(admin_id)
        .bind(approved_at)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SaleNotFound)
    }

    pub async fn delete_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::SaleNotFound);
        }
        Ok(())
    }

    /// Registra uma movimentação no livro-razão (auditoria).
    /// O user_id é o OPERADOR da venda, não quem aprovou.
    pub async fn record_stock_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        user_id: Uuid,
        quantity: Decimal,
        reason: StockMovementReason,
        sale_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, user_id, quantity, reason, sale_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .bind(quantity)
        .bind(reason)
        .bind(sale_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }
}
