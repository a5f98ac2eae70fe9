// src/db/client_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Client, ClientStatus},
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Clientes elegíveis para a varredura de bloqueio:
    /// ativos E com saldo devedor estritamente positivo.
    pub async fn list_active_with_balance<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE status = 'ACTIVE' AND current_balance > 0
            ORDER BY name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(clients)
    }

    // ---
    // Escritas
    // ---

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        credit_limit: Decimal,
        auto_block_days: Option<i32>,
        notes: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, document_number, email, phone, address,
                                 credit_limit, auto_block_days, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(document_number)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(credit_limit)
        .bind(auto_block_days)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DocumentAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        credit_limit: Decimal,
        auto_block_days: Option<i32>,
        status: ClientStatus,
        notes: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, document_number = $3, email = $4, phone = $5,
                address = $6, credit_limit = $7, auto_block_days = $8,
                status = $9, notes = $10, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(document_number)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(credit_limit)
        .bind(auto_block_days)
        .bind(status)
        .bind(notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DocumentAlreadyExists;
                }
            }
            AppError::from(e)
        })?
        .ok_or(AppError::ClientNotFound)
    }

    /// Incrementa (ou decrementa, com delta negativo) o saldo devedor.
    pub async fn adjust_balance<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET current_balance = current_balance + $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ClientNotFound);
        }
        Ok(())
    }

    /// Bloqueia um cliente ATIVO, anotando o motivo.
    /// O filtro por status torna a operação idempotente: quem já está
    /// bloqueado não é tocado de novo. Retorna se houve escrita.
    pub async fn block_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        note: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET status = 'BLOCKED', notes = $2, updated_at = now()
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(id)
        .bind(note)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
