// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Product, Supplier},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        supplier_id: Option<Uuid>,
        sku: &str,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        initial_stock: Decimal,
        min_stock: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (supplier_id, sku, name, description, price,
                                  stock_quantity, min_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(supplier_id)
        .bind(sku)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(initial_stock)
        .bind(min_stock)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        supplier_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        min_stock: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // SKU e estoque não mudam por aqui: SKU é identidade,
        // estoque só muda por movimentação.
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET supplier_id = $2, name = $3, description = $4,
                price = $5, min_stock = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(supplier_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(min_stock)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProductNotFound)
    }

    /// Aplica um delta (positivo ou negativo) no saldo de estoque.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        delta: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound);
        }
        Ok(())
    }

    pub async fn count_low_stock<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE stock_quantity <= min_stock",
        )
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(suppliers)
    }

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, document_number, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(document_number)
        .bind(email)
        .bind(phone)
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

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $2, document_number = $3, email = $4, phone = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(document_number)
        .bind(email)
        .bind(phone)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SupplierNotFound)
    }
}
