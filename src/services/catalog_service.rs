// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, SaleRepository},
    models::{
        auth::User,
        catalog::{Product, Supplier},
        sales::StockMovementReason,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    sale_repo: SaleRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, sale_repo: SaleRepository, pool: PgPool) -> Self {
        Self {
            catalog_repo,
            sale_repo,
            pool,
        }
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.catalog_repo.list_products(&self.pool).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.catalog_repo
            .find_product(&self.pool, id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    // Estoque inicial entra pelo livro-razão, na mesma transação da
    // criação: produto sem histórico órfão, histórico sem produto fantasma.
    pub async fn create_product(
        &self,
        creator: &User,
        supplier_id: Option<Uuid>,
        sku: &str,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        initial_stock: Decimal,
        min_stock: Decimal,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let product = self
            .catalog_repo
            .create_product(
                &mut *tx,
                supplier_id,
                sku,
                name,
                description,
                price,
                initial_stock,
                min_stock,
            )
            .await?;

        if initial_stock > Decimal::ZERO {
            self.sale_repo
                .record_stock_movement(
                    &mut *tx,
                    product.id,
                    creator.id,
                    initial_stock,
                    StockMovementReason::Purchase,
                    None,
                    Some("Estoque inicial"),
                )
                .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        supplier_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        min_stock: Decimal,
    ) -> Result<Product, AppError> {
        self.catalog_repo
            .update_product(&self.pool, id, supplier_id, name, description, price, min_stock)
            .await
    }

    /// Entrada avulsa de estoque (compra, devolução, acerto de inventário).
    pub async fn add_stock(
        &self,
        user: &User,
        product_id: Uuid,
        quantity: Decimal,
        reason: StockMovementReason,
        notes: Option<&str>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        self.catalog_repo
            .adjust_stock(&mut *tx, product_id, quantity)
            .await?;

        self.sale_repo
            .record_stock_movement(&mut *tx, product_id, user.id, quantity, reason, None, notes)
            .await?;

        let product = self
            .catalog_repo
            .find_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        tx.commit().await?;
        Ok(product)
    }

    // --- FORNECEDORES ---

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        self.catalog_repo.list_suppliers(&self.pool).await
    }

    pub async fn create_supplier(
        &self,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError> {
        self.catalog_repo
            .create_supplier(&self.pool, name, document_number, email, phone)
            .await
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError> {
        self.catalog_repo
            .update_supplier(&self.pool, id, name, document_number, email, phone)
            .await
    }
}
