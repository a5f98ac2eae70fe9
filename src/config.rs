// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        CatalogRepository, ClientRepository, DashboardRepository, SaleRepository, UserRepository,
    },
    services::{
        auth::AuthService, business_rules::BusinessRules, catalog_service::CatalogService,
        client_service::ClientService, dashboard_service::DashboardService,
        sale_service::SaleService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub client_service: ClientService,
    pub sale_service: SaleService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Limiares de negócio vêm do ambiente (com defaults), nunca
        // de constante de compilação: os testes variam à vontade.
        let rules = BusinessRules::from_env();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret, db_pool.clone());
        let catalog_service =
            CatalogService::new(catalog_repo.clone(), sale_repo.clone(), db_pool.clone());
        let client_service = ClientService::new(
            client_repo.clone(),
            sale_repo.clone(),
            rules.clone(),
            db_pool.clone(),
        );
        let sale_service = SaleService::new(
            sale_repo,
            catalog_repo,
            client_repo,
            rules,
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            auth_service,
            catalog_service,
            client_service,
            sale_service,
            dashboard_service,
        })
    }
}
