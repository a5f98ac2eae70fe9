//src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_product).put(handlers::catalog::update_product),
        )
        .route("/{id}/stock-entry", post(handlers::catalog::add_stock))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let supplier_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_supplier).get(handlers::catalog::list_suppliers),
        )
        .route("/{id}", axum::routing::put(handlers::catalog::update_supplier))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client).put(handlers::clients::update_client),
        )
        // Avaliação crua do bloqueio (exibição no cadastro do cliente)
        .route("/{id}/credit-status", get(handlers::clients::credit_status))
        // Varredura de bloqueio automático (só admins)
        .route("/status-sweep", post(handlers::clients::status_sweep))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let sale_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales),
        )
        .route("/unpaid", get(handlers::sales::list_unpaid))
        .route("/pending", get(handlers::sales::list_pending))
        // Workflow de aprovação (só admins; o RequireAdmin barra o resto)
        .route("/{id}/approve", post(handlers::sales::approve_sale))
        .route("/{id}/reject", post(handlers::sales::reject_sale))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/products", product_routes)
        .nest("/api/suppliers", supplier_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/sales", sale_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
