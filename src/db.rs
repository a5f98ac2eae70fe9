pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
