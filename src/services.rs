pub mod auth;
pub mod business_rules;
pub mod catalog_service;
pub mod client_service;
pub mod dashboard_service;
pub mod sale_service;
