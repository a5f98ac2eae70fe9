pub mod auth;
pub mod catalog;
pub mod crm;
pub mod dashboard;
pub mod sales;
