// src/services/dashboard_service.rs

use sqlx::PgPool;

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(dashboard_repo: DashboardRepository, pool: PgPool) -> Self {
        Self {
            dashboard_repo,
            pool,
        }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        self.dashboard_repo.get_summary(&self.pool).await
    }
}
