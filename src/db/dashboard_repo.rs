// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::DashboardStats};

// Contagens do dashboard. Cada entidade é filtrada pelo nível de escopo
// mais específico que se aplica a ela (área > sucursal > cliente).
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(
        &self,
        client_ids: Option<Vec<Uuid>>,
        branch_ids: Option<Vec<Uuid>>,
        area_ids: Option<Vec<Uuid>>,
    ) -> Result<DashboardStats, AppError> {
        let clients = self
            .count("SELECT COUNT(*) FROM clients WHERE ($1::uuid[] IS NULL OR id = ANY($1))", &client_ids)
            .await?;
        let branches = self
            .count("SELECT COUNT(*) FROM branches WHERE ($1::uuid[] IS NULL OR id = ANY($1))", &branch_ids)
            .await?;
        let areas = self
            .count("SELECT COUNT(*) FROM areas WHERE ($1::uuid[] IS NULL OR id = ANY($1))", &area_ids)
            .await?;
        let dispensers = self
            .count(
                "SELECT COUNT(*) FROM dispensers WHERE ($1::uuid[] IS NULL OR area_id = ANY($1))",
                &area_ids,
            )
            .await?;
        let visits = self
            .count(
                "SELECT COUNT(*) FROM visits WHERE ($1::uuid[] IS NULL OR area_id = ANY($1))",
                &area_ids,
            )
            .await?;
        let incidents = self
            .count(
                "SELECT COUNT(*) FROM incidents WHERE ($1::uuid[] IS NULL OR area_id = ANY($1))",
                &area_ids,
            )
            .await?;

        Ok(DashboardStats { clients, branches, areas, dispensers, visits, incidents })
    }

    async fn count(&self, sql: &str, ids: &Option<Vec<Uuid>>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
