// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::{DashboardRepository, VisitRepository},
    models::dashboard::{ActivityEntry, DashboardResponse},
    services::scope::{area_filter, branch_filter, client_filter, AccessScope},
};

// As 6 visitas mais recentes viram o feed de atividade do painel
const RECENT_VISITS: i64 = 6;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    visit_repo: VisitRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, visit_repo: VisitRepository) -> Self {
        Self { repo, visit_repo }
    }

    pub async fn summary(
        &self,
        scope: Option<&AccessScope>,
    ) -> Result<DashboardResponse, AppError> {
        let stats = self
            .repo
            .stats(client_filter(scope), branch_filter(scope), area_filter(scope))
            .await?;

        let recent = self.visit_repo.recent(area_filter(scope), RECENT_VISITS).await?;
        let activity = recent
            .into_iter()
            .map(|visit| ActivityEntry {
                id: visit.id,
                client: visit.client_name,
                branch: visit.branch_name,
                entry_type: "Visita".to_string(),
                inspector: visit
                    .inspector_name
                    .unwrap_or_else(|| "Sin asignar".to_string()),
                status: visit.status.label().to_string(),
                visited_at: visit.visited_at,
            })
            .collect();

        Ok(DashboardResponse { stats, activity })
    }
}
