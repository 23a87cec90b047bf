// src/services/notification_service.rs

use crate::{
    common::error::AppError,
    db::{IncidentRepository, VisitRepository},
    models::notification::{NotificationItem, NotificationKind},
    services::scope::{area_filter, AccessScope},
};

// O feed mescla as visitas e incidências recentes do escopo, mais novas
// primeiro, com teto fixo.
const FEED_LIMIT: usize = 50;

#[derive(Clone)]
pub struct NotificationService {
    visit_repo: VisitRepository,
    incident_repo: IncidentRepository,
}

impl NotificationService {
    pub fn new(visit_repo: VisitRepository, incident_repo: IncidentRepository) -> Self {
        Self { visit_repo, incident_repo }
    }

    pub async fn feed(
        &self,
        scope: Option<&AccessScope>,
    ) -> Result<Vec<NotificationItem>, AppError> {
        let visits = self
            .visit_repo
            .recent(area_filter(scope), FEED_LIMIT as i64)
            .await?;
        let incidents = self
            .incident_repo
            .recent(area_filter(scope), FEED_LIMIT as i64)
            .await?;

        let mut items: Vec<NotificationItem> = Vec::with_capacity(visits.len() + incidents.len());

        for visit in visits {
            items.push(NotificationItem {
                id: format!("visit-{}", visit.id),
                kind: NotificationKind::Visit,
                title: format!("Visita en {}", visit.area_name),
                detail: format!(
                    "{} / {} ({})",
                    visit.client_name,
                    visit.branch_name,
                    visit.status.label()
                ),
                created_at: visit.visited_at,
            });
        }

        for incident in incidents {
            items.push(NotificationItem {
                id: format!("incident-{}", incident.id),
                kind: NotificationKind::Incident,
                title: format!("Incidencia en {}", incident.area_name),
                detail: format!("{} / {}", incident.client_name, incident.branch_name),
                created_at: incident.created_at,
            });
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(FEED_LIMIT);

        Ok(items)
    }
}
