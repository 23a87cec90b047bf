// src/services/incident_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EquipmentRepository, HierarchyRepository, IncidentRepository, VisitRepository},
    models::{
        auth::User,
        incident::{CreateIncidentPayload, IncidentDetail, ScheduleVisitPayload},
        visit::{MediaType, VisitDetail},
    },
    services::{
        access::require_incident_writer,
        scope::{area_filter, AccessScope},
        storage::{decode_data_uri, MediaStorage},
    },
};

#[derive(Clone)]
pub struct IncidentService {
    pool: PgPool,
    repo: IncidentRepository,
    hierarchy_repo: HierarchyRepository,
    equipment_repo: EquipmentRepository,
    visit_repo: VisitRepository,
    storage: MediaStorage,
}

impl IncidentService {
    pub fn new(
        pool: PgPool,
        repo: IncidentRepository,
        hierarchy_repo: HierarchyRepository,
        equipment_repo: EquipmentRepository,
        visit_repo: VisitRepository,
        storage: MediaStorage,
    ) -> Self {
        Self { pool, repo, hierarchy_repo, equipment_repo, visit_repo, storage }
    }

    pub async fn list(
        &self,
        scope: Option<&AccessScope>,
    ) -> Result<Vec<IncidentDetail>, AppError> {
        self.repo.list(area_filter(scope)).await
    }

    pub async fn get(
        &self,
        id: Uuid,
        scope: Option<&AccessScope>,
    ) -> Result<IncidentDetail, AppError> {
        let mut incident = self
            .repo
            .get(id, area_filter(scope))
            .await?
            .ok_or(AppError::NotFound)?;
        incident.media = self.repo.list_media(incident.id).await?;
        Ok(incident)
    }

    pub async fn create(
        &self,
        payload: &CreateIncidentPayload,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<IncidentDetail, AppError> {
        require_incident_writer(actor)?;

        // Os quatro IDs têm que formar uma cadeia conectada. Inconsistência
        // é erro de validação, nunca um 500.
        let branch = self
            .hierarchy_repo
            .get_branch(payload.branch_id, None)
            .await?
            .ok_or_else(|| AppError::validation("La sucursal indicada no existe."))?;
        if branch.client_id != payload.client_id {
            return Err(AppError::validation(
                "La sucursal no pertenece al cliente indicado.",
            ));
        }

        let area = self
            .hierarchy_repo
            .get_area(payload.area_id, None)
            .await?
            .ok_or_else(|| AppError::validation("El área indicada no existe."))?;
        if area.branch_id != payload.branch_id {
            return Err(AppError::validation(
                "El área no pertenece a la sucursal indicada.",
            ));
        }

        let dispenser = self
            .equipment_repo
            .get_dispenser(payload.dispenser_id, None)
            .await?
            .ok_or_else(|| AppError::validation("El dosificador indicado no existe."))?;
        if dispenser.area_id != Some(payload.area_id) {
            return Err(AppError::validation(
                "El dosificador no pertenece al área indicada.",
            ));
        }

        // A área também precisa estar no escopo de quem registra
        if self
            .hierarchy_repo
            .get_area(payload.area_id, area_filter(scope))
            .await?
            .is_none()
        {
            return Err(AppError::NotFound);
        }

        let mut incident = self
            .repo
            .create(
                payload.client_id,
                payload.branch_id,
                payload.area_id,
                payload.dispenser_id,
                &payload.description,
            )
            .await?;

        // Evidências opcionais como data-URI (foto ou vídeo, pelo MIME)
        for media in &payload.media {
            let (mime, _) = decode_data_uri(&media.data_uri)?;
            let media_type = if mime.starts_with("video/") {
                MediaType::Video
            } else {
                MediaType::Photo
            };
            let url = self.storage.store_data_uri("incidents", &media.data_uri).await?;
            self.repo
                .insert_media(incident.id, media_type, &url, &media.description)
                .await?;
        }

        incident.media = self.repo.list_media(incident.id).await?;
        Ok(incident)
    }

    // Conversão terminal: cria a visita agendada e apaga a incidência na
    // mesma transação. Não existe caminho de volta.
    pub async fn schedule_visit(
        &self,
        incident_id: Uuid,
        payload: &ScheduleVisitPayload,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<VisitDetail, AppError> {
        require_incident_writer(actor)?;

        let incident = self.get(incident_id, scope).await?;

        let notes = payload
            .notes
            .clone()
            .unwrap_or_else(|| format!("Incidencia: {}", incident.description));

        let mut tx = self.pool.begin().await?;

        let visit_id = self
            .visit_repo
            .create(
                &mut *tx,
                incident.area_id,
                Some(incident.dispenser_id),
                payload.inspector_id,
                payload.visited_at,
                &notes,
            )
            .await?;

        self.repo.delete(&mut *tx, incident_id).await?;

        tx.commit().await?;

        self.visit_repo
            .get(visit_id, None)
            .await?
            .ok_or(AppError::NotFound)
    }
}
