// src/models/incident.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::visit::MediaType;

// Visão completa da incidência, com os nomes da cadeia resolvidos por JOIN.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDetail {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub area_id: Uuid,
    pub area_name: String,
    pub dispenser_id: Uuid,
    pub dispenser_identifier: String,
    pub description: String,
    pub created_at: DateTime<Utc>,

    #[sqlx(skip)]
    pub media: Vec<IncidentMedia>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentMedia {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub media_type: MediaType,
    pub file_url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentPayload {
    pub client_id: Uuid,
    pub branch_id: Uuid,
    pub area_id: Uuid,
    pub dispenser_id: Uuid,
    #[validate(length(min = 1, message = "La descripción es obligatoria."))]
    pub description: String,
    // Evidências como data-URI; vídeo ou foto, classificado pelo MIME
    #[serde(default)]
    pub media: Vec<IncidentMediaPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentMediaPayload {
    pub data_uri: String,
    #[serde(default)]
    pub description: String,
}

// Conversão incidência -> visita agendada (apaga a incidência)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleVisitPayload {
    pub inspector_id: Option<Uuid>,
    pub visited_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}
