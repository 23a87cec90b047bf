// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// Contagens filtradas pelo escopo do usuário
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub clients: i64,
    pub branches: i64,
    pub areas: i64,
    pub dispensers: i64,
    pub visits: i64,
    pub incidents: i64,
}

// Uma linha da atividade recente (as 6 últimas visitas no escopo)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub client: String,
    pub branch: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub inspector: String,
    pub status: String,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub activity: Vec<ActivityEntry>,
}
