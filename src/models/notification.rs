// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// Item do feed unificado de visitas e incidências. O `id` segue o formato
// "visit-<uuid>" / "incident-<uuid>" que o frontend usa para marcar lidas.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Visit,
    Incident,
}
