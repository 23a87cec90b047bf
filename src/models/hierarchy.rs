// src/models/hierarchy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE (raiz da hierarquia) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    // Código globalmente único (ex: "CLI-001")
    pub code: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(length(min = 1, message = "El código es obligatorio."))]
    pub code: String,
    #[serde(default)]
    pub notes: String,
}

// Atualização parcial: campo ausente = mantém o valor atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "El nombre no puede estar vacío."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "El código no puede estar vacío."))]
    pub code: Option<String>,
    pub notes: Option<String>,
}

// --- SUCURSAL ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    // Nome do cliente dono, para as listagens do dashboard
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchPayload {
    #[validate(length(min = 1, message = "El nombre no puede estar vacío."))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

// --- ÁREA ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub description: String,
    pub branch_name: String,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaPayload {
    pub branch_id: Uuid,
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAreaPayload {
    #[validate(length(min = 1, message = "El nombre no puede estar vacío."))]
    pub name: Option<String>,
    pub description: Option<String>,
}
