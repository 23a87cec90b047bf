// src/models/equipment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- MODELO DE DOSIFICADOR (catálogo, somente leitura pela API) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispenserModel {
    pub id: Uuid,
    pub name: String,
    pub manufacturer: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- DOSIFICADOR ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dispenser {
    pub id: Uuid,
    pub model_id: Uuid,
    // Pode estar sem área atribuída
    pub area_id: Option<Uuid>,
    pub identifier: String,
    pub installed_at: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub model_name: String,
    pub area_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Listagem de dosificadores com os produtos aninhados
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispenserWithProducts {
    #[serde(flatten)]
    pub dispenser: Dispenser,
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDispenserPayload {
    pub model_id: Uuid,
    pub area_id: Option<Uuid>,
    #[validate(length(min = 1, message = "El identificador es obligatorio."))]
    pub identifier: String,
    pub installed_at: Option<NaiveDate>,
    // Foto como data-URI (opcional)
    pub photo: Option<String>,
}

// --- PRODUTO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub dispenser_id: Uuid,
    pub name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub dispenser_id: Uuid,
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub photo: Option<String>,
}
