// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- PAPÉIS ---

// Mapeia o CREATE TYPE user_role do banco. O conjunto é fechado: os papéis
// do produto não são configuráveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    GeneralAdmin,
    AccountAdmin,
    BranchAdmin,
    Inspector,
}

impl Role {
    // Qualquer papel administrativo (tudo menos inspetor)
    pub fn is_admin(self) -> bool {
        !matches!(self, Role::Inspector)
    }
}

// --- USUÁRIO ---

// Representa um usuário vindo do banco de dados. As três listas de IDs são as
// atribuições EXPLÍCITAS (não o escopo calculado) e vêm das tabelas de junção.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub profile_photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Carregadas à parte pelo repositório, sempre ordenadas
    #[sqlx(skip)]
    pub client_ids: Vec<Uuid>,
    #[sqlx(skip)]
    pub branch_ids: Vec<Uuid>,
    #[sqlx(skip)]
    pub area_ids: Vec<Uuid>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "El correo electrónico es inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "El nombre de usuario es obligatorio."))]
    pub username: String,
    #[validate(email(message = "El correo electrónico es inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    // Foto de perfil como data-URI; vai para o armazenamento de mídia
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub client_ids: Vec<Uuid>,
    #[serde(default)]
    pub branch_ids: Vec<Uuid>,
    #[serde(default)]
    pub area_ids: Vec<Uuid>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "El nombre de usuario no puede estar vacío."))]
    pub username: Option<String>,
    #[validate(email(message = "El correo electrónico es inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub profile_photo: Option<String>,
    pub client_ids: Option<Vec<Uuid>>,
    pub branch_ids: Option<Vec<Uuid>>,
    pub area_ids: Option<Vec<Uuid>>,
}
