// src/services/user_service.rs

use bcrypt::hash;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, UpdateUserPayload, User},
    services::{access::require_general_admin, storage::MediaStorage},
};

// Administração de usuários: restrita ao administrador geral.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    storage: MediaStorage,
}

impl UserService {
    pub fn new(user_repo: UserRepository, storage: MediaStorage) -> Self {
        Self { user_repo, storage }
    }

    pub async fn list(&self, actor: Option<&User>) -> Result<Vec<User>, AppError> {
        require_general_admin(actor)?;
        self.user_repo.list().await
    }

    pub async fn get(&self, id: Uuid, actor: Option<&User>) -> Result<User, AppError> {
        require_general_admin(actor)?;
        self.user_repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        payload: &CreateUserPayload,
        actor: Option<&User>,
    ) -> Result<User, AppError> {
        require_general_admin(actor)?;

        let password_hash = hash_password(payload.password.clone()).await?;

        let profile_photo_url = match payload.profile_photo.as_deref() {
            Some(data_uri) => Some(self.storage.store_data_uri("profiles", data_uri).await?),
            None => None,
        };

        let user = self
            .user_repo
            .create(
                &payload.username,
                &payload.email,
                &password_hash,
                &payload.first_name,
                &payload.last_name,
                payload.role,
                payload.is_active,
                profile_photo_url.as_deref(),
            )
            .await?;

        self.user_repo
            .replace_assignments(
                user.id,
                Some(&payload.client_ids),
                Some(&payload.branch_ids),
                Some(&payload.area_ids),
            )
            .await?;

        self.user_repo.find_by_id(user.id).await?.ok_or(AppError::NotFound)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateUserPayload,
        actor: Option<&User>,
    ) -> Result<User, AppError> {
        let actor = require_general_admin(actor)?;

        // Ninguém muda o próprio papel, nem o administrador geral
        if actor.id == id {
            if let Some(new_role) = payload.role {
                if new_role != actor.role {
                    return Err(AppError::forbidden("No puedes cambiar tu propio rol."));
                }
            }
        }

        if self.user_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let password_hash = match payload.password.clone() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let profile_photo_url = match payload.profile_photo.as_deref() {
            Some(data_uri) => Some(self.storage.store_data_uri("profiles", data_uri).await?),
            None => None,
        };

        let user = self
            .user_repo
            .update(
                id,
                payload.username.as_deref(),
                payload.email.as_deref(),
                password_hash.as_deref(),
                payload.first_name.as_deref(),
                payload.last_name.as_deref(),
                payload.role,
                payload.is_active,
                profile_photo_url.as_deref(),
            )
            .await?;

        self.user_repo
            .replace_assignments(
                user.id,
                payload.client_ids.as_deref(),
                payload.branch_ids.as_deref(),
                payload.area_ids.as_deref(),
            )
            .await?;

        self.user_repo.find_by_id(user.id).await?.ok_or(AppError::NotFound)
    }
}

// Hashing em thread separada para não travar o runtime
async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;
    Ok(hashed)
}
