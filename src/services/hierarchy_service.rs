// src/services/hierarchy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HierarchyRepository, UserRepository},
    models::{
        auth::{Role, User},
        hierarchy::{
            Area, Branch, Client, CreateAreaPayload, CreateBranchPayload, CreateClientPayload,
            UpdateAreaPayload, UpdateBranchPayload, UpdateClientPayload,
        },
    },
    services::{
        access::{require_client_writer, require_general_admin},
        scope::{area_filter, branch_filter, client_filter, AccessScope},
    },
};

// O gateway de entidades da hierarquia: toda leitura passa pelo filtro de
// escopo, toda escrita pelos guardiões de papel e pelas pré-checagens de
// unicidade (mensagem limpa; a constraint do banco continua sendo a fonte
// da verdade).
#[derive(Clone)]
pub struct HierarchyService {
    pool: PgPool,
    repo: HierarchyRepository,
    user_repo: UserRepository,
}

impl HierarchyService {
    pub fn new(pool: PgPool, repo: HierarchyRepository, user_repo: UserRepository) -> Self {
        Self { pool, repo, user_repo }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_clients(&self, scope: Option<&AccessScope>) -> Result<Vec<Client>, AppError> {
        self.repo.list_clients(client_filter(scope)).await
    }

    // Fora do escopo responde igual a inexistente: 404, sem vazar existência
    pub async fn get_client(
        &self,
        id: Uuid,
        scope: Option<&AccessScope>,
    ) -> Result<Client, AppError> {
        self.repo
            .get_client(id, client_filter(scope))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_client(
        &self,
        payload: &CreateClientPayload,
        actor: Option<&User>,
    ) -> Result<Client, AppError> {
        let actor = require_client_writer(actor)?;

        // Pré-checagem para a mensagem amigável; a corrida fica com o banco
        if self.repo.client_code_exists(&payload.code, None).await? {
            return Err(AppError::validation(format!(
                "El código '{}' ya está en uso.",
                payload.code
            )));
        }

        let mut tx = self.pool.begin().await?;

        let client = self
            .repo
            .create_client(&mut *tx, &payload.name, &payload.code, &payload.notes)
            .await?;

        // Bootstrap: quem não é administrador geral recebe o cliente recém
        // criado na própria lista de atribuições, para não perder o acesso.
        if actor.role != Role::GeneralAdmin {
            self.user_repo
                .grant_client(&mut *tx, actor.id, client.id)
                .await?;
        }

        tx.commit().await?;

        Ok(client)
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        payload: &UpdateClientPayload,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<Client, AppError> {
        require_general_admin(actor)?;

        // Confirma que existe (e está no escopo) antes de atualizar
        self.get_client(id, scope).await?;

        if let Some(code) = payload.code.as_deref() {
            if self.repo.client_code_exists(code, Some(id)).await? {
                return Err(AppError::validation(format!(
                    "El código '{code}' ya está en uso."
                )));
            }
        }

        self.repo
            .update_client(
                id,
                payload.name.as_deref(),
                payload.code.as_deref(),
                payload.notes.as_deref(),
            )
            .await
    }

    // =========================================================================
    //  SUCURSAIS
    // =========================================================================

    pub async fn list_branches(&self, scope: Option<&AccessScope>) -> Result<Vec<Branch>, AppError> {
        self.repo.list_branches(branch_filter(scope)).await
    }

    pub async fn get_branch(
        &self,
        id: Uuid,
        scope: Option<&AccessScope>,
    ) -> Result<Branch, AppError> {
        self.repo
            .get_branch(id, branch_filter(scope))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_branch(
        &self,
        payload: &CreateBranchPayload,
        actor: Option<&User>,
    ) -> Result<Branch, AppError> {
        require_general_admin(actor)?;

        if self.repo.get_client(payload.client_id, None).await?.is_none() {
            return Err(AppError::validation("El cliente indicado no existe."));
        }

        if self
            .repo
            .branch_name_exists(payload.client_id, &payload.name, None)
            .await?
        {
            return Err(AppError::validation(format!(
                "La sucursal '{}' ya existe para este cliente.",
                payload.name
            )));
        }

        self.repo
            .create_branch(payload.client_id, &payload.name, &payload.address, &payload.city)
            .await
    }

    pub async fn update_branch(
        &self,
        id: Uuid,
        payload: &UpdateBranchPayload,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<Branch, AppError> {
        require_general_admin(actor)?;

        let current = self.get_branch(id, scope).await?;

        if let Some(name) = payload.name.as_deref() {
            if self
                .repo
                .branch_name_exists(current.client_id, name, Some(id))
                .await?
            {
                return Err(AppError::validation(format!(
                    "La sucursal '{name}' ya existe para este cliente."
                )));
            }
        }

        self.repo
            .update_branch(
                id,
                payload.name.as_deref(),
                payload.address.as_deref(),
                payload.city.as_deref(),
            )
            .await
    }

    // =========================================================================
    //  ÁREAS
    // =========================================================================

    pub async fn list_areas(&self, scope: Option<&AccessScope>) -> Result<Vec<Area>, AppError> {
        self.repo.list_areas(area_filter(scope)).await
    }

    pub async fn get_area(&self, id: Uuid, scope: Option<&AccessScope>) -> Result<Area, AppError> {
        self.repo
            .get_area(id, area_filter(scope))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_area(
        &self,
        payload: &CreateAreaPayload,
        actor: Option<&User>,
    ) -> Result<Area, AppError> {
        require_general_admin(actor)?;

        if self.repo.get_branch(payload.branch_id, None).await?.is_none() {
            return Err(AppError::validation("La sucursal indicada no existe."));
        }

        if self
            .repo
            .area_name_exists(payload.branch_id, &payload.name, None)
            .await?
        {
            return Err(AppError::validation(format!(
                "El área '{}' ya existe en esta sucursal.",
                payload.name
            )));
        }

        self.repo
            .create_area(payload.branch_id, &payload.name, &payload.description)
            .await
    }

    pub async fn update_area(
        &self,
        id: Uuid,
        payload: &UpdateAreaPayload,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<Area, AppError> {
        require_general_admin(actor)?;

        let current = self.get_area(id, scope).await?;

        if let Some(name) = payload.name.as_deref() {
            if self
                .repo
                .area_name_exists(current.branch_id, name, Some(id))
                .await?
            {
                return Err(AppError::validation(format!(
                    "El área '{name}' ya existe en esta sucursal."
                )));
            }
        }

        self.repo
            .update_area(id, payload.name.as_deref(), payload.description.as_deref())
            .await
    }

    // A exclusão cascateia para as visitas da área
    pub async fn delete_area(
        &self,
        id: Uuid,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
    ) -> Result<(), AppError> {
        require_general_admin(actor)?;

        self.get_area(id, scope).await?;

        if !self.repo.delete_area(id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
