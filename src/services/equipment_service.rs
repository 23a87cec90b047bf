// src/services/equipment_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EquipmentRepository, HierarchyRepository},
    models::{
        auth::User,
        equipment::{
            CreateDispenserPayload, CreateProductPayload, Dispenser, DispenserModel,
            DispenserWithProducts, Product,
        },
    },
    services::{
        access::require_general_admin,
        scope::{area_filter, AccessScope},
        storage::MediaStorage,
    },
};

// Máximo de produtos por dosificador (invariante do domínio)
const MAX_PRODUCTS_PER_DISPENSER: i64 = 4;

#[derive(Clone)]
pub struct EquipmentService {
    repo: EquipmentRepository,
    hierarchy_repo: HierarchyRepository,
    storage: MediaStorage,
}

impl EquipmentService {
    pub fn new(
        repo: EquipmentRepository,
        hierarchy_repo: HierarchyRepository,
        storage: MediaStorage,
    ) -> Self {
        Self { repo, hierarchy_repo, storage }
    }

    // --- MODELOS (catálogo somente leitura) ---

    pub async fn list_models(&self) -> Result<Vec<DispenserModel>, AppError> {
        self.repo.list_models().await
    }

    // --- DOSIFICADORES ---

    pub async fn list_dispensers(
        &self,
        scope: Option<&AccessScope>,
    ) -> Result<Vec<DispenserWithProducts>, AppError> {
        self.repo.list_dispensers(area_filter(scope)).await
    }

    pub async fn create_dispenser(
        &self,
        payload: &CreateDispenserPayload,
        actor: Option<&User>,
    ) -> Result<Dispenser, AppError> {
        require_general_admin(actor)?;

        if !self.repo.model_exists(payload.model_id).await? {
            return Err(AppError::validation("El modelo indicado no existe."));
        }

        if let Some(area_id) = payload.area_id {
            if self.hierarchy_repo.get_area(area_id, None).await?.is_none() {
                return Err(AppError::validation("El área indicada no existe."));
            }
        }

        if self
            .repo
            .identifier_exists(payload.model_id, &payload.identifier)
            .await?
        {
            return Err(AppError::validation(format!(
                "El identificador '{}' ya existe para este modelo.",
                payload.identifier
            )));
        }

        let photo_url = match payload.photo.as_deref() {
            Some(data_uri) => Some(self.storage.store_data_uri("dispensers", data_uri).await?),
            None => None,
        };

        self.repo
            .create_dispenser(
                payload.model_id,
                payload.area_id,
                &payload.identifier,
                payload.installed_at,
                photo_url.as_deref(),
            )
            .await
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self, scope: Option<&AccessScope>) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(area_filter(scope)).await
    }

    pub async fn create_product(
        &self,
        payload: &CreateProductPayload,
        actor: Option<&User>,
    ) -> Result<Product, AppError> {
        require_general_admin(actor)?;

        if self.repo.get_dispenser(payload.dispenser_id, None).await?.is_none() {
            return Err(AppError::validation("El dosificador indicado no existe."));
        }

        // O teto é verificado na criação: o 4º produto entra, o 5º não
        if self.repo.count_products(payload.dispenser_id).await? >= MAX_PRODUCTS_PER_DISPENSER {
            return Err(AppError::validation(
                "Cada dosificador puede tener máximo 4 productos.",
            ));
        }

        if self
            .repo
            .product_name_exists(payload.dispenser_id, &payload.name)
            .await?
        {
            return Err(AppError::validation(format!(
                "El producto '{}' ya existe en este dosificador.",
                payload.name
            )));
        }

        let photo_url = match payload.photo.as_deref() {
            Some(data_uri) => Some(self.storage.store_data_uri("products", data_uri).await?),
            None => None,
        };

        self.repo
            .create_product(
                payload.dispenser_id,
                &payload.name,
                &payload.description,
                photo_url.as_deref(),
            )
            .await
    }
}
