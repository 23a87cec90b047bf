// src/db/equipment_repo.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::equipment::{Dispenser, DispenserModel, DispenserWithProducts, Product},
};

const DISPENSER_SELECT: &str = r#"
    SELECT d.id, d.model_id, d.area_id, d.identifier, d.installed_at, d.photo_url,
           m.name AS model_name, a.name AS area_name, d.created_at
    FROM dispensers d
    JOIN dispenser_models m ON m.id = d.model_id
    LEFT JOIN areas a ON a.id = d.area_id
"#;

// Repositório de equipamentos: modelos, dosificadores e produtos.
#[derive(Clone)]
pub struct EquipmentRepository {
    pool: PgPool,
}

impl EquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- MODELOS (catálogo) ---

    pub async fn list_models(&self) -> Result<Vec<DispenserModel>, AppError> {
        let models = sqlx::query_as::<_, DispenserModel>(
            r#"
            SELECT id, name, manufacturer, description, photo_url, created_at
            FROM dispenser_models
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(models)
    }

    pub async fn model_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM dispenser_models WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    // --- DOSIFICADORES ---

    pub async fn list_dispensers(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Vec<DispenserWithProducts>, AppError> {
        let dispensers = sqlx::query_as::<_, Dispenser>(&format!(
            "{DISPENSER_SELECT} WHERE ($1::uuid[] IS NULL OR d.area_id = ANY($1)) ORDER BY d.identifier"
        ))
        .bind(scope_area_ids)
        .fetch_all(&self.pool)
        .await?;

        // Anexa os produtos em uma única consulta, agrupando por dosificador
        let ids: Vec<Uuid> = dispensers.iter().map(|d| d.id).collect();
        let mut products_by_dispenser: HashMap<Uuid, Vec<Product>> = HashMap::new();
        if !ids.is_empty() {
            let products = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, dispenser_id, name, description, photo_url, created_at
                FROM products
                WHERE dispenser_id = ANY($1)
                ORDER BY name
                "#,
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

            for product in products {
                products_by_dispenser
                    .entry(product.dispenser_id)
                    .or_default()
                    .push(product);
            }
        }

        Ok(dispensers
            .into_iter()
            .map(|dispenser| {
                let products = products_by_dispenser.remove(&dispenser.id).unwrap_or_default();
                DispenserWithProducts { dispenser, products }
            })
            .collect())
    }

    pub async fn get_dispenser(
        &self,
        id: Uuid,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Dispenser>, AppError> {
        let dispenser = sqlx::query_as::<_, Dispenser>(&format!(
            "{DISPENSER_SELECT} WHERE d.id = $1 AND ($2::uuid[] IS NULL OR d.area_id = ANY($2))"
        ))
        .bind(id)
        .bind(scope_area_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dispenser)
    }

    pub async fn identifier_exists(
        &self,
        model_id: Uuid,
        identifier: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dispensers WHERE model_id = $1 AND identifier = $2)",
        )
        .bind(model_id)
        .bind(identifier)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_dispenser(
        &self,
        model_id: Uuid,
        area_id: Option<Uuid>,
        identifier: &str,
        installed_at: Option<chrono::NaiveDate>,
        photo_url: Option<&str>,
    ) -> Result<Dispenser, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO dispensers (model_id, area_id, identifier, installed_at, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(model_id)
        .bind(area_id)
        .bind(identifier)
        .bind(installed_at)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "El identificador '{identifier}' ya existe para este modelo."
                    ));
                }
            }
            e.into()
        })?;

        self.get_dispenser(id, None).await?.ok_or(AppError::NotFound)
    }

    // --- PRODUTOS ---

    pub async fn list_products(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.dispenser_id, p.name, p.description, p.photo_url, p.created_at
            FROM products p
            JOIN dispensers d ON d.id = p.dispenser_id
            WHERE ($1::uuid[] IS NULL OR d.area_id = ANY($1))
            ORDER BY p.name
            "#,
        )
        .bind(scope_area_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn count_products(&self, dispenser_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE dispenser_id = $1")
                .bind(dispenser_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn product_name_exists(
        &self,
        dispenser_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE dispenser_id = $1 AND name = $2)",
        )
        .bind(dispenser_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_product(
        &self,
        dispenser_id: Uuid,
        name: &str,
        description: &str,
        photo_url: Option<&str>,
    ) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (dispenser_id, name, description, photo_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, dispenser_id, name, description, photo_url, created_at
            "#,
        )
        .bind(dispenser_id)
        .bind(name)
        .bind(description)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "El producto '{name}' ya existe en este dosificador."
                    ));
                }
            }
            e.into()
        })
    }
}
