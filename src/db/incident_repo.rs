// src/db/incident_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        incident::{IncidentDetail, IncidentMedia},
        visit::MediaType,
    },
};

const INCIDENT_SELECT: &str = r#"
    SELECT i.id, i.client_id, c.name AS client_name,
           i.branch_id, b.name AS branch_name,
           i.area_id, a.name AS area_name,
           i.dispenser_id, d.identifier AS dispenser_identifier,
           i.description, i.created_at
    FROM incidents i
    JOIN clients c ON c.id = i.client_id
    JOIN branches b ON b.id = i.branch_id
    JOIN areas a ON a.id = i.area_id
    JOIN dispensers d ON d.id = i.dispenser_id
"#;

#[derive(Clone)]
pub struct IncidentRepository {
    pool: PgPool,
}

impl IncidentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Vec<IncidentDetail>, AppError> {
        let incidents = sqlx::query_as::<_, IncidentDetail>(&format!(
            r#"
            {INCIDENT_SELECT}
            WHERE ($1::uuid[] IS NULL OR i.area_id = ANY($1))
            ORDER BY i.created_at DESC
            "#
        ))
        .bind(scope_area_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(incidents)
    }

    pub async fn recent(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
        limit: i64,
    ) -> Result<Vec<IncidentDetail>, AppError> {
        let incidents = sqlx::query_as::<_, IncidentDetail>(&format!(
            r#"
            {INCIDENT_SELECT}
            WHERE ($1::uuid[] IS NULL OR i.area_id = ANY($1))
            ORDER BY i.created_at DESC
            LIMIT $2
            "#
        ))
        .bind(scope_area_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(incidents)
    }

    pub async fn get(
        &self,
        id: Uuid,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<IncidentDetail>, AppError> {
        let incident = sqlx::query_as::<_, IncidentDetail>(&format!(
            "{INCIDENT_SELECT} WHERE i.id = $1 AND ($2::uuid[] IS NULL OR i.area_id = ANY($2))"
        ))
        .bind(id)
        .bind(scope_area_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(incident)
    }

    pub async fn create(
        &self,
        client_id: Uuid,
        branch_id: Uuid,
        area_id: Uuid,
        dispenser_id: Uuid,
        description: &str,
    ) -> Result<IncidentDetail, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO incidents (client_id, branch_id, area_id, dispenser_id, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(client_id)
        .bind(branch_id)
        .bind(area_id)
        .bind(dispenser_id)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        self.get(id, None).await?.ok_or(AppError::NotFound)
    }

    // A conversão em visita apaga a incidência na mesma transação
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn insert_media(
        &self,
        incident_id: Uuid,
        media_type: MediaType,
        file_url: &str,
        description: &str,
    ) -> Result<IncidentMedia, AppError> {
        let media = sqlx::query_as::<_, IncidentMedia>(
            r#"
            INSERT INTO incident_media (incident_id, media_type, file_url, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, incident_id, media_type, file_url, description, created_at
            "#,
        )
        .bind(incident_id)
        .bind(media_type)
        .bind(file_url)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(media)
    }

    pub async fn list_media(&self, incident_id: Uuid) -> Result<Vec<IncidentMedia>, AppError> {
        let media = sqlx::query_as::<_, IncidentMedia>(
            r#"
            SELECT id, incident_id, media_type, file_url, description, created_at
            FROM incident_media
            WHERE incident_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(incident_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }
}
