// src/db/visit_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::visit::{MediaType, VisitDetail, VisitMedia},
};

// A visão completa da visita, com a cadeia cliente/sucursal/área resolvida.
// O nome do inspetor cai para o username quando não há nome completo.
const VISIT_SELECT: &str = r#"
    SELECT v.id, v.area_id, a.name AS area_name,
           b.id AS branch_id, b.name AS branch_name,
           c.id AS client_id, c.name AS client_name,
           v.dispenser_id, d.identifier AS dispenser_identifier,
           v.inspector_id,
           CASE WHEN u.id IS NULL THEN NULL
                ELSE COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username)
           END AS inspector_name,
           v.visited_at, v.notes, v.status, v.started_at, v.completed_at,
           v.start_latitude, v.start_longitude, v.end_latitude, v.end_longitude,
           v.visit_report
    FROM visits v
    JOIN areas a ON a.id = v.area_id
    JOIN branches b ON b.id = a.branch_id
    JOIN clients c ON c.id = b.client_id
    LEFT JOIN dispensers d ON d.id = v.dispenser_id
    LEFT JOIN users u ON u.id = v.inspector_id
"#;

#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
        period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<VisitDetail>, AppError> {
        let (from, to) = match period {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        let visits = sqlx::query_as::<_, VisitDetail>(&format!(
            r#"
            {VISIT_SELECT}
            WHERE ($1::uuid[] IS NULL OR v.area_id = ANY($1))
              AND ($2::timestamptz IS NULL OR v.visited_at >= $2)
              AND ($3::timestamptz IS NULL OR v.visited_at < $3)
            ORDER BY v.visited_at DESC
            "#
        ))
        .bind(scope_area_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    pub async fn recent(
        &self,
        scope_area_ids: Option<Vec<Uuid>>,
        limit: i64,
    ) -> Result<Vec<VisitDetail>, AppError> {
        let visits = sqlx::query_as::<_, VisitDetail>(&format!(
            r#"
            {VISIT_SELECT}
            WHERE ($1::uuid[] IS NULL OR v.area_id = ANY($1))
            ORDER BY v.visited_at DESC
            LIMIT $2
            "#
        ))
        .bind(scope_area_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    pub async fn get(
        &self,
        id: Uuid,
        scope_area_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<VisitDetail>, AppError> {
        let visit = sqlx::query_as::<_, VisitDetail>(&format!(
            "{VISIT_SELECT} WHERE v.id = $1 AND ($2::uuid[] IS NULL OR v.area_id = ANY($2))"
        ))
        .bind(id)
        .bind(scope_area_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(visit)
    }

    // Cria a visita agendada. Recebe o executor para compor com a conversão
    // de incidência (criar visita + apagar incidência na mesma transação).
    pub async fn create<'e, E>(
        &self,
        executor: E,
        area_id: Uuid,
        dispenser_id: Option<Uuid>,
        inspector_id: Option<Uuid>,
        visited_at: Option<DateTime<Utc>>,
        notes: &str,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO visits (area_id, dispenser_id, inspector_id, visited_at, notes)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING id
            "#,
        )
        .bind(area_id)
        .bind(dispenser_id)
        .bind(inspector_id)
        .bind(visited_at)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    // Registra o início: inspetor, instante e coordenadas de partida.
    // Não muda o status; reiniciar uma visita já iniciada sobrescreve.
    pub async fn mark_started(
        &self,
        id: Uuid,
        inspector_id: Uuid,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE visits
            SET inspector_id = $2, started_at = NOW(),
                start_latitude = $3, start_longitude = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(inspector_id)
        .bind(latitude)
        .bind(longitude)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_completed(
        &self,
        id: Uuid,
        latitude: f64,
        longitude: f64,
        report: &Value,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE visits
            SET status = 'completed', completed_at = NOW(),
                end_latitude = $2, end_longitude = $3, visit_report = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .bind(report)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_media(
        &self,
        visit_id: Uuid,
        media_type: MediaType,
        file_url: &str,
        description: &str,
    ) -> Result<VisitMedia, AppError> {
        let media = sqlx::query_as::<_, VisitMedia>(
            r#"
            INSERT INTO visit_media (visit_id, media_type, file_url, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, visit_id, media_type, file_url, description, created_at
            "#,
        )
        .bind(visit_id)
        .bind(media_type)
        .bind(file_url)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(media)
    }

    pub async fn list_media(&self, visit_id: Uuid) -> Result<Vec<VisitMedia>, AppError> {
        let media = sqlx::query_as::<_, VisitMedia>(
            r#"
            SELECT id, visit_id, media_type, file_url, description, created_at
            FROM visit_media
            WHERE visit_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(visit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }
}
