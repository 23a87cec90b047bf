// src/services/visit_service.rs

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HierarchyRepository, UserRepository, VisitRepository},
    models::{
        auth::{Role, User},
        visit::{
            CreateVisitPayload, GeoPoint, MediaType, VisitDetail, VisitReport, VisitStatus,
        },
    },
    services::{
        access::{require_general_admin, require_identity},
        scope::{area_filter, AccessScope},
        storage::MediaStorage,
    },
};

// Um arquivo de evidência já extraído do multipart pela camada HTTP
#[derive(Debug)]
pub struct EvidenceFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// A máquina de estados da visita. Só existem dois estados (scheduled e
// completed); "em andamento" é scheduled com started_at preenchido. A única
// transição de status é scheduled -> completed.
#[derive(Clone)]
pub struct VisitService {
    pool: sqlx::PgPool,
    repo: VisitRepository,
    hierarchy_repo: HierarchyRepository,
    user_repo: UserRepository,
    storage: MediaStorage,
}

impl VisitService {
    pub fn new(
        pool: sqlx::PgPool,
        repo: VisitRepository,
        hierarchy_repo: HierarchyRepository,
        user_repo: UserRepository,
        storage: MediaStorage,
    ) -> Self {
        Self { pool, repo, hierarchy_repo, user_repo, storage }
    }

    pub async fn list(
        &self,
        scope: Option<&AccessScope>,
        month: Option<&str>,
    ) -> Result<Vec<VisitDetail>, AppError> {
        let period = match month {
            Some(raw) => Some(parse_month(raw)?),
            None => None,
        };
        self.repo.list(area_filter(scope), period).await
    }

    pub async fn get(
        &self,
        id: Uuid,
        scope: Option<&AccessScope>,
    ) -> Result<VisitDetail, AppError> {
        let mut visit = self
            .repo
            .get(id, area_filter(scope))
            .await?
            .ok_or(AppError::NotFound)?;
        visit.media = self.repo.list_media(visit.id).await?;
        Ok(visit)
    }

    // Agendamento: só o administrador geral cria visitas, sempre em
    // 'scheduled' e sem dados de início/fim.
    pub async fn create(
        &self,
        payload: &CreateVisitPayload,
        actor: Option<&User>,
    ) -> Result<VisitDetail, AppError> {
        require_general_admin(actor)?;

        if self.hierarchy_repo.get_area(payload.area_id, None).await?.is_none() {
            return Err(AppError::validation("El área indicada no existe."));
        }

        if let Some(inspector_id) = payload.inspector_id {
            let inspector = self.user_repo.find_by_id(inspector_id).await?;
            if !inspector.is_some_and(|u| u.role == Role::Inspector) {
                return Err(AppError::validation("El inspector indicado no existe."));
            }
        }

        let id = self
            .repo
            .create(
                // Sem transação aqui: é um único INSERT
                &self.pool,
                payload.area_id,
                payload.dispenser_id,
                payload.inspector_id,
                payload.visited_at,
                &payload.notes,
            )
            .await?;

        self.get(id, None).await
    }

    // start: legal só a partir de 'scheduled', pelo inspetor designado (ou
    // auto-designação se a visita ainda não tem inspetor). Não muda o
    // status; registrar de novo sobrescreve os dados de início.
    pub async fn start(
        &self,
        visit_id: Uuid,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Result<VisitDetail, AppError> {
        let actor = require_inspector(actor)?;
        let visit = self.get(visit_id, scope).await?;

        if visit.status != VisitStatus::Scheduled {
            return Err(AppError::validation("La visita ya fue finalizada."));
        }
        ensure_assigned_or_unclaimed(&visit, actor)?;

        let latitude = parse_coordinate(latitude)?;
        let longitude = parse_coordinate(longitude)?;

        self.repo
            .mark_started(visit_id, actor.id, latitude, longitude)
            .await?;

        self.get(visit_id, None).await
    }

    // complete: exige visita iniciada, coordenadas de fim e o informe
    // estruturado válido. Depois classifica e guarda as evidências.
    pub async fn complete(
        &self,
        visit_id: Uuid,
        actor: Option<&User>,
        scope: Option<&AccessScope>,
        latitude: Option<&str>,
        longitude: Option<&str>,
        report_raw: Option<&Value>,
        evidence: Vec<EvidenceFile>,
    ) -> Result<VisitDetail, AppError> {
        let actor = require_inspector(actor)?;
        let visit = self.get(visit_id, scope).await?;

        if visit.status != VisitStatus::Scheduled {
            return Err(AppError::validation("La visita ya fue finalizada."));
        }
        if visit.started_at.is_none() {
            return Err(AppError::validation(
                "No se puede finalizar una visita que no fue iniciada.",
            ));
        }
        ensure_assigned_or_unclaimed(&visit, actor)?;

        let latitude = parse_coordinate(latitude)?;
        let longitude = parse_coordinate(longitude)?;

        let report_raw = report_raw
            .ok_or_else(|| AppError::validation("El informe de la visita es obligatorio."))?;
        let mut report = VisitReport::parse(report_raw)?;
        report.validate()?;

        // O servidor anexa as localizações registradas ao documento
        if let (Some(lat), Some(lon)) = (visit.start_latitude, visit.start_longitude) {
            report.start_location = Some(GeoPoint { latitude: lat, longitude: lon });
        }
        report.end_location = Some(GeoPoint { latitude, longitude });

        let report_value = serde_json::to_value(&report)
            .map_err(|e| anyhow::anyhow!("No se pudo serializar el informe: {e}"))?;

        self.repo
            .mark_completed(visit_id, latitude, longitude, &report_value)
            .await?;

        // Evidências: classifica por content-type (com fallback pela
        // extensão) e guarda cada uma como VisitMedia
        for file in evidence {
            let media_type = classify_media(file.content_type.as_deref(), &file.filename);
            let url = self.storage.store("visits", &file.filename, &file.bytes).await?;
            self.repo
                .insert_media(visit_id, media_type, &url, &file.filename)
                .await?;
        }

        self.get(visit_id, None).await
    }
}

fn require_inspector(actor: Option<&User>) -> Result<&User, AppError> {
    let user = require_identity(actor)?;
    if user.role != Role::Inspector {
        return Err(AppError::forbidden(
            "Solo un inspector puede ejecutar la visita.",
        ));
    }
    Ok(user)
}

// Designado, ou livre para auto-designação. Atribuída a outro: rejeita.
fn ensure_assigned_or_unclaimed(visit: &VisitDetail, actor: &User) -> Result<(), AppError> {
    match visit.inspector_id {
        Some(assigned) if assigned != actor.id => Err(AppError::forbidden(
            "La visita está asignada a otro inspector.",
        )),
        _ => Ok(()),
    }
}

// Ambas as coordenadas precisam vir e ser números
pub fn parse_coordinate(raw: Option<&str>) -> Result<f64, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            AppError::validation(
                "Las coordenadas (latitud y longitud) son obligatorias y deben ser numéricas.",
            )
        })
}

// Filtro ?month=YYYY-MM -> [primeiro dia, primeiro dia do mês seguinte)
pub fn parse_month(raw: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let invalid = || AppError::validation("El filtro de mes debe tener el formato YYYY-MM.");

    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)?;

    Ok((start, end))
}

// Classificação da evidência: primeiro o content-type declarado, depois a
// extensão do arquivo. O que não for foto nem vídeo vira 'other'.
pub fn classify_media(content_type: Option<&str>, filename: &str) -> MediaType {
    if let Some(ct) = content_type {
        let ct = ct.trim().to_lowercase();
        if ct.starts_with("image/") {
            return MediaType::Photo;
        }
        if ct.starts_with("video/") {
            return MediaType::Video;
        }
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" => MediaType::Photo,
        "mp4" | "mov" | "avi" | "mkv" | "webm" => MediaType::Video,
        _ => MediaType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_declared_content_type() {
        assert_eq!(classify_media(Some("image/jpeg"), "evidencia.dat"), MediaType::Photo);
        assert_eq!(classify_media(Some("video/mp4"), "evidencia.jpg"), MediaType::Video);
        assert_eq!(classify_media(Some("application/pdf"), "informe.pdf"), MediaType::Other);
    }

    #[test]
    fn classify_falls_back_to_extension() {
        assert_eq!(classify_media(None, "foto.JPG"), MediaType::Photo);
        assert_eq!(classify_media(Some("application/octet-stream"), "clip.mov"), MediaType::Video);
        assert_eq!(classify_media(None, "audio.ogg"), MediaType::Other);
        assert_eq!(classify_media(None, "sin_extension"), MediaType::Other);
    }

    #[test]
    fn coordinates_must_be_present_and_numeric() {
        assert_eq!(parse_coordinate(Some("19.4326")).unwrap(), 19.4326);
        assert_eq!(parse_coordinate(Some(" -99.13 ")).unwrap(), -99.13);
        assert!(parse_coordinate(None).is_err());
        assert!(parse_coordinate(Some("")).is_err());
        assert!(parse_coordinate(Some("diecinueve")).is_err());
    }

    #[test]
    fn month_filter_builds_half_open_range() {
        let (start, end) = parse_month("2026-07").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());

        // Dezembro vira janeiro do ano seguinte
        let (_, end) = parse_month("2025-12").unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_filter_rejects_garbage() {
        assert!(parse_month("2026").is_err());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("07-2026").is_err());
        assert!(parse_month("julio").is_err());
    }
}
