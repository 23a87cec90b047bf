// src/handlers/incidents.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{identity::Identity, json::ApiJson},
    models::{
        incident::{CreateIncidentPayload, IncidentDetail, ScheduleVisitPayload},
        visit::VisitDetail,
    },
};

#[utoipa::path(
    get,
    path = "/api/incidents",
    tag = "Incidencias",
    responses(
        (status = 200, description = "Incidencias dentro del alcance", body = [IncidentDetail])
    )
)]
pub async fn list_incidents(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let incidents = app_state.incident_service.list(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": incidents }))))
}

#[utoipa::path(
    post,
    path = "/api/incidents",
    tag = "Incidencias",
    request_body = CreateIncidentPayload,
    responses(
        (status = 201, description = "Incidencia registrada", body = IncidentDetail),
        (status = 400, description = "La cadena cliente/sucursal/área/dosificador no es consistente"),
        (status = 403, description = "Rol sin permiso")
    )
)]
pub async fn create_incident(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateIncidentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let incident = app_state
        .incident_service
        .create(&payload, user.as_ref(), scope.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(incident)))
}

#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    tag = "Incidencias",
    responses(
        (status = 200, description = "Incidencia", body = IncidentDetail),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn get_incident(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let incident = app_state.incident_service.get(id, scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(incident)))
}

#[utoipa::path(
    post,
    path = "/api/incidents/{id}/schedule-visit",
    tag = "Incidencias",
    request_body = ScheduleVisitPayload,
    responses(
        (status = 201, description = "Visita agendada; la incidencia se elimina", body = VisitDetail),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn schedule_visit(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ScheduleVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let visit = app_state
        .incident_service
        .schedule_visit(id, &payload, user.as_ref(), scope.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(visit)))
}
