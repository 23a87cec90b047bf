// src/handlers/visits.rs

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{identity::Identity, json::ApiJson},
    models::visit::{CreateVisitPayload, VisitAction, VisitDetail},
    services::{report_service::PublicLink, visit_service::EvidenceFile},
};

#[derive(Debug, Deserialize)]
pub struct VisitListQuery {
    // ?month=YYYY-MM
    pub month: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/visits",
    tag = "Visitas",
    params(("month" = Option<String>, Query, description = "Filtro YYYY-MM")),
    responses(
        (status = 200, description = "Visitas dentro del alcance", body = [VisitDetail])
    )
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Query(query): Query<VisitListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let visits = app_state
        .visit_service
        .list(scope.as_ref(), query.month.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(json!({ "results": visits }))))
}

#[utoipa::path(
    post,
    path = "/api/visits",
    tag = "Visitas",
    request_body = CreateVisitPayload,
    responses(
        (status = 201, description = "Visita agendada", body = VisitDetail),
        (status = 403, description = "Solo el administrador general agenda visitas")
    )
)]
pub async fn create_visit(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state.visit_service.create(&payload, user.as_ref()).await?;

    Ok((StatusCode::CREATED, Json(visit)))
}

#[utoipa::path(
    get,
    path = "/api/visits/{id}",
    tag = "Visitas",
    responses(
        (status = 200, description = "Detalle de la visita", body = VisitDetail),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn get_visit(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let visit = app_state.visit_service.get(id, scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(visit)))
}

// --- FLUXO MÓVEL (PATCH /api/visits/{id}) ---

// O app manda JSON no start e multipart no complete (as evidências só
// passam por multipart), mas os dois formatos servem para as duas ações.
#[derive(Debug, Default, Deserialize)]
struct MobileFlowJson {
    action: Option<String>,
    latitude: Option<Value>,
    longitude: Option<Value>,
    report: Option<Value>,
}

#[derive(Debug, Default)]
struct MobileFlowInput {
    action: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    report: Option<Value>,
    evidence: Vec<EvidenceFile>,
}

#[utoipa::path(
    patch,
    path = "/api/visits/{id}",
    tag = "Visitas",
    responses(
        (status = 200, description = "Visita actualizada", body = VisitDetail),
        (status = 400, description = "Acción, coordenadas o informe inválidos"),
        (status = 403, description = "No es el inspector designado")
    )
)]
pub async fn mobile_flow(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_mobile_flow(request).await?;

    let action = input
        .action
        .as_deref()
        .and_then(VisitAction::from_input)
        .ok_or_else(|| {
            AppError::validation(
                "Acción inválida. Usa 'start'/'iniciar' o 'complete'/'finalizar'.",
            )
        })?;

    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;

    let visit = match action {
        VisitAction::Start => {
            app_state
                .visit_service
                .start(
                    id,
                    user.as_ref(),
                    scope.as_ref(),
                    input.latitude.as_deref(),
                    input.longitude.as_deref(),
                )
                .await?
        }
        VisitAction::Complete => {
            app_state
                .visit_service
                .complete(
                    id,
                    user.as_ref(),
                    scope.as_ref(),
                    input.latitude.as_deref(),
                    input.longitude.as_deref(),
                    input.report.as_ref(),
                    input.evidence,
                )
                .await?
        }
    };

    Ok((StatusCode::OK, Json(visit)))
}

async fn parse_mobile_flow(request: Request) -> Result<MobileFlowInput, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| AppError::validation("El formulario multipart es inválido."))?;
        return parse_multipart(multipart).await;
    }

    let ApiJson(body) = ApiJson::<MobileFlowJson>::from_request(request, &()).await?;
    Ok(MobileFlowInput {
        action: body.action,
        latitude: body.latitude.as_ref().and_then(coord_string),
        longitude: body.longitude.as_ref().and_then(coord_string),
        report: body.report,
        evidence: Vec::new(),
    })
}

async fn parse_multipart(mut multipart: Multipart) -> Result<MobileFlowInput, AppError> {
    let invalid = || AppError::validation("El formulario multipart es inválido.");
    let mut input = MobileFlowInput::default();

    while let Some(field) = multipart.next_field().await.map_err(|_| invalid())? {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);

        match name.as_deref() {
            Some("action") => input.action = Some(field.text().await.map_err(|_| invalid())?),
            Some("latitude") => input.latitude = Some(field.text().await.map_err(|_| invalid())?),
            Some("longitude") => input.longitude = Some(field.text().await.map_err(|_| invalid())?),
            // O informe chega como texto JSON dentro do multipart
            Some("report") => {
                input.report = Some(Value::String(field.text().await.map_err(|_| invalid())?));
            }
            // Qualquer campo com arquivo é evidência
            _ => {
                if let Some(filename) = file_name {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|_| invalid())?.to_vec();
                    input.evidence.push(EvidenceFile { filename, content_type, bytes });
                }
            }
        }
    }

    Ok(input)
}

fn coord_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

// --- INFORMES ---

#[utoipa::path(
    get,
    path = "/api/visits/{id}/report",
    tag = "Visitas",
    responses(
        (status = 200, description = "PDF del informe (descarga)", content_type = "application/pdf"),
        (status = 400, description = "La visita no está finalizada"),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn download_report(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let visit = app_state
        .report_service
        .visit_for_report(id, scope.as_ref())
        .await?;

    // O PDF baixado carrega o QR do enlace público, para compartilhar
    let link = app_state.report_service.issue_public_link(&visit)?;
    let pdf = app_state.report_service.render(&visit, Some(&link.url)).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"informe-visita-{id}.pdf\""),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf))
}

#[utoipa::path(
    get,
    path = "/api/visits/{id}/public-link",
    tag = "Visitas",
    responses(
        (status = 200, description = "Enlace público firmado (30 días)", body = PublicLink),
        (status = 400, description = "La visita no está finalizada")
    )
)]
pub async fn issue_public_link(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let visit = app_state
        .report_service
        .visit_for_report(id, scope.as_ref())
        .await?;

    let link = app_state.report_service.issue_public_link(&visit)?;
    Ok((StatusCode::OK, Json(link)))
}

#[utoipa::path(
    get,
    path = "/api/visits/report/public/{token}",
    tag = "Visitas",
    responses(
        (status = 200, description = "PDF del informe (inline, anónimo)", content_type = "application/pdf"),
        (status = 404, description = "Token inválido, expirado o visita no finalizada")
    )
)]
pub async fn public_report(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state.report_service.resolve_public_visit(&token).await?;

    let url = format!(
        "{}/api/visits/report/public/{token}",
        app_state.public_base_url
    );
    let pdf = app_state.report_service.render(&visit, Some(&url)).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, "inline".to_string()),
    ];

    Ok((StatusCode::OK, headers, pdf))
}

#[utoipa::path(
    get,
    path = "/api/visits/report/public/{token}/detail",
    tag = "Visitas",
    responses(
        (status = 200, description = "Detalle JSON de la visita (anónimo)", body = VisitDetail),
        (status = 404, description = "Token inválido, expirado o visita no finalizada")
    )
)]
pub async fn public_report_detail(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state.report_service.resolve_public_visit(&token).await?;

    Ok((StatusCode::OK, Json(visit)))
}
