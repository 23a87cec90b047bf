// src/handlers/hierarchy.rs

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
    models::hierarchy::{
        Area, Branch, Client, CreateAreaPayload, CreateBranchPayload, CreateClientPayload,
        UpdateAreaPayload, UpdateBranchPayload, UpdateClientPayload,
    },
};

// =========================================================================
//  CLIENTES
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Clientes dentro del alcance del usuario", body = [Client])
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let clients = app_state.hierarchy_service.list_clients(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": clients }))))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente creado", body = Client),
        (status = 400, description = "Código duplicado o payload inválido"),
        (status = 403, description = "Rol sin permiso de escritura")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .hierarchy_service
        .create_client(&payload, user.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let client = app_state.hierarchy_service.get_client(id, scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(client)))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente actualizado", body = Client),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let client = app_state
        .hierarchy_service
        .update_client(id, &payload, user.as_ref(), scope.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// =========================================================================
//  SUCURSAIS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Sucursales",
    responses(
        (status = 200, description = "Sucursales dentro del alcance", body = [Branch])
    )
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let branches = app_state.hierarchy_service.list_branches(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": branches }))))
}

#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Sucursales",
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Sucursal creada", body = Branch),
        (status = 400, description = "Nombre duplicado dentro del cliente")
    )
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch = app_state
        .hierarchy_service
        .create_branch(&payload, user.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    tag = "Sucursales",
    responses(
        (status = 200, description = "Sucursal", body = Branch),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn get_branch(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let branch = app_state.hierarchy_service.get_branch(id, scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(branch)))
}

#[utoipa::path(
    put,
    path = "/api/branches/{id}",
    tag = "Sucursales",
    request_body = UpdateBranchPayload,
    responses(
        (status = 200, description = "Sucursal actualizada", body = Branch)
    )
)]
pub async fn update_branch(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let branch = app_state
        .hierarchy_service
        .update_branch(id, &payload, user.as_ref(), scope.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(branch)))
}

// =========================================================================
//  ÁREAS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/areas",
    tag = "Áreas",
    responses(
        (status = 200, description = "Áreas dentro del alcance", body = [Area])
    )
)]
pub async fn list_areas(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let areas = app_state.hierarchy_service.list_areas(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": areas }))))
}

#[utoipa::path(
    post,
    path = "/api/areas",
    tag = "Áreas",
    request_body = CreateAreaPayload,
    responses(
        (status = 201, description = "Área creada", body = Area),
        (status = 400, description = "Nombre duplicado dentro de la sucursal")
    )
)]
pub async fn create_area(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateAreaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let area = app_state
        .hierarchy_service
        .create_area(&payload, user.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(area)))
}

#[utoipa::path(
    get,
    path = "/api/areas/{id}",
    tag = "Áreas",
    responses(
        (status = 200, description = "Área", body = Area),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn get_area(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let area = app_state.hierarchy_service.get_area(id, scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(area)))
}

#[utoipa::path(
    put,
    path = "/api/areas/{id}",
    tag = "Áreas",
    request_body = UpdateAreaPayload,
    responses(
        (status = 200, description = "Área actualizada", body = Area)
    )
)]
pub async fn update_area(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateAreaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let area = app_state
        .hierarchy_service
        .update_area(id, &payload, user.as_ref(), scope.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(area)))
}

#[utoipa::path(
    delete,
    path = "/api/areas/{id}",
    tag = "Áreas",
    responses(
        (status = 204, description = "Área eliminada (las visitas cascatean)"),
        (status = 404, description = "Inexistente o fuera del alcance")
    )
)]
pub async fn delete_area(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    app_state
        .hierarchy_service
        .delete_area(id, user.as_ref(), scope.as_ref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
