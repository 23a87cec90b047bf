// src/handlers/users.rs

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
    models::auth::{CreateUserPayload, LoginPayload, UpdateUserPayload, User},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Usuario autenticado", body = User),
        (status = 401, description = "Credenciales inválidas"),
        (status = 403, description = "Cuenta desactivada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::OK, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Todos los usuarios", body = [User]),
        (status = 403, description = "Solo el administrador general")
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list(user.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": users }))))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Usuarios",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuario creado", body = User),
        (status = 400, description = "Correo o nombre de usuario duplicado")
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.user_service.create(&payload, user.as_ref()).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuario", body = User),
        (status = 404, description = "Inexistente")
    )
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let found = app_state.user_service.get(id, user.as_ref()).await?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Usuarios",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuario actualizado", body = User),
        (status = 403, description = "Nadie cambia su propio rol")
    )
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let updated = app_state
        .user_service
        .update(id, &payload, user.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
