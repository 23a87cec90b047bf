// src/handlers/equipment.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{identity::Identity, json::ApiJson},
    models::equipment::{
        CreateDispenserPayload, CreateProductPayload, Dispenser, DispenserModel,
        DispenserWithProducts, Product,
    },
};

#[utoipa::path(
    get,
    path = "/api/dispenser-models",
    tag = "Equipos",
    responses(
        (status = 200, description = "Catálogo de modelos", body = [DispenserModel])
    )
)]
pub async fn list_models(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let models = app_state.equipment_service.list_models().await?;

    Ok((StatusCode::OK, Json(json!({ "results": models }))))
}

#[utoipa::path(
    get,
    path = "/api/dispensers",
    tag = "Equipos",
    responses(
        (status = 200, description = "Dosificadores con sus productos", body = [DispenserWithProducts])
    )
)]
pub async fn list_dispensers(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let dispensers = app_state
        .equipment_service
        .list_dispensers(scope.as_ref())
        .await?;

    Ok((StatusCode::OK, Json(json!({ "results": dispensers }))))
}

#[utoipa::path(
    post,
    path = "/api/dispensers",
    tag = "Equipos",
    request_body = CreateDispenserPayload,
    responses(
        (status = 201, description = "Dosificador creado", body = Dispenser),
        (status = 400, description = "Identificador duplicado dentro del modelo")
    )
)]
pub async fn create_dispenser(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateDispenserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let dispenser = app_state
        .equipment_service
        .create_dispenser(&payload, user.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(dispenser)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Equipos",
    responses(
        (status = 200, description = "Productos dentro del alcance", body = [Product])
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let products = app_state.equipment_service.list_products(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": products }))))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Equipos",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Producto creado", body = Product),
        (status = 400, description = "Tope de 4 productos o nombre duplicado")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Identity(user): Identity,
    ApiJson(payload): ApiJson<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .equipment_service
        .create_product(&payload, user.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}
