// src/handlers/notifications.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::identity::Identity,
    models::notification::NotificationItem,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notificaciones",
    responses(
        (status = 200, description = "Feed de visitas e incidencias (máx. 50)", body = [NotificationItem])
    )
)]
pub async fn feed(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let items = app_state.notification_service.feed(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(json!({ "results": items }))))
}
