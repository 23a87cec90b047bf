// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::identity::Identity,
    models::dashboard::DashboardResponse,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Conteos del alcance y actividad reciente", body = DashboardResponse)
    )
)]
pub async fn summary(
    State(app_state): State<AppState>,
    Identity(user): Identity,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.scope_service.resolve_identity(user.as_ref()).await?;
    let summary = app_state.dashboard_service.summary(scope.as_ref()).await?;

    Ok((StatusCode::OK, Json(summary)))
}
