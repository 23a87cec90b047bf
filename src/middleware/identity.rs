// src/middleware/identity.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

// A identidade do chamador viaja no cabeçalho X-Current-User-Email e é
// resolvida contra os usuários ativos, sem distinção de maiúsculas.
// Ausente ou desconhecida = anônimo (None), nunca erro: quem exige
// identidade são os guardiões de papel dos serviços.
pub struct Identity(pub Option<User>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let email = parts
            .headers
            .get("x-current-user-email")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let user = app_state.auth_service.resolve_identity(email).await?;
        Ok(Identity(user))
    }
}
