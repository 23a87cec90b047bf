// src/services/auth_service.rs

use bcrypt::verify;

use crate::{common::error::AppError, db::UserRepository, models::auth::User};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
}

impl AuthService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    // Contrato do login: 401 para credenciais ruins, 403 para conta
    // desativada, usuário serializado no sucesso.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // Verificação do bcrypt em thread separada para não travar o runtime
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        Ok(user)
    }

    // Resolve a identidade do cabeçalho X-Current-User-Email: busca sem
    // distinção de maiúsculas entre os usuários ATIVOS. Ausente ou
    // desconhecido vira anônimo, nunca erro.
    pub async fn resolve_identity(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }

        let user = self.user_repo.find_by_email(email).await?;
        Ok(user.filter(|u| u.is_active))
    }
}
