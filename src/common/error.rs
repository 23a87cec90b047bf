use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens que chegam ao cliente são em espanhol (idioma do produto).
#[derive(Debug, Error)]
pub enum AppError {
    // Entrada malformada ou invariante quebrada -> 400
    #[error("{0}")]
    Validation(String),

    // Erros do `validator` nos payloads -> 400 com detalhes por campo
    #[error("Erro de validação")]
    PayloadValidation(#[from] validator::ValidationErrors),

    // Identidade ausente onde ela é exigida -> 401
    #[error("Autenticación requerida.")]
    Unauthenticated,

    #[error("Credenciales inválidas.")]
    InvalidCredentials,

    // Conta existe mas está desativada -> 403
    #[error("La cuenta está desactivada.")]
    InactiveAccount,

    // O papel do usuário não permite a ação -> 403
    #[error("{0}")]
    Forbidden(String),

    // Inclui recursos fora do escopo do usuário: a resposta é a mesma de um
    // recurso inexistente, para não confirmar a existência a quem não pode ver.
    #[error("Recurso no encontrado.")]
    NotFound,

    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Atalho para os erros de regra de negócio (mensagem direta pro cliente)
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),

            // Retorna todos os detalhes da validação de payload.
            AppError::PayloadValidation(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Autenticación requerida.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Credenciales inválidas.".to_string())
            }
            AppError::InactiveAccount => {
                (StatusCode::FORBIDDEN, "La cuenta está desactivada.".to_string())
            }
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Recurso no encontrado.".to_string()),

            // Todos os outros erros (Database, Internal...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
