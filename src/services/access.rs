// src/services/access.rs

// Guardiões de papel compartilhados pelos serviços. A identidade chega
// sempre como argumento explícito (Option<&User>): nada de estado global
// de "usuário atual".

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

pub fn require_identity(actor: Option<&User>) -> Result<&User, AppError> {
    actor.ok_or(AppError::Unauthenticated)
}

// Escrita na hierarquia e nas visitas: só o administrador geral
pub fn require_general_admin(actor: Option<&User>) -> Result<&User, AppError> {
    let user = require_identity(actor)?;
    if user.role != Role::GeneralAdmin {
        return Err(AppError::forbidden(
            "Solo el administrador general puede realizar esta acción.",
        ));
    }
    Ok(user)
}

// Exceção de bootstrap: qualquer papel administrativo pode criar um
// cliente (e o criador não-geral recebe o acesso); inspetores nunca
// escrevem entidades da hierarquia.
pub fn require_client_writer(actor: Option<&User>) -> Result<&User, AppError> {
    let user = require_identity(actor)?;
    if !user.role.is_admin() {
        return Err(AppError::forbidden(
            "Un inspector no puede crear clientes.",
        ));
    }
    Ok(user)
}

// Incidências: administrador geral e administrador de sucursal
pub fn require_incident_writer(actor: Option<&User>) -> Result<&User, AppError> {
    let user = require_identity(actor)?;
    if !matches!(user.role, Role::GeneralAdmin | Role::BranchAdmin) {
        return Err(AppError::forbidden(
            "Tu rol no permite registrar incidencias.",
        ));
    }
    Ok(user)
}
