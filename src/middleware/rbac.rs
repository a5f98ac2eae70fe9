// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// Guardião de rota: só deixa passar administradores.
///
/// A autenticação já aconteceu no `auth_guard`; aqui só se decide papel.
/// Carrega o usuário junto para o handler não precisar extrair duas vezes.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o usuário autenticado
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // B. Match exaustivo no papel: papel novo = decisão forçada aqui.
        match user.role {
            UserRole::Admin => Ok(RequireAdmin(user)),
            UserRole::Operator => Err(AppError::Forbidden),
        }
    }
}
