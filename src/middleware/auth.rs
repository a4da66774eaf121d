// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Claims};

// O guard de autenticação: verifica o Bearer token e injeta os claims
// ({id_usuario, rol, nombre_usuario}) nos extensions da requisição. A
// verificação é só do token; quem precisa da linha do usuário consulta o
// banco no service.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = app_state.auth_service.validar_token(token.trim())?;
            request.extensions_mut().insert(UsuarioAutenticado(claims));
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::Autenticacion("Token requerido".to_string()))
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct UsuarioAutenticado(pub Claims);

impl<S> FromRequestParts<S> for UsuarioAutenticado
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UsuarioAutenticado>()
            .cloned()
            .ok_or_else(|| AppError::Autenticacion("Token requerido".to_string()))
    }
}

// Actor opcional para as rotas públicas que aceitam token (o registro):
// sem header -> None; header presente mas inválido -> 401.
pub struct ActorOpcional(pub Option<Claims>);

impl<S> FromRequestParts<S> for ActorOpcional
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) => {
                let token = header
                    .strip_prefix("Bearer ")
                    .ok_or(AppError::TokenInvalido)?;
                let app_state = AppState::from_ref(state);
                let claims = app_state.auth_service.validar_token(token.trim())?;
                Ok(ActorOpcional(Some(claims)))
            }
            None => Ok(ActorOpcional(None)),
        }
    }
}
