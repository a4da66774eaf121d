// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ActorOpcional,
    models::auth::{LoginPayload, RefreshPayload, RegistroPayload},
};

// Registro com regras de privilégio: a rota é pública, mas um token
// presente habilita criar SuperAdmin ou asignar a finca.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegistroPayload,
    responses(
        (status = 201, description = "Usuario registrado"),
        (status = 403, description = "Rol o asignación no permitidos"),
        (status = 409, description = "Usuario o correo ya registrado"),
    ),
    tag = "Auth"
)]
pub async fn registrar(
    State(app_state): State<AppState>,
    actor: ActorOpcional,
    Json(payload): Json<RegistroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let (usuario, asignacion) = app_state
        .auth_service
        .registrar(actor.0.as_ref(), &payload)
        .await?;

    let mut body = json!({ "ok": true, "usuario": usuario });
    if let Some(asignacion) = asignacion {
        body["asignacion"] = json!(asignacion);
    }
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Tokens emitidos"),
        (status = 401, description = "Credenciales inválidas"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let (usuario, tokens) = app_state
        .auth_service
        .login(&payload.usuario, &payload.contrasena)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
        "usuario": usuario,
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Par de tokens renovado"),
        (status = 401, description = "Refresh token inválido"),
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let tokens = app_state.auth_service.refresh(&payload.refresh_token).await?;

    Ok(Json(json!({
        "ok": true,
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
    })))
}
