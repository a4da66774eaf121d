// src/handlers/usuarios.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::UsuarioAutenticado,
    models::auth::{
        ActualizarPerfilPayload, ActualizarUsuarioAdminPayload, CambiarContrasenaPayload,
        CambiarPasswordPayload, ResetPasswordPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/usuarios/me",
    responses((status = 200, description = "Perfil y fincas del usuario")),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn mi_perfil(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
) -> Result<impl IntoResponse, AppError> {
    let (usuario, fincas) = app_state.usuario_service.perfil(&claims).await?;
    Ok(Json(json!({ "ok": true, "usuario": usuario, "fincas": fincas })))
}

#[utoipa::path(
    patch,
    path = "/api/usuarios/me",
    request_body = ActualizarPerfilPayload,
    responses(
        (status = 200, description = "Perfil actualizado"),
        (status = 409, description = "Correo duplicado"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn actualizar_mi_perfil(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Json(payload): Json<ActualizarPerfilPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let usuario = app_state
        .usuario_service
        .actualizar_perfil(&claims, &payload)
        .await?;
    Ok(Json(json!({ "ok": true, "usuario": usuario })))
}

#[utoipa::path(
    patch,
    path = "/api/usuarios/me/password",
    request_body = CambiarContrasenaPayload,
    responses(
        (status = 200, description = "Contraseña actualizada"),
        (status = 401, description = "Contraseña actual incorrecta"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn cambiar_mi_contrasena(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Json(payload): Json<CambiarContrasenaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    app_state
        .usuario_service
        .cambiar_mi_contrasena(&claims, &payload.contrasena_actual, &payload.contrasena_nueva)
        .await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Contraseña actualizada" })))
}

// Só o SuperAdmin enxerga o listado global
#[utoipa::path(
    get,
    path = "/api/usuarios",
    responses((status = 200, description = "Listado de usuarios")),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
) -> Result<impl IntoResponse, AppError> {
    let usuarios = app_state.usuario_service.listar(&claims).await?;
    Ok(Json(json!({ "ok": true, "usuarios": usuarios })))
}

#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path)),
    request_body = ActualizarUsuarioAdminPayload,
    responses(
        (status = 200, description = "Usuario actualizado"),
        (status = 404, description = "Usuario no encontrado"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn actualizar_admin(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActualizarUsuarioAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let usuario = app_state
        .usuario_service
        .actualizar_admin(&claims, id, &payload)
        .await?;
    Ok(Json(json!({ "ok": true, "usuario": usuario })))
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Usuario eliminado"),
        (status = 403, description = "Regla de eliminación violada"),
        (status = 409, description = "Tiene datos relacionados"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn eliminar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.usuario_service.eliminar(&claims, id).await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Usuario eliminado" })))
}

// Um só endpoint: o SuperAdmin troca a de terceiros com { nueva }; o dono
// troca a própria com { contrasena_actual, nueva }.
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/password",
    params(("id" = Uuid, Path)),
    request_body = CambiarPasswordPayload,
    responses(
        (status = 200, description = "Contraseña actualizada"),
        (status = 403, description = "Solo SuperAdmin cambia contraseñas de terceros"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn cambiar_password(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<CambiarPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    app_state
        .usuario_service
        .cambiar_password(&claims, id, payload.contrasena_actual.as_deref(), &payload.nueva)
        .await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Contraseña actualizada" })))
}

#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/password/reset",
    params(("id" = Uuid, Path)),
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Contraseña reseteada"),
        (status = 404, description = "Usuario no encontrado"),
    ),
    tag = "Usuarios",
    security(("api_jwt" = []))
)]
pub async fn resetear_contrasena(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    app_state
        .usuario_service
        .resetear_contrasena(&claims, id, &payload.nueva)
        .await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Contraseña reseteada" })))
}
