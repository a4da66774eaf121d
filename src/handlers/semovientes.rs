// src/handlers/semovientes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::UsuarioAutenticado, finca::FincaContext},
    models::{
        registro_medico::{ActualizarRegistroMedicoPayload, CrearRegistroMedicoPayload},
        semoviente::{
            ActualizarSemovientePayload, CambiarEstadoPayload, CrearSemovientePayload,
        },
    },
};

#[derive(Debug, Deserialize)]
pub struct ListarQuery {
    #[serde(default)]
    pub include_inactivos: bool,
}

// A finca vem por query (?id_finca=) ou pela cabecera X-Finca-Id
#[utoipa::path(
    get,
    path = "/api/semovientes",
    responses(
        (status = 200, description = "Semovientes de la finca"),
        (status = 400, description = "Falta id_finca"),
        (status = 403, description = "No autorizado para esta finca"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    FincaContext(id_finca): FincaContext,
    Query(query): Query<ListarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let semovientes = app_state
        .semoviente_service
        .listar(&claims, id_finca, query.include_inactivos)
        .await?;
    Ok(Json(json!({ "ok": true, "semovientes": semovientes })))
}

#[utoipa::path(
    post,
    path = "/api/semovientes",
    request_body = CrearSemovientePayload,
    responses(
        (status = 201, description = "Semoviente dado de alta con su movimiento de origen"),
        (status = 400, description = "La raza no pertenece a esa especie"),
        (status = 403, description = "Requiere AdminFinca"),
        (status = 409, description = "Nro. de marca o registro duplicado"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn crear(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Json(payload): Json<CrearSemovientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let semoviente = app_state.semoviente_service.crear(&claims, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "semoviente": semoviente })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/semovientes/{id}",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Semoviente"),
        (status = 404, description = "Semoviente no encontrado"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn obtener(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let semoviente = app_state.semoviente_service.obtener(&claims, id).await?;
    Ok(Json(json!({ "ok": true, "semoviente": semoviente })))
}

#[utoipa::path(
    patch,
    path = "/api/semovientes/{id}",
    params(("id" = Uuid, Path)),
    request_body = ActualizarSemovientePayload,
    responses(
        (status = 200, description = "Semoviente actualizado"),
        (status = 409, description = "Nro. de marca o registro duplicado"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn actualizar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActualizarSemovientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let semoviente = app_state
        .semoviente_service
        .actualizar(&claims, id, &payload)
        .await?;
    Ok(Json(json!({ "ok": true, "semoviente": semoviente })))
}

#[utoipa::path(
    delete,
    path = "/api/semovientes/{id}",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Eliminado"),
        (status = 409, description = "Existen datos relacionados"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn eliminar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.semoviente_service.eliminar(&claims, id).await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Eliminado" })))
}

// Override manual de estado: não gera movimento no livro
#[utoipa::path(
    patch,
    path = "/api/semovientes/{id}/estado",
    params(("id" = Uuid, Path)),
    request_body = CambiarEstadoPayload,
    responses(
        (status = 200, description = "Estado actualizado"),
        (status = 403, description = "Requiere AdminFinca"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn cambiar_estado(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<CambiarEstadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let semoviente = app_state
        .semoviente_service
        .cambiar_estado(&claims, id, &payload)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "mensaje": "Estado actualizado",
        "semoviente": semoviente,
    })))
}

// Expediente completo: datos + historial médico + historial de movimientos
#[utoipa::path(
    get,
    path = "/api/semovientes/{id}/ficha-completa",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Ficha completa del semoviente"),
        (status = 404, description = "Semoviente no encontrado"),
    ),
    tag = "Semovientes",
    security(("api_jwt" = []))
)]
pub async fn ficha_completa(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (datos, historial_medico, historial_movimientos) = app_state
        .semoviente_service
        .ficha_completa(&claims, id)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "datos": datos,
        "historial_medico": historial_medico,
        "historial_movimientos": historial_movimientos,
    })))
}

// ---
// Registros médicos (/eventos)
// ---

#[utoipa::path(
    get,
    path = "/api/semovientes/{id}/eventos",
    params(("id" = Uuid, Path)),
    responses((status = 200, description = "Registros médicos del semoviente")),
    tag = "Registros Médicos",
    security(("api_jwt" = []))
)]
pub async fn listar_registros(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state
        .semoviente_service
        .listar_registros(&claims, id)
        .await?;
    Ok(Json(json!({ "ok": true, "registros": registros })))
}

#[utoipa::path(
    post,
    path = "/api/semovientes/{id}/eventos",
    params(("id" = Uuid, Path)),
    request_body = CrearRegistroMedicoPayload,
    responses(
        (status = 201, description = "Registro médico creado"),
        (status = 403, description = "Requiere rol de escritura en la finca"),
    ),
    tag = "Registros Médicos",
    security(("api_jwt" = []))
)]
pub async fn crear_registro(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<CrearRegistroMedicoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let registro = app_state
        .semoviente_service
        .crear_registro(&claims, id, &payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "registro": registro })),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/semovientes/{id}/eventos/{id_registro}",
    params(("id" = Uuid, Path), ("id_registro" = Uuid, Path)),
    request_body = ActualizarRegistroMedicoPayload,
    responses(
        (status = 200, description = "Registro médico actualizado"),
        (status = 404, description = "Registro no encontrado o de otro semoviente"),
    ),
    tag = "Registros Médicos",
    security(("api_jwt" = []))
)]
pub async fn actualizar_registro(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path((id, id_registro)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ActualizarRegistroMedicoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let registro = app_state
        .semoviente_service
        .actualizar_registro(&claims, id, id_registro, &payload)
        .await?;
    Ok(Json(json!({ "ok": true, "registro": registro })))
}

// Borrar um registro médico é operação de AdminFinca
#[utoipa::path(
    delete,
    path = "/api/semovientes/{id}/eventos/{id_registro}",
    params(("id" = Uuid, Path), ("id_registro" = Uuid, Path)),
    responses(
        (status = 200, description = "Registro médico eliminado"),
        (status = 403, description = "Requiere AdminFinca"),
    ),
    tag = "Registros Médicos",
    security(("api_jwt" = []))
)]
pub async fn eliminar_registro(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path((id, id_registro)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .semoviente_service
        .eliminar_registro(&claims, id, id_registro)
        .await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Registro médico eliminado" })))
}
