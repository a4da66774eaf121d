// src/handlers/fincas.rs

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
    middleware::auth::UsuarioAutenticado,
    models::finca::{ActualizarFincaPayload, CrearFincaPayload, MiembroPayload, RolFinca},
};

// ---
// CRUD de fincas
// ---

#[utoipa::path(
    get,
    path = "/api/fincas",
    responses((status = 200, description = "Fincas visibles para el usuario")),
    tag = "Fincas",
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
) -> Result<impl IntoResponse, AppError> {
    let fincas = app_state.finca_service.listar(&claims).await?;
    Ok(Json(json!({ "ok": true, "fincas": fincas })))
}

#[utoipa::path(
    get,
    path = "/api/fincas/{id}",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Finca"),
        (status = 403, description = "Sin acceso a esta finca"),
        (status = 404, description = "Finca no encontrada"),
    ),
    tag = "Fincas",
    security(("api_jwt" = []))
)]
pub async fn obtener(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let finca = app_state.finca_service.obtener(&claims, id).await?;
    Ok(Json(json!({ "ok": true, "finca": finca })))
}

#[utoipa::path(
    post,
    path = "/api/fincas",
    request_body = CrearFincaPayload,
    responses(
        (status = 201, description = "Finca creada"),
        (status = 403, description = "Solo SuperAdmin puede crear fincas"),
        (status = 409, description = "Nombre de finca duplicado"),
    ),
    tag = "Fincas",
    security(("api_jwt" = []))
)]
pub async fn crear(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Json(payload): Json<CrearFincaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let finca = app_state.finca_service.crear(&claims, &payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "finca": finca }))))
}

#[utoipa::path(
    patch,
    path = "/api/fincas/{id}",
    params(("id" = Uuid, Path)),
    request_body = ActualizarFincaPayload,
    responses(
        (status = 200, description = "Finca actualizada"),
        (status = 403, description = "Solo AdminFinca puede editar esta finca"),
        (status = 404, description = "Finca no encontrada"),
    ),
    tag = "Fincas",
    security(("api_jwt" = []))
)]
pub async fn actualizar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActualizarFincaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let finca = app_state
        .finca_service
        .actualizar(&claims, id, &payload)
        .await?;
    Ok(Json(json!({ "ok": true, "finca": finca })))
}

#[utoipa::path(
    delete,
    path = "/api/fincas/{id}",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Finca eliminada"),
        (status = 403, description = "Solo SuperAdmin puede eliminar fincas"),
        (status = 409, description = "Existen datos asociados"),
    ),
    tag = "Fincas",
    security(("api_jwt" = []))
)]
pub async fn eliminar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.finca_service.eliminar(&claims, id).await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Finca eliminada" })))
}

// ---
// Miembros (roles por finca)
// ---

#[utoipa::path(
    get,
    path = "/api/fincas/{id}/miembros",
    params(("id" = Uuid, Path)),
    responses((status = 200, description = "Miembros de la finca")),
    tag = "Miembros",
    security(("api_jwt" = []))
)]
pub async fn listar_miembros(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let miembros = app_state
        .membresia_service
        .listar_miembros(&claims, id)
        .await?;
    Ok(Json(json!({ "ok": true, "miembros": miembros })))
}

#[utoipa::path(
    post,
    path = "/api/fincas/{id}/miembros",
    params(("id" = Uuid, Path)),
    request_body = MiembroPayload,
    responses(
        (status = 201, description = "Rol asignado (upsert)"),
        (status = 400, description = "Usuario o finca inexistente"),
        (status = 403, description = "Requiere AdminFinca o SuperAdmin"),
    ),
    tag = "Miembros",
    security(("api_jwt" = []))
)]
pub async fn asignar_miembro(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<MiembroPayload>,
) -> Result<impl IntoResponse, AppError> {
    let asignacion = app_state
        .membresia_service
        .asignar_rol(&claims, id, payload.id_usuario, payload.rol)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "asignacion": asignacion })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct QuitarMiembroQuery {
    pub rol: Option<RolFinca>,
}

#[utoipa::path(
    delete,
    path = "/api/fincas/{id}/miembros/{id_usuario}",
    params(("id" = Uuid, Path), ("id_usuario" = Uuid, Path)),
    responses(
        (status = 200, description = "Rol eliminado"),
        (status = 400, description = "Falta el rol a remover"),
        (status = 404, description = "No existía esa asignación"),
    ),
    tag = "Miembros",
    security(("api_jwt" = []))
)]
pub async fn quitar_miembro(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path((id, id_usuario)): Path<(Uuid, Uuid)>,
    Query(query): Query<QuitarMiembroQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rol = query.rol.ok_or_else(|| {
        AppError::Datos(
            "Debe enviar rol a remover (?rol=Empleado|Veterinario|AdminFinca)".to_string(),
        )
    })?;

    app_state
        .membresia_service
        .revocar_rol(&claims, id, id_usuario, rol)
        .await?;
    Ok(Json(json!({ "ok": true, "mensaje": "Rol eliminado" })))
}

// ---
// Reportes
// ---

#[derive(Debug, Deserialize)]
pub struct InventarioQuery {
    #[serde(default)]
    pub include_inactivos: bool,
}

#[utoipa::path(
    get,
    path = "/api/fincas/{id}/reportes/inventario",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Desglose del inventario"),
        (status = 403, description = "Sin acceso a esta finca"),
    ),
    tag = "Reportes",
    security(("api_jwt" = []))
)]
pub async fn reporte_inventario(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Query(query): Query<InventarioQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reporte = app_state
        .reportes_service
        .inventario(&claims, id, query.include_inactivos)
        .await?;
    Ok(Json(json!({ "ok": true, "reporte": reporte })))
}

#[derive(Debug, Deserialize)]
pub struct SanitarioQuery {
    pub dias: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/fincas/{id}/reportes/sanitario",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Eventos médicos próximos"),
        (status = 400, description = "Horizonte fuera de rango"),
    ),
    tag = "Reportes",
    security(("api_jwt" = []))
)]
pub async fn reporte_sanitario(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Query(query): Query<SanitarioQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reporte = app_state
        .reportes_service
        .sanitario(&claims, id, query.dias)
        .await?;
    Ok(Json(json!({ "ok": true, "reporte": reporte })))
}
