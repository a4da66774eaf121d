// src/handlers/movimientos.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
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
    models::movimiento::CrearMovimientoPayload,
};

// Registra uma transição de saída (Traslado / Venta / Muerte): muda o
// animal e escreve exatamente um movimento, atomicamente.
#[utoipa::path(
    post,
    path = "/api/semovientes/{id}/movimientos",
    params(("id" = Uuid, Path)),
    request_body = CrearMovimientoPayload,
    responses(
        (status = 201, description = "Movimiento registrado"),
        (status = 400, description = "Transición inválida o datos faltantes"),
        (status = 403, description = "Debe ser AdminFinca de la finca de origen"),
        (status = 404, description = "Semoviente o finca destino inexistente"),
    ),
    tag = "Movimientos",
    security(("api_jwt" = []))
)]
pub async fn crear(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
    Json(payload): Json<CrearMovimientoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validacion)?;

    let movimiento = app_state
        .semoviente_service
        .registrar_movimiento(&claims, id, &payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "mensaje": "Movimiento registrado",
            "id_movimiento": movimiento.id_movimiento,
            "movimiento": movimiento,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/semovientes/{id}/movimientos",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Historial de movimientos, más recientes primero"),
        (status = 403, description = "No es miembro de ninguna finca relacionada"),
    ),
    tag = "Movimientos",
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    UsuarioAutenticado(claims): UsuarioAutenticado,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movimientos = app_state
        .semoviente_service
        .listar_movimientos(&claims, id)
        .await?;
    Ok(Json(json!({ "ok": true, "movimientos": movimientos })))
}
