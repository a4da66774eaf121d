// src/models/movimiento.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_movimiento")]
pub enum TipoMovimiento {
    Nacimiento,
    Compra,
    Traslado,
    Venta,
    Muerte,
}

// Entrada do livro de movimentos: append-only, é a trilha de auditoria de
// cada evento de ciclo de vida. Nunca se atualiza nem se apaga.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Movimiento {
    pub id_movimiento: Uuid,
    pub id_semoviente: Uuid,
    pub tipo_movimiento: TipoMovimiento,
    pub fecha_movimiento: NaiveDate,
    pub finca_origen_id: Option<Uuid>,
    pub finca_destino_id: Option<Uuid>,
    pub valor: Option<Decimal>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Os três movimentos que um AdminFinca pode solicitar pela API.
// Nacimiento/Compra só nascem junto com o semovente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TipoMovimientoSolicitado {
    Traslado,
    Muerte,
    Venta,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearMovimientoPayload {
    pub tipo: TipoMovimientoSolicitado,
    pub destino_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Máximo 500 caracteres"))]
    pub observaciones: Option<String>,

    // Precio de venta (obligatorio y positivo para Venta)
    pub valor: Option<Decimal>,
}
