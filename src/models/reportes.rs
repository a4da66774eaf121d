// src/models/reportes.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Uma linha de GROUP BY: a chave (estado, especie ou sexo) e a contagem.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ConteoPorClave {
    pub clave: String,
    pub total: i64,
}

// Desglose del inventario de una finca
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReporteInventario {
    pub total: i64,
    pub por_estado: Vec<ConteoPorClave>,
    pub por_especie: Vec<ConteoPorClave>,
    pub por_sexo: Vec<ConteoPorClave>,
}

// Evento médico con vencimiento dentro del horizonte consultado
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EventoProximo {
    pub id_registro_medico: Uuid,
    pub id_semoviente: Uuid,
    pub nro_marca: String,
    pub nombre_semoviente: String,
    pub tipo_evento_medico: String,
    pub nombre_vacuna: Option<String>,
    pub proxima_fecha: NaiveDate,
    pub veterinario_responsable: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReporteSanitario {
    pub dias: i64,
    pub total: i64,
    pub eventos: Vec<EventoProximo>,
}
