// src/models/registro_medico.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RegistroMedico {
    pub id_registro_medico: Uuid,
    pub id_semoviente: Uuid,
    pub fecha_consulta: NaiveDate,
    pub tipo_evento_medico: String,
    pub diagnostico: Option<String>,
    pub tratamiento_aplicado: Option<String>,
    pub veterinario_responsable: Option<String>,
    pub costo: Option<Decimal>,
    pub observaciones: Option<String>,
    pub nombre_vacuna: Option<String>,
    pub dosis: Option<String>,

    // Próximo controle/vacina; alimenta o relatório sanitário
    pub proxima_fecha: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validar_costo(costo: &Decimal) -> Result<(), ValidationError> {
    if costo.is_sign_negative() || costo.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("El costo debe ser positivo".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearRegistroMedicoPayload {
    pub fecha_consulta: NaiveDate,

    #[validate(length(min = 1, max = 50, message = "Entre 1 y 50 caracteres"))]
    pub tipo_evento_medico: String,

    pub diagnostico: Option<String>,
    pub tratamiento_aplicado: Option<String>,

    #[validate(length(max = 100, message = "Máximo 100 caracteres"))]
    pub veterinario_responsable: Option<String>,

    #[validate(custom(function = "validar_costo"))]
    pub costo: Option<Decimal>,

    pub observaciones: Option<String>,

    #[validate(length(max = 100, message = "Máximo 100 caracteres"))]
    pub nombre_vacuna: Option<String>,

    #[validate(length(max = 50, message = "Máximo 50 caracteres"))]
    pub dosis: Option<String>,

    pub proxima_fecha: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarRegistroMedicoPayload {
    pub fecha_consulta: Option<NaiveDate>,

    #[validate(length(min = 1, max = 50, message = "Entre 1 y 50 caracteres"))]
    pub tipo_evento_medico: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub diagnostico: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub tratamiento_aplicado: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub veterinario_responsable: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Decimal>)]
    pub costo: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub observaciones: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nombre_vacuna: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub dosis: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub proxima_fecha: Option<Option<NaiveDate>>,
}

impl ActualizarRegistroMedicoPayload {
    pub fn es_vacio(&self) -> bool {
        self.fecha_consulta.is_none()
            && self.tipo_evento_medico.is_none()
            && self.diagnostico.is_none()
            && self.tratamiento_aplicado.is_none()
            && self.veterinario_responsable.is_none()
            && self.costo.is_none()
            && self.observaciones.is_none()
            && self.nombre_vacuna.is_none()
            && self.dosis.is_none()
            && self.proxima_fecha.is_none()
    }

    pub fn aplicar(&self, r: &mut RegistroMedico) {
        if let Some(v) = self.fecha_consulta {
            r.fecha_consulta = v;
        }
        if let Some(v) = &self.tipo_evento_medico {
            r.tipo_evento_medico = v.clone();
        }
        if let Some(v) = &self.diagnostico {
            r.diagnostico = v.clone();
        }
        if let Some(v) = &self.tratamiento_aplicado {
            r.tratamiento_aplicado = v.clone();
        }
        if let Some(v) = &self.veterinario_responsable {
            r.veterinario_responsable = v.clone();
        }
        if let Some(v) = self.costo {
            r.costo = v;
        }
        if let Some(v) = &self.observaciones {
            r.observaciones = v.clone();
        }
        if let Some(v) = &self.nombre_vacuna {
            r.nombre_vacuna = v.clone();
        }
        if let Some(v) = &self.dosis {
            r.dosis = v.clone();
        }
        if let Some(v) = self.proxima_fecha {
            r.proxima_fecha = v;
        }
    }
}
