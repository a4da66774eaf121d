// src/models/semoviente.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;

// ---
// 1. Enums de domínio (tipos Postgres)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sexo_semoviente")]
pub enum Sexo {
    Macho,
    Hembra,
}

// O ciclo de vida do animal. 'Activo' é o único estado inicial; os demais
// só são alcançados por uma transição ou pelo override manual de estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_semoviente")]
pub enum EstadoSemoviente {
    Activo,
    Traslado,
    Vendido,
    Fallecido,
    Inactivo,
    Robado,
    Perdido,
}

impl EstadoSemoviente {
    pub fn es_activo(&self) -> bool {
        matches!(self, EstadoSemoviente::Activo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoSemoviente::Activo => "Activo",
            EstadoSemoviente::Traslado => "Traslado",
            EstadoSemoviente::Vendido => "Vendido",
            EstadoSemoviente::Fallecido => "Fallecido",
            EstadoSemoviente::Inactivo => "Inactivo",
            EstadoSemoviente::Robado => "Robado",
            EstadoSemoviente::Perdido => "Perdido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_ingreso")]
pub enum TipoIngreso {
    Nacimiento,
    Compra,
}

// ---
// 2. Semoviente (a cabeça de gado)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Semoviente {
    pub id_semoviente: Uuid,
    pub nro_marca: String,
    pub nro_registro: Option<String>,
    pub nombre: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    pub id_raza: Uuid,
    pub id_especie: Uuid,

    // Parentesco: referências fracas, anuladas se o pai/mãe é eliminado
    pub id_madre: Option<Uuid>,
    pub id_padre: Option<Uuid>,

    pub id_finca: Uuid,
    pub estado: EstadoSemoviente,
    pub tipo_ingreso: TipoIngreso,
    pub fecha_ingreso: NaiveDate,
    pub valor_compra: Option<Decimal>,
    pub peso_actual: Option<Decimal>,
    pub fecha_peso: Option<NaiveDate>,
    pub nro_chip: Option<String>,
    pub nro_sanitario: Option<String>,

    // Campos de baja (decomissão)
    pub fecha_salida: Option<NaiveDate>,
    pub fecha_baja: Option<NaiveDate>,
    pub motivo_baja: Option<String>,
    pub observaciones_baja: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Payloads
// ---
fn validar_positivo(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_negative() || valor.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor debe ser positivo".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearSemovientePayload {
    #[validate(length(min = 1, message = "El nro_marca es obligatorio"))]
    pub nro_marca: String,
    pub nro_registro: Option<String>,

    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub nombre: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    pub id_raza: Uuid,
    pub id_especie: Uuid,
    pub id_madre: Option<Uuid>,
    pub id_padre: Option<Uuid>,
    pub id_finca: Uuid,

    pub tipo_ingreso: TipoIngreso,
    pub fecha_ingreso: Option<NaiveDate>,

    #[validate(custom(function = "validar_positivo"))]
    pub valor_compra: Option<Decimal>,
}

// Regras que dependem do tipo_ingreso (a união discriminada do domínio):
// Nacimiento exige os pais e proíbe valor; Compra exige fecha e valor.
impl CrearSemovientePayload {
    pub fn validar_consistencia(&self) -> Result<(), ValidationError> {
        match self.tipo_ingreso {
            TipoIngreso::Nacimiento => {
                if self.id_madre.is_none() || self.id_padre.is_none() {
                    return Err(ValidationError::new("PadresRequeridosParaNacimiento"));
                }
                if self.valor_compra.is_some() {
                    return Err(ValidationError::new("ValorNoAplicaANacimiento"));
                }
            }
            TipoIngreso::Compra => {
                if self.fecha_ingreso.is_none() {
                    return Err(ValidationError::new("FechaIngresoRequeridaParaCompra"));
                }
                if self.valor_compra.is_none() {
                    return Err(ValidationError::new("ValorCompraRequeridoParaCompra"));
                }
            }
        }
        Ok(())
    }

    // Nacimiento: a data de ingresso é a própria data de nascimento.
    pub fn fecha_ingreso_efectiva(&self) -> NaiveDate {
        match self.tipo_ingreso {
            TipoIngreso::Compra => self.fecha_ingreso.unwrap_or(self.fecha_nacimiento),
            TipoIngreso::Nacimiento => self.fecha_nacimiento,
        }
    }
}

// Parche explícito com allow-list fixa de campos editáveis.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarSemovientePayload {
    #[validate(length(min = 1, message = "El nro_marca no puede ser vacío"))]
    pub nro_marca: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nro_registro: Option<Option<String>>,

    #[validate(length(min = 1, message = "El nombre no puede ser vacío"))]
    pub nombre: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<Sexo>,
    pub id_raza: Option<Uuid>,
    pub id_especie: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub id_madre: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub id_padre: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Decimal>)]
    pub peso_actual: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub fecha_peso: Option<Option<NaiveDate>>,

    pub fecha_ingreso: Option<NaiveDate>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nro_chip: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nro_sanitario: Option<Option<String>>,
}

impl ActualizarSemovientePayload {
    pub fn es_vacio(&self) -> bool {
        self.nro_marca.is_none()
            && self.nro_registro.is_none()
            && self.nombre.is_none()
            && self.fecha_nacimiento.is_none()
            && self.sexo.is_none()
            && self.id_raza.is_none()
            && self.id_especie.is_none()
            && self.id_madre.is_none()
            && self.id_padre.is_none()
            && self.peso_actual.is_none()
            && self.fecha_peso.is_none()
            && self.fecha_ingreso.is_none()
            && self.nro_chip.is_none()
            && self.nro_sanitario.is_none()
    }

    pub fn aplicar(&self, s: &mut Semoviente) {
        if let Some(v) = &self.nro_marca {
            s.nro_marca = v.clone();
        }
        if let Some(v) = &self.nro_registro {
            s.nro_registro = v.clone();
        }
        if let Some(v) = &self.nombre {
            s.nombre = v.clone();
        }
        if let Some(v) = self.fecha_nacimiento {
            s.fecha_nacimiento = v;
        }
        if let Some(v) = self.sexo {
            s.sexo = v;
        }
        if let Some(v) = self.id_raza {
            s.id_raza = v;
        }
        if let Some(v) = self.id_especie {
            s.id_especie = v;
        }
        if let Some(v) = self.id_madre {
            s.id_madre = v;
        }
        if let Some(v) = self.id_padre {
            s.id_padre = v;
        }
        if let Some(v) = self.peso_actual {
            s.peso_actual = v;
        }
        if let Some(v) = self.fecha_peso {
            s.fecha_peso = v;
        }
        if let Some(v) = self.fecha_ingreso {
            s.fecha_ingreso = v;
        }
        if let Some(v) = &self.nro_chip {
            s.nro_chip = v.clone();
        }
        if let Some(v) = &self.nro_sanitario {
            s.nro_sanitario = v.clone();
        }
    }
}

// Override administrativo de estado (no genera movimiento)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CambiarEstadoPayload {
    pub estado: EstadoSemoviente,
    pub fecha: Option<NaiveDate>,

    #[validate(length(max = 50, message = "Máximo 50 caracteres"))]
    pub motivo: Option<String>,

    #[validate(length(max = 500, message = "Máximo 500 caracteres"))]
    pub observaciones: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn base_payload(tipo: TipoIngreso) -> CrearSemovientePayload {
        CrearSemovientePayload {
            nro_marca: "M-001".into(),
            nro_registro: None,
            nombre: "Estrella".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            sexo: Sexo::Hembra,
            id_raza: Uuid::new_v4(),
            id_especie: Uuid::new_v4(),
            id_madre: None,
            id_padre: None,
            id_finca: Uuid::new_v4(),
            tipo_ingreso: tipo,
            fecha_ingreso: None,
            valor_compra: None,
        }
    }

    #[test]
    fn nacimiento_exige_padres() {
        let payload = base_payload(TipoIngreso::Nacimiento);
        assert!(payload.validar_consistencia().is_err());

        let mut con_padres = base_payload(TipoIngreso::Nacimiento);
        con_padres.id_madre = Some(Uuid::new_v4());
        con_padres.id_padre = Some(Uuid::new_v4());
        assert!(con_padres.validar_consistencia().is_ok());
    }

    #[test]
    fn nacimiento_rechaza_valor_compra() {
        let mut payload = base_payload(TipoIngreso::Nacimiento);
        payload.id_madre = Some(Uuid::new_v4());
        payload.id_padre = Some(Uuid::new_v4());
        payload.valor_compra = Some(Decimal::new(500, 0));
        assert!(payload.validar_consistencia().is_err());
    }

    #[test]
    fn compra_exige_fecha_y_valor() {
        let payload = base_payload(TipoIngreso::Compra);
        assert!(payload.validar_consistencia().is_err());

        let mut completa = base_payload(TipoIngreso::Compra);
        completa.fecha_ingreso = NaiveDate::from_ymd_opt(2024, 1, 15);
        completa.valor_compra = Some(Decimal::new(500, 0));
        assert!(completa.validar_consistencia().is_ok());
    }

    #[test]
    fn fecha_ingreso_de_nacimiento_es_la_de_nacimiento() {
        let mut payload = base_payload(TipoIngreso::Nacimiento);
        payload.fecha_ingreso = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(payload.fecha_ingreso_efectiva(), payload.fecha_nacimiento);
    }

    #[test]
    fn aplicar_parche_respeta_ausente_y_null() {
        let mut s = Semoviente {
            id_semoviente: Uuid::new_v4(),
            nro_marca: "M-001".into(),
            nro_registro: Some("R-9".into()),
            nombre: "Estrella".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            sexo: Sexo::Hembra,
            id_raza: Uuid::new_v4(),
            id_especie: Uuid::new_v4(),
            id_madre: None,
            id_padre: None,
            id_finca: Uuid::new_v4(),
            estado: EstadoSemoviente::Activo,
            tipo_ingreso: TipoIngreso::Nacimiento,
            fecha_ingreso: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            valor_compra: None,
            peso_actual: Some(Decimal::new(320, 0)),
            fecha_peso: None,
            nro_chip: None,
            nro_sanitario: None,
            fecha_salida: None,
            fecha_baja: None,
            motivo_baja: None,
            observaciones_baja: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let parche: ActualizarSemovientePayload = serde_json::from_str(
            r#"{"nombre": "Lucero", "nro_registro": null}"#,
        )
        .unwrap();

        parche.aplicar(&mut s);
        assert_eq!(s.nombre, "Lucero");
        // null explícito limpia el campo
        assert_eq!(s.nro_registro, None);
        // ausente no toca el campo
        assert_eq!(s.peso_actual, Some(Decimal::new(320, 0)));
    }
}
