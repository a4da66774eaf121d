// src/models/finca.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::serde_utils::double_option;
use crate::models::auth::RolGlobal;

// ---
// 1. Finca (o "tenant" do sistema)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Finca {
    pub id_finca: Uuid,
    pub nombre_finca: String,
    pub ubicacion: Option<String>,
    pub nombre_admin: Option<String>,
    pub telefono_admin: Option<String>,

    // Cache desnormalizado: o usuário que hoje tem AdminFinca nesta finca.
    // Quando não-nulo, SEMPRE deve existir a linha correspondente em
    // usuario_finca_roles.
    pub administrador_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Rol por finca
// ---
// Os aliases em minúscula normalizam o drift de capitalização que existia
// nos dados antigos; na saída sempre emitimos a forma canônica.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "rol_finca")]
pub enum RolFinca {
    #[serde(alias = "adminfinca", alias = "adminFinca")]
    AdminFinca,
    #[serde(alias = "empleado")]
    Empleado,
    #[serde(alias = "veterinario")]
    Veterinario,
}

impl RolFinca {
    pub fn as_str(&self) -> &'static str {
        match self {
            RolFinca::AdminFinca => "AdminFinca",
            RolFinca::Empleado => "Empleado",
            RolFinca::Veterinario => "Veterinario",
        }
    }
}

// ---
// 3. MembresiaFinca (a "ponte" usuário-finca, um rol por par)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MembresiaFinca {
    pub id_usuario: Uuid,
    pub id_finca: Uuid,
    pub rol: RolFinca,
    pub created_at: DateTime<Utc>,
}

// Linha do listado de miembros (join usuario + rol na finca)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MiembroFinca {
    pub id_usuario: Uuid,
    pub nombre_usuario: String,
    pub nombre_completo: String,
    pub correo_electronico: String,
    pub rol_global: RolGlobal,
    pub rol_finca: RolFinca,
}

// Finca com o rol do usuário nela (para GET /usuarios/me)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FincaConRol {
    pub id_finca: Uuid,
    pub nombre_finca: String,
    pub rol_en_finca: String,
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearFincaPayload {
    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_finca: String,
    pub ubicacion: Option<String>,
    pub nombre_admin: Option<String>,
    pub telefono_admin: Option<String>,
    pub administrador_id: Option<Uuid>,
}

// Parche explícito: Option = campo ausente; Option<Option<..>> distingue
// "ausente" de "enviado como null" nas colunas anuláveis.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarFincaPayload {
    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_finca: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub ubicacion: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nombre_admin: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub telefono_admin: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub administrador_id: Option<Option<Uuid>>,
}

impl ActualizarFincaPayload {
    pub fn es_vacio(&self) -> bool {
        self.nombre_finca.is_none()
            && self.ubicacion.is_none()
            && self.nombre_admin.is_none()
            && self.telefono_admin.is_none()
            && self.administrador_id.is_none()
    }

    // Aplica o parche sobre a linha atual; o repo persiste a linha inteira.
    pub fn aplicar(&self, finca: &mut Finca) {
        if let Some(v) = &self.nombre_finca {
            finca.nombre_finca = v.clone();
        }
        if let Some(v) = &self.ubicacion {
            finca.ubicacion = v.clone();
        }
        if let Some(v) = &self.nombre_admin {
            finca.nombre_admin = v.clone();
        }
        if let Some(v) = &self.telefono_admin {
            finca.telefono_admin = v.clone();
        }
        if let Some(v) = &self.administrador_id {
            finca.administrador_id = *v;
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MiembroPayload {
    pub id_usuario: Uuid,
    pub rol: RolFinca,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rol_finca_acepta_minusculas() {
        let rol: RolFinca = serde_json::from_str(r#""empleado""#).unwrap();
        assert_eq!(rol, RolFinca::Empleado);
        let rol: RolFinca = serde_json::from_str(r#""veterinario""#).unwrap();
        assert_eq!(rol, RolFinca::Veterinario);
        // A saída sempre é canônica
        assert_eq!(serde_json::to_string(&rol).unwrap(), r#""Veterinario""#);
    }

    #[test]
    fn rol_finca_rechaza_desconocidos() {
        assert!(serde_json::from_str::<RolFinca>(r#""Dueno""#).is_err());
    }

    #[test]
    fn parche_distingue_ausente_de_null() {
        let p: ActualizarFincaPayload =
            serde_json::from_str(r#"{"administrador_id": null}"#).unwrap();
        assert_eq!(p.administrador_id, Some(None));
        assert!(p.nombre_finca.is_none());
        assert!(!p.es_vacio());

        let vacio: ActualizarFincaPayload = serde_json::from_str("{}").unwrap();
        assert!(vacio.es_vacio());
    }
}
