// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::finca::RolFinca;

// O rol global do sistema, distinto dos roles por finca.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rol_global")]
pub enum RolGlobal {
    SuperAdmin,
    Usuario,
}

impl Default for RolGlobal {
    fn default() -> Self {
        RolGlobal::Usuario
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Usuario {
    pub id_usuario: Uuid,
    pub nombre_usuario: String,
    pub correo_electronico: String,

    // IMPORTANTE para segurança: o hash nunca sai na resposta
    #[serde(skip_serializing)]
    pub contrasena: String,

    pub rol: RolGlobal,
    pub nombre_completo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id_usuario: Uuid,
    pub rol: RolGlobal,
    pub nombre_usuario: String,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// Asignación opcional a uma finca no momento do registro
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AsignacionPayload {
    pub id_finca: Uuid,
    pub rol_finca: RolFinca,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistroPayload {
    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_usuario: String,

    #[validate(email(message = "Correo inválido"))]
    pub correo_electronico: String,

    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub contrasena: String,

    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_completo: String,

    // Se não vier, o rol global é 'Usuario'
    #[serde(default)]
    pub rol_global: RolGlobal,

    pub asignacion: Option<AsignacionPayload>,
}

// Dados para login (nombre de usuario OU correo)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 3, message = "Usuario o correo"))]
    pub usuario: String,

    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub contrasena: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshPayload {
    #[serde(rename = "refreshToken")]
    #[validate(length(min = 1, message = "Falta refreshToken"))]
    pub refresh_token: String,
}

// O par de tokens emitido no login e no refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct ParTokens {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

// ---
// Payloads de gestão de usuários
// ---

// PATCH /usuarios/me
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarPerfilPayload {
    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_completo: Option<String>,

    #[validate(email(message = "Correo inválido"))]
    pub correo_electronico: Option<String>,
}

impl ActualizarPerfilPayload {
    pub fn es_vacio(&self) -> bool {
        self.nombre_completo.is_none() && self.correo_electronico.is_none()
    }
}

// PATCH /usuarios/:id (solo SuperAdmin)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarUsuarioAdminPayload {
    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_usuario: Option<String>,

    #[validate(email(message = "Correo inválido"))]
    pub correo_electronico: Option<String>,

    #[validate(length(min = 3, message = "Mínimo 3 caracteres"))]
    pub nombre_completo: Option<String>,

    pub rol: Option<RolGlobal>,
}

impl ActualizarUsuarioAdminPayload {
    pub fn es_vacio(&self) -> bool {
        self.nombre_usuario.is_none()
            && self.correo_electronico.is_none()
            && self.nombre_completo.is_none()
            && self.rol.is_none()
    }

    pub fn aplicar(&self, usuario: &mut Usuario) {
        if let Some(v) = &self.nombre_usuario {
            usuario.nombre_usuario = v.clone();
        }
        if let Some(v) = &self.correo_electronico {
            usuario.correo_electronico = v.clone();
        }
        if let Some(v) = &self.nombre_completo {
            usuario.nombre_completo = v.clone();
        }
        if let Some(v) = self.rol {
            usuario.rol = v;
        }
    }
}

// PATCH /usuarios/me/password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CambiarContrasenaPayload {
    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub contrasena_actual: String,

    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub contrasena_nueva: String,
}

// PATCH /usuarios/:id/password — o dono manda as duas; o SuperAdmin só a nova
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CambiarPasswordPayload {
    pub contrasena_actual: Option<String>,

    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub nueva: String,
}

// PATCH /usuarios/:id/password/reset (solo SuperAdmin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 8, message = "Mínimo 8 caracteres"))]
    pub nueva: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rol_global_por_defecto_es_usuario() {
        let json = r#"{
            "nombre_usuario": "pedro",
            "correo_electronico": "pedro@example.com",
            "contrasena": "secreta123",
            "nombre_completo": "Pedro Pérez"
        }"#;
        let payload: RegistroPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.rol_global, RolGlobal::Usuario);
        assert!(payload.asignacion.is_none());
    }

    #[test]
    fn par_tokens_usa_camel_case() {
        let tokens = ParTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        let v = serde_json::to_value(&tokens).unwrap();
        assert!(v.get("accessToken").is_some());
        assert!(v.get("refreshToken").is_some());
    }
}
