use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Cada variante mapeia para um status HTTP da taxonomia da API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Datos inválidos")]
    Validacion(#[from] validator::ValidationErrors),

    // Entrada malformada detectada já dentro da lógica (400)
    #[error("{0}")]
    Datos(String),

    #[error("{0}")]
    Autenticacion(String),

    #[error("Token inválido o expirado")]
    TokenInvalido,

    #[error("{0}")]
    Autorizacion(String),

    #[error("{0}")]
    NoEncontrado(String),

    #[error("{mensaje}")]
    Conflicto {
        mensaje: String,
        detalle: Option<String>,
    },

    // Violação de chave estrangeira: a entidade referenciada não existe (400)
    #[error("{0}")]
    ReferenciaInvalida(String),

    // Transição de ciclo de vida ilegal (400)
    #[error("{0}")]
    EstadoInvalido(String),

    // Variante para erros de banco de dados
    #[error("Error de base de datos")]
    BaseDatos(#[from] sqlx::Error),

    #[error("Error de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Error interno del servidor")]
    Interno(#[from] anyhow::Error),
}

impl AppError {
    pub fn conflicto(mensaje: impl Into<String>) -> Self {
        AppError::Conflicto {
            mensaje: mensaje.into(),
            detalle: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, mensaje, detalle) = match self {
            // Retorna todos os detalhes da validação em `issues`.
            AppError::Validacion(errors) => {
                let mut issues = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let mensajes: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    issues.insert(field.to_string(), mensajes);
                }
                let body = Json(json!({
                    "ok": false,
                    "mensaje": "Datos inválidos",
                    "issues": issues,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::Datos(m)
            | AppError::ReferenciaInvalida(m)
            | AppError::EstadoInvalido(m) => (StatusCode::BAD_REQUEST, m, None),

            AppError::Autenticacion(m) => (StatusCode::UNAUTHORIZED, m, None),
            AppError::TokenInvalido => (
                StatusCode::UNAUTHORIZED,
                "Token inválido o expirado".to_string(),
                None,
            ),
            AppError::Autorizacion(m) => (StatusCode::FORBIDDEN, m, None),
            AppError::NoEncontrado(m) => (StatusCode::NOT_FOUND, m, None),
            AppError::Conflicto { mensaje, detalle } => {
                (StatusCode::CONFLICT, mensaje, detalle)
            }

            // Todos os outros (BaseDatos, Bcrypt, Jwt, Interno) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "ok": false, "mensaje": mensaje });
        if let Some(detalle) = detalle {
            body["detalle"] = json!(detalle);
        }
        (status, Json(body)).into_response()
    }
}

// Converte os códigos de erro do Postgres que nos interessam
// (23505 unique, 23503 foreign key) no erro da taxonomia.
pub fn mapear_error_sqlx(
    e: sqlx::Error,
    mensaje_unico: &str,
    mensaje_fk: &str,
) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflicto {
                mensaje: mensaje_unico.to_string(),
                detalle: Some(db_err.message().to_string()),
            };
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ReferenciaInvalida(mensaje_fk.to_string());
        }
    }
    AppError::BaseDatos(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_de(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn taxonomia_de_status() {
        assert_eq!(
            status_de(AppError::Datos("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_de(AppError::EstadoInvalido("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_de(AppError::ReferenciaInvalida("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_de(AppError::TokenInvalido), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_de(AppError::Autorizacion("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_de(AppError::NoEncontrado("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_de(AppError::conflicto("x")), StatusCode::CONFLICT);
        assert_eq!(
            status_de(AppError::BaseDatos(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
