// src/middleware/finca.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do cabeçalho HTTP alternativo ao parâmetro de query
const FINCA_ID_HEADER: &str = "x-finca-id";

// Extrator do contexto de finca para as rotas que não levam a finca no
// caminho (o listado de semovientes): aceita ?id_finca=<uuid> ou o
// cabeçalho X-Finca-Id.
#[derive(Debug, Clone)]
pub struct FincaContext(pub Uuid);

impl<S> FromRequestParts<S> for FincaContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) ?id_finca=... na query
        let de_query = parts.uri.query().and_then(|q| {
            q.split('&')
                .find_map(|par| par.strip_prefix("id_finca="))
                .map(str::to_string)
        });

        // 2) Cabeçalho X-Finca-Id
        let de_header = parts
            .headers
            .get(FINCA_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let crudo = de_query.or(de_header).ok_or_else(|| {
            AppError::Datos(
                "Debe indicar id_finca (query o cabecera X-Finca-Id)".to_string(),
            )
        })?;

        let id_finca = Uuid::parse_str(&crudo).map_err(|_| {
            AppError::Datos("id_finca inválido (no es un UUID)".to_string())
        })?;

        Ok(FincaContext(id_finca))
    }
}
