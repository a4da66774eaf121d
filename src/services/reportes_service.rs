// src/services/reportes_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FincaRepository, MembresiaRepository, ReportesRepository},
    models::{
        auth::Claims,
        reportes::{ReporteInventario, ReporteSanitario},
    },
    services::autorizacion::{self, Actor, Operacion},
};

pub const HORIZONTE_DEFECTO: i64 = 30;
pub const HORIZONTE_MAXIMO: i64 = 1825;

// Valida o horizonte do relatório sanitário: [1, 1825] dias, 30 por
// defecto.
pub fn validar_horizonte(dias: Option<i64>) -> Result<i32, AppError> {
    let dias = dias.unwrap_or(HORIZONTE_DEFECTO);
    if !(1..=HORIZONTE_MAXIMO).contains(&dias) {
        return Err(AppError::Datos(format!(
            "El parámetro 'dias' debe estar entre 1 y {HORIZONTE_MAXIMO}"
        )));
    }
    Ok(dias as i32)
}

#[derive(Clone)]
pub struct ReportesService {
    reportes_repo: ReportesRepository,
    finca_repo: FincaRepository,
    membresia_repo: MembresiaRepository,
    pool: PgPool,
}

impl ReportesService {
    pub fn new(
        reportes_repo: ReportesRepository,
        finca_repo: FincaRepository,
        membresia_repo: MembresiaRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            reportes_repo,
            finca_repo,
            membresia_repo,
            pool,
        }
    }

    pub async fn inventario(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        incluir_inactivos: bool,
    ) -> Result<ReporteInventario, AppError> {
        self.exigir_lectura(claims, id_finca).await?;
        self.reportes_repo
            .inventario(&self.pool, id_finca, incluir_inactivos)
            .await
    }

    pub async fn sanitario(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        dias: Option<i64>,
    ) -> Result<ReporteSanitario, AppError> {
        let horizonte = validar_horizonte(dias)?;
        self.exigir_lectura(claims, id_finca).await?;

        let eventos = self
            .reportes_repo
            .eventos_proximos(id_finca, horizonte)
            .await?;

        Ok(ReporteSanitario {
            dias: horizonte as i64,
            total: eventos.len() as i64,
            eventos,
        })
    }

    async fn exigir_lectura(&self, claims: &Claims, id_finca: Uuid) -> Result<(), AppError> {
        if !self.finca_repo.existe(id_finca).await? {
            return Err(AppError::NoEncontrado("Finca no encontrada".to_string()));
        }

        let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
        let actor = Actor::desde_claims(claims, membresias);
        autorizacion::exigir(
            &actor,
            &Operacion::LeerFinca(id_finca),
            "Sin acceso a esta finca",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizonte_por_defecto_es_30() {
        assert_eq!(validar_horizonte(None).unwrap(), 30);
    }

    #[test]
    fn horizonte_acepta_los_bordes() {
        assert_eq!(validar_horizonte(Some(1)).unwrap(), 1);
        assert_eq!(validar_horizonte(Some(1825)).unwrap(), 1825);
    }

    #[test]
    fn horizonte_rechaza_fuera_de_rango() {
        assert!(matches!(validar_horizonte(Some(0)), Err(AppError::Datos(_))));
        assert!(matches!(validar_horizonte(Some(1826)), Err(AppError::Datos(_))));
        // Cenário do spec: dias=2000 excede o teto
        assert!(matches!(validar_horizonte(Some(2000)), Err(AppError::Datos(_))));
        assert!(matches!(validar_horizonte(Some(-5)), Err(AppError::Datos(_))));
    }
}
