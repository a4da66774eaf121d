// src/db/reportes_repo.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reportes::{ConteoPorClave, EventoProximo, ReporteInventario},
};

#[derive(Clone)]
pub struct ReportesRepository {
    pool: PgPool,
}

impl ReportesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Desglose do inventário numa transação: as quatro contagens saem do
    // mesmo snapshot.
    pub async fn inventario<'e, E>(
        &self,
        executor: E,
        id_finca: Uuid,
        incluir_inactivos: bool,
    ) -> Result<ReporteInventario, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let filtro_estado = if incluir_inactivos {
            ""
        } else {
            "AND estado = 'Activo'"
        };

        let sql_total = format!(
            "SELECT COUNT(*) FROM semovientes WHERE id_finca = $1 {filtro_estado}"
        );
        let (total,): (i64,) = sqlx::query_as(&sql_total)
            .bind(id_finca)
            .fetch_one(&mut *tx)
            .await?;

        let sql_estado = format!(
            "SELECT estado::text AS clave, COUNT(*) AS total
               FROM semovientes
              WHERE id_finca = $1 {filtro_estado}
              GROUP BY estado
              ORDER BY total DESC, clave"
        );
        let por_estado = sqlx::query_as::<_, ConteoPorClave>(&sql_estado)
            .bind(id_finca)
            .fetch_all(&mut *tx)
            .await?;

        let sql_especie = format!(
            "SELECT e.nombre_especie AS clave, COUNT(*) AS total
               FROM semovientes s
               JOIN especies e ON e.id_especie = s.id_especie
              WHERE s.id_finca = $1 {filtro_estado}
              GROUP BY e.nombre_especie
              ORDER BY total DESC, clave"
        );
        let por_especie = sqlx::query_as::<_, ConteoPorClave>(&sql_especie)
            .bind(id_finca)
            .fetch_all(&mut *tx)
            .await?;

        let sql_sexo = format!(
            "SELECT sexo::text AS clave, COUNT(*) AS total
               FROM semovientes
              WHERE id_finca = $1 {filtro_estado}
              GROUP BY sexo
              ORDER BY total DESC, clave"
        );
        let por_sexo = sqlx::query_as::<_, ConteoPorClave>(&sql_sexo)
            .bind(id_finca)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReporteInventario {
            total,
            por_estado,
            por_especie,
            por_sexo,
        })
    }

    // Eventos médicos com vencimento em [hoy, hoy + dias], mais próximos
    // primeiro.
    pub async fn eventos_proximos(
        &self,
        id_finca: Uuid,
        dias: i32,
    ) -> Result<Vec<EventoProximo>, AppError> {
        sqlx::query_as::<_, EventoProximo>(
            "SELECT r.id_registro_medico,
                    r.id_semoviente,
                    s.nro_marca,
                    s.nombre AS nombre_semoviente,
                    r.tipo_evento_medico,
                    r.nombre_vacuna,
                    r.proxima_fecha,
                    r.veterinario_responsable
               FROM registros_medicos r
               JOIN semovientes s ON s.id_semoviente = r.id_semoviente
              WHERE s.id_finca = $1
                AND r.proxima_fecha IS NOT NULL
                AND r.proxima_fecha >= CURRENT_DATE
                AND r.proxima_fecha <= CURRENT_DATE + $2
              ORDER BY r.proxima_fecha ASC",
        )
        .bind(id_finca)
        .bind(dias)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }
}
