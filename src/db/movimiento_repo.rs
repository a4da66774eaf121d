// src/db/movimiento_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::movimiento::{Movimiento, TipoMovimiento},
};

// Repositório do livro de movimentos. Só existem INSERT e SELECT aqui:
// a tabela é a trilha de auditoria e nunca se corrige nem se apaga.
#[derive(Clone)]
pub struct MovimientoRepository {
    pool: PgPool,
}

impl MovimientoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insertar<'e, E>(
        &self,
        executor: E,
        id_semoviente: Uuid,
        tipo: TipoMovimiento,
        fecha: NaiveDate,
        finca_origen_id: Option<Uuid>,
        finca_destino_id: Option<Uuid>,
        valor: Option<Decimal>,
        observaciones: Option<&str>,
    ) -> Result<Movimiento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Movimiento>(
            "INSERT INTO movimientos_semovientes
                (id_semoviente, tipo_movimiento, fecha_movimiento,
                 finca_origen_id, finca_destino_id, valor, observaciones)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(id_semoviente)
        .bind(tipo)
        .bind(fecha)
        .bind(finca_origen_id)
        .bind(finca_destino_id)
        .bind(valor)
        .bind(observaciones)
        .fetch_one(executor)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn listar_por_semoviente(
        &self,
        id_semoviente: Uuid,
    ) -> Result<Vec<Movimiento>, AppError> {
        sqlx::query_as::<_, Movimiento>(
            "SELECT * FROM movimientos_semovientes
              WHERE id_semoviente = $1
              ORDER BY fecha_movimiento DESC, created_at DESC",
        )
        .bind(id_semoviente)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    // O usuário é membro de alguma finca relacionada com o histórico do
    // animal (atual, origem ou destino de algum movimento)?
    pub async fn es_miembro_de_finca_relacionada(
        &self,
        id_usuario: Uuid,
        id_semoviente: Uuid,
    ) -> Result<bool, AppError> {
        let fila: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1
                  FROM usuario_finca_roles ufr
                 WHERE ufr.id_usuario = $1
                   AND ufr.id_finca IN (
                        (SELECT id_finca FROM semovientes WHERE id_semoviente = $2)
                        UNION
                        (SELECT finca_origen_id FROM movimientos_semovientes
                          WHERE id_semoviente = $2 AND finca_origen_id IS NOT NULL)
                        UNION
                        (SELECT finca_destino_id FROM movimientos_semovientes
                          WHERE id_semoviente = $2 AND finca_destino_id IS NOT NULL)
                   )
            )",
        )
        .bind(id_usuario)
        .bind(id_semoviente)
        .fetch_one(&self.pool)
        .await?;
        Ok(fila.0)
    }
}
