// src/db/semoviente_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_error_sqlx, AppError},
    models::semoviente::{CrearSemovientePayload, EstadoSemoviente, Semoviente},
};

const MENSAJE_MARCA_DUPLICADA: &str = "Nro. de marca o registro duplicado";

#[derive(Clone)]
pub struct SemovienteRepository {
    pool: PgPool,
}

impl SemovienteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn listar_por_finca(
        &self,
        id_finca: Uuid,
        incluir_inactivos: bool,
    ) -> Result<Vec<Semoviente>, AppError> {
        // Filtro fixo, escolhido pela flag; por defecto solo 'Activo'
        let filtro_estado = if incluir_inactivos {
            ""
        } else {
            "AND estado = 'Activo'"
        };
        let sql = format!(
            "SELECT * FROM semovientes
              WHERE id_finca = $1 {filtro_estado}
              ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Semoviente>(&sql)
            .bind(id_finca)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    pub async fn find_por_id(&self, id_semoviente: Uuid) -> Result<Option<Semoviente>, AppError> {
        sqlx::query_as::<_, Semoviente>("SELECT * FROM semovientes WHERE id_semoviente = $1")
            .bind(id_semoviente)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    // Trava a linha dentro da transação: é o ponto de serialização das
    // transições concorrentes sobre o mesmo animal.
    pub async fn find_por_id_para_update<'e, E>(
        &self,
        executor: E,
        id_semoviente: Uuid,
    ) -> Result<Option<Semoviente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Semoviente>(
            "SELECT * FROM semovientes WHERE id_semoviente = $1 FOR UPDATE",
        )
        .bind(id_semoviente)
        .fetch_optional(executor)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn crear<'e, E>(
        &self,
        executor: E,
        payload: &CrearSemovientePayload,
    ) -> Result<Semoviente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Semoviente>(
            "INSERT INTO semovientes
                (nro_marca, nro_registro, nombre, fecha_nacimiento, sexo,
                 id_raza, id_especie, id_madre, id_padre, id_finca,
                 estado, tipo_ingreso, fecha_ingreso, valor_compra)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     'Activo', $11, $12, $13)
             RETURNING *",
        )
        .bind(&payload.nro_marca)
        .bind(&payload.nro_registro)
        .bind(&payload.nombre)
        .bind(payload.fecha_nacimiento)
        .bind(payload.sexo)
        .bind(payload.id_raza)
        .bind(payload.id_especie)
        .bind(payload.id_madre)
        .bind(payload.id_padre)
        .bind(payload.id_finca)
        .bind(payload.tipo_ingreso)
        .bind(payload.fecha_ingreso_efectiva())
        .bind(payload.valor_compra)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                MENSAJE_MARCA_DUPLICADA,
                "Raza, especie, madre, padre o finca inexistente",
            )
        })
    }

    // Persiste a linha inteira já com o parche aplicado
    pub async fn actualizar(&self, s: &Semoviente) -> Result<Semoviente, AppError> {
        sqlx::query_as::<_, Semoviente>(
            "UPDATE semovientes
                SET nro_marca = $2,
                    nro_registro = $3,
                    nombre = $4,
                    fecha_nacimiento = $5,
                    sexo = $6,
                    id_raza = $7,
                    id_especie = $8,
                    id_madre = $9,
                    id_padre = $10,
                    peso_actual = $11,
                    fecha_peso = $12,
                    fecha_ingreso = $13,
                    nro_chip = $14,
                    nro_sanitario = $15,
                    updated_at = now()
              WHERE id_semoviente = $1
              RETURNING *",
        )
        .bind(s.id_semoviente)
        .bind(&s.nro_marca)
        .bind(&s.nro_registro)
        .bind(&s.nombre)
        .bind(s.fecha_nacimiento)
        .bind(s.sexo)
        .bind(s.id_raza)
        .bind(s.id_especie)
        .bind(s.id_madre)
        .bind(s.id_padre)
        .bind(s.peso_actual)
        .bind(s.fecha_peso)
        .bind(s.fecha_ingreso)
        .bind(&s.nro_chip)
        .bind(&s.nro_sanitario)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                MENSAJE_MARCA_DUPLICADA,
                "Raza, especie, madre, padre o finca inexistente",
            )
        })
    }

    pub async fn eliminar(&self, id_semoviente: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM semovientes WHERE id_semoviente = $1")
            .bind(id_semoviente)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflicto {
                            mensaje: "No se puede eliminar: existen datos relacionados \
                                      (movimientos, registros médicos o descendencia)"
                                .to_string(),
                            detalle: Some(db_err.message().to_string()),
                        };
                    }
                }
                AppError::BaseDatos(e)
            })?;
        Ok(result.rows_affected())
    }

    // Traslado: muda a finca e o estado numa só sentença (dentro da tx)
    pub async fn trasladar<'e, E>(
        &self,
        executor: E,
        id_semoviente: Uuid,
        destino_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE semovientes
                SET id_finca = $2, estado = 'Traslado', updated_at = now()
              WHERE id_semoviente = $1",
        )
        .bind(id_semoviente)
        .bind(destino_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Venta/Muerte: estado terminal + campos de baja (dentro da tx)
    pub async fn dar_de_baja<'e, E>(
        &self,
        executor: E,
        id_semoviente: Uuid,
        estado: EstadoSemoviente,
        motivo: &str,
        observaciones: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE semovientes
                SET estado = $2,
                    fecha_salida = CURRENT_DATE,
                    fecha_baja = CURRENT_DATE,
                    motivo_baja = $3,
                    observaciones_baja = $4,
                    updated_at = now()
              WHERE id_semoviente = $1",
        )
        .bind(id_semoviente)
        .bind(estado)
        .bind(motivo)
        .bind(observaciones)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Override manual de estado: voltar a 'Activo' limpa os campos de baja,
    // qualquer outro estado os preenche com COALESCE.
    pub async fn aplicar_estado_manual(
        &self,
        id_semoviente: Uuid,
        estado: EstadoSemoviente,
        fecha: Option<chrono::NaiveDate>,
        motivo: Option<&str>,
        observaciones: Option<&str>,
    ) -> Result<Semoviente, AppError> {
        let sql = if estado.es_activo() {
            "UPDATE semovientes
                SET estado = $2,
                    fecha_baja = NULL,
                    motivo_baja = NULL,
                    observaciones_baja = NULL,
                    updated_at = now()
              WHERE id_semoviente = $1
              RETURNING *"
        } else {
            "UPDATE semovientes
                SET estado = $2,
                    fecha_baja = COALESCE($3, fecha_baja),
                    motivo_baja = COALESCE($4, motivo_baja),
                    observaciones_baja = COALESCE($5, observaciones_baja),
                    updated_at = now()
              WHERE id_semoviente = $1
              RETURNING *"
        };

        let mut query = sqlx::query_as::<_, Semoviente>(sql)
            .bind(id_semoviente)
            .bind(estado);
        if !estado.es_activo() {
            query = query.bind(fecha).bind(motivo).bind(observaciones);
        }
        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Semoviente no encontrado".to_string()))
    }

    pub async fn raza_pertenece_a_especie(
        &self,
        id_raza: Uuid,
        id_especie: Uuid,
    ) -> Result<bool, AppError> {
        let fila: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM razas WHERE id_raza = $1 AND id_especie = $2
            )",
        )
        .bind(id_raza)
        .bind(id_especie)
        .fetch_one(&self.pool)
        .await?;
        Ok(fila.0)
    }
}
