// src/db/registro_medico_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::registro_medico::{CrearRegistroMedicoPayload, RegistroMedico},
};

#[derive(Clone)]
pub struct RegistroMedicoRepository {
    pool: PgPool,
}

impl RegistroMedicoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn listar_por_semoviente(
        &self,
        id_semoviente: Uuid,
    ) -> Result<Vec<RegistroMedico>, AppError> {
        sqlx::query_as::<_, RegistroMedico>(
            "SELECT * FROM registros_medicos
              WHERE id_semoviente = $1
              ORDER BY fecha_consulta DESC, created_at DESC",
        )
        .bind(id_semoviente)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    // Sempre acotado ao semovente dono: um registro de outro animal é 404.
    pub async fn find_por_id(
        &self,
        id_semoviente: Uuid,
        id_registro: Uuid,
    ) -> Result<Option<RegistroMedico>, AppError> {
        sqlx::query_as::<_, RegistroMedico>(
            "SELECT * FROM registros_medicos
              WHERE id_semoviente = $1 AND id_registro_medico = $2",
        )
        .bind(id_semoviente)
        .bind(id_registro)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn crear(
        &self,
        id_semoviente: Uuid,
        payload: &CrearRegistroMedicoPayload,
    ) -> Result<RegistroMedico, AppError> {
        sqlx::query_as::<_, RegistroMedico>(
            "INSERT INTO registros_medicos
                (id_semoviente, fecha_consulta, tipo_evento_medico, diagnostico,
                 tratamiento_aplicado, veterinario_responsable, costo,
                 observaciones, nombre_vacuna, dosis, proxima_fecha)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(id_semoviente)
        .bind(payload.fecha_consulta)
        .bind(&payload.tipo_evento_medico)
        .bind(&payload.diagnostico)
        .bind(&payload.tratamiento_aplicado)
        .bind(&payload.veterinario_responsable)
        .bind(payload.costo)
        .bind(&payload.observaciones)
        .bind(&payload.nombre_vacuna)
        .bind(&payload.dosis)
        .bind(payload.proxima_fecha)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn actualizar(&self, r: &RegistroMedico) -> Result<RegistroMedico, AppError> {
        sqlx::query_as::<_, RegistroMedico>(
            "UPDATE registros_medicos
                SET fecha_consulta = $3,
                    tipo_evento_medico = $4,
                    diagnostico = $5,
                    tratamiento_aplicado = $6,
                    veterinario_responsable = $7,
                    costo = $8,
                    observaciones = $9,
                    nombre_vacuna = $10,
                    dosis = $11,
                    proxima_fecha = $12,
                    updated_at = now()
              WHERE id_semoviente = $1 AND id_registro_medico = $2
              RETURNING *",
        )
        .bind(r.id_semoviente)
        .bind(r.id_registro_medico)
        .bind(r.fecha_consulta)
        .bind(&r.tipo_evento_medico)
        .bind(&r.diagnostico)
        .bind(&r.tratamiento_aplicado)
        .bind(&r.veterinario_responsable)
        .bind(r.costo)
        .bind(&r.observaciones)
        .bind(&r.nombre_vacuna)
        .bind(&r.dosis)
        .bind(r.proxima_fecha)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn eliminar(
        &self,
        id_semoviente: Uuid,
        id_registro: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM registros_medicos
              WHERE id_semoviente = $1 AND id_registro_medico = $2",
        )
        .bind(id_semoviente)
        .bind(id_registro)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
