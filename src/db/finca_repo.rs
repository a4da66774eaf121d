// src/db/finca_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_error_sqlx, AppError},
    models::finca::{CrearFincaPayload, Finca, FincaConRol},
};

#[derive(Clone)]
pub struct FincaRepository {
    pool: PgPool,
}

impl FincaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn listar_todas(&self) -> Result<Vec<Finca>, AppError> {
        sqlx::query_as::<_, Finca>("SELECT * FROM fincas ORDER BY nombre_finca")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    // Somente as fincas onde o usuário tem algum rol
    pub async fn listar_por_usuario(&self, id_usuario: Uuid) -> Result<Vec<Finca>, AppError> {
        sqlx::query_as::<_, Finca>(
            "SELECT f.*
               FROM fincas f
               JOIN usuario_finca_roles ufr ON ufr.id_finca = f.id_finca
              WHERE ufr.id_usuario = $1
              ORDER BY f.nombre_finca",
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn find_por_id(&self, id_finca: Uuid) -> Result<Option<Finca>, AppError> {
        sqlx::query_as::<_, Finca>("SELECT * FROM fincas WHERE id_finca = $1")
            .bind(id_finca)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    pub async fn existe(&self, id_finca: Uuid) -> Result<bool, AppError> {
        let fila: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM fincas WHERE id_finca = $1)",
        )
        .bind(id_finca)
        .fetch_one(&self.pool)
        .await?;
        Ok(fila.0)
    }

    pub async fn crear<'e, E>(
        &self,
        executor: E,
        payload: &CrearFincaPayload,
    ) -> Result<Finca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Finca>(
            "INSERT INTO fincas
                (nombre_finca, ubicacion, nombre_admin, telefono_admin, administrador_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&payload.nombre_finca)
        .bind(&payload.ubicacion)
        .bind(&payload.nombre_admin)
        .bind(&payload.telefono_admin)
        .bind(payload.administrador_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                "Ya existe una finca con ese nombre u otro dato único",
                "El administrador_id no corresponde a un usuario existente",
            )
        })
    }

    // Atualiza a linha inteira já com o parche aplicado
    pub async fn actualizar(&self, finca: &Finca) -> Result<Finca, AppError> {
        sqlx::query_as::<_, Finca>(
            "UPDATE fincas
                SET nombre_finca = $2,
                    ubicacion = $3,
                    nombre_admin = $4,
                    telefono_admin = $5,
                    administrador_id = $6,
                    updated_at = now()
              WHERE id_finca = $1
              RETURNING *",
        )
        .bind(finca.id_finca)
        .bind(&finca.nombre_finca)
        .bind(&finca.ubicacion)
        .bind(&finca.nombre_admin)
        .bind(&finca.telefono_admin)
        .bind(finca.administrador_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                "Ya existe una finca con ese nombre u otro dato único",
                "El administrador_id no corresponde a un usuario existente",
            )
        })
    }

    pub async fn eliminar(&self, id_finca: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM fincas WHERE id_finca = $1")
            .bind(id_finca)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflicto {
                            mensaje:
                                "No se puede eliminar: existen semovientes u otros datos asociados"
                                    .to_string(),
                            detalle: Some(db_err.message().to_string()),
                        };
                    }
                }
                AppError::BaseDatos(e)
            })?;
        Ok(result.rows_affected())
    }

    // Mantém o cache administrador_id; participa da transação de membresía.
    pub async fn actualizar_administrador<'e, E>(
        &self,
        executor: E,
        id_finca: Uuid,
        administrador_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE fincas SET administrador_id = $2, updated_at = now() WHERE id_finca = $1")
            .bind(id_finca)
            .bind(administrador_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn administrador_actual<'e, E>(
        &self,
        executor: E,
        id_finca: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fila: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT administrador_id FROM fincas WHERE id_finca = $1")
                .bind(id_finca)
                .fetch_optional(executor)
                .await?;
        Ok(fila.and_then(|(admin,)| admin))
    }

    // Fincas do usuário com o rol dele em cada uma (GET /usuarios/me)
    pub async fn fincas_con_rol_de(
        &self,
        id_usuario: Uuid,
    ) -> Result<Vec<FincaConRol>, AppError> {
        sqlx::query_as::<_, FincaConRol>(
            "SELECT f.id_finca, f.nombre_finca, ufr.rol::text AS rol_en_finca
               FROM usuario_finca_roles ufr
               JOIN fincas f ON f.id_finca = ufr.id_finca
              WHERE ufr.id_usuario = $1
              ORDER BY f.nombre_finca",
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    // O SuperAdmin enxerga todas as fincas
    pub async fn todas_como_superadmin(&self) -> Result<Vec<FincaConRol>, AppError> {
        sqlx::query_as::<_, FincaConRol>(
            "SELECT id_finca, nombre_finca, 'SuperAdmin'::text AS rol_en_finca
               FROM fincas
              ORDER BY nombre_finca",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }
}
