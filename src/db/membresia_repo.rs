// src/db/membresia_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finca::{MembresiaFinca, MiembroFinca, RolFinca},
};

// Repositório da relação usuario <-> finca (um rol por par).
#[derive(Clone)]
pub struct MembresiaRepository {
    pool: PgPool,
}

impl MembresiaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Todas as membresías de um usuário; é com isso que se monta o Actor
    // do avaliador de autorização.
    pub async fn roles_de_usuario(
        &self,
        id_usuario: Uuid,
    ) -> Result<Vec<MembresiaFinca>, AppError> {
        sqlx::query_as::<_, MembresiaFinca>(
            "SELECT * FROM usuario_finca_roles WHERE id_usuario = $1",
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn listar_miembros(&self, id_finca: Uuid) -> Result<Vec<MiembroFinca>, AppError> {
        sqlx::query_as::<_, MiembroFinca>(
            "SELECT u.id_usuario,
                    u.nombre_usuario,
                    u.nombre_completo,
                    u.correo_electronico,
                    u.rol AS rol_global,
                    ufr.rol AS rol_finca
               FROM usuario_finca_roles ufr
               JOIN usuarios u ON u.id_usuario = ufr.id_usuario
              WHERE ufr.id_finca = $1
              ORDER BY u.nombre_usuario",
        )
        .bind(id_finca)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    // Rol atual do par (se existir), lido direto da pool.
    pub async fn rol_de(
        &self,
        id_usuario: Uuid,
        id_finca: Uuid,
    ) -> Result<Option<RolFinca>, AppError> {
        self.obtener_rol(&self.pool, id_usuario, id_finca).await
    }

    // Lê o rol atual do par (se existir); dentro da transação de upsert
    // serve para decidir a limpeza do administrador_id.
    pub async fn obtener_rol<'e, E>(
        &self,
        executor: E,
        id_usuario: Uuid,
        id_finca: Uuid,
    ) -> Result<Option<RolFinca>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fila: Option<(RolFinca,)> = sqlx::query_as(
            "SELECT rol FROM usuario_finca_roles
              WHERE id_usuario = $1 AND id_finca = $2
              LIMIT 1",
        )
        .bind(id_usuario)
        .bind(id_finca)
        .fetch_optional(executor)
        .await?;
        Ok(fila.map(|(rol,)| rol))
    }

    // UPSERT: um único rol por (usuario, finca); o conflito troca o valor.
    pub async fn upsert_rol<'e, E>(
        &self,
        executor: E,
        id_usuario: Uuid,
        id_finca: Uuid,
        rol: RolFinca,
    ) -> Result<MembresiaFinca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MembresiaFinca>(
            "INSERT INTO usuario_finca_roles (id_usuario, id_finca, rol)
             VALUES ($1, $2, $3)
             ON CONFLICT (id_usuario, id_finca)
             DO UPDATE SET rol = EXCLUDED.rol
             RETURNING *",
        )
        .bind(id_usuario)
        .bind(id_finca)
        .bind(rol)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ReferenciaInvalida(
                        "Usuario o finca inexistente".to_string(),
                    );
                }
                if db_err.is_unique_violation() {
                    return AppError::conflicto("Conflicto por restricción de unicidad");
                }
            }
            AppError::BaseDatos(e)
        })
    }

    // Remove a atribuição apenas quando o rol guardado coincide exatamente.
    pub async fn eliminar_rol<'e, E>(
        &self,
        executor: E,
        id_usuario: Uuid,
        id_finca: Uuid,
        rol: RolFinca,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM usuario_finca_roles
              WHERE id_usuario = $1 AND id_finca = $2 AND rol = $3",
        )
        .bind(id_usuario)
        .bind(id_finca)
        .bind(rol)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // O actor compartilha alguma finca onde ele é AdminFinca com o alvo?
    // (regra de eliminação de usuários para não-SuperAdmin)
    pub async fn comparte_finca_administrada(
        &self,
        id_admin: Uuid,
        id_objetivo: Uuid,
    ) -> Result<bool, AppError> {
        let fila: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1
                  FROM usuario_finca_roles u1
                  JOIN usuario_finca_roles u2 ON u1.id_finca = u2.id_finca
                 WHERE u1.id_usuario = $1 AND u1.rol = 'AdminFinca'
                   AND u2.id_usuario = $2
            )",
        )
        .bind(id_admin)
        .bind(id_objetivo)
        .fetch_one(&self.pool)
        .await?;
        Ok(fila.0)
    }
}
