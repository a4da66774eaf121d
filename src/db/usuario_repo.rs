// src/db/usuario_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_error_sqlx, AppError},
    models::auth::{RolGlobal, Usuario},
};

// O repositório de usuários, responsável por todas as interações com a
// tabela 'usuarios'.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_por_id(&self, id_usuario: Uuid) -> Result<Option<Usuario>, AppError> {
        sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id_usuario = $1")
            .bind(id_usuario)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    // Busca por nombre_usuario OU correo (o campo único do login)
    pub async fn find_por_login(&self, usuario: &str) -> Result<Option<Usuario>, AppError> {
        sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios
              WHERE nombre_usuario = $1 OR correo_electronico = $1
              LIMIT 1",
        )
        .bind(usuario)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::BaseDatos)
    }

    pub async fn listar(&self) -> Result<Vec<Usuario>, AppError> {
        sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios ORDER BY nombre_usuario ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::BaseDatos)
    }

    // Cria um novo usuário; aceita um executor para participar da
    // transação de registro.
    pub async fn crear<'e, E>(
        &self,
        executor: E,
        nombre_usuario: &str,
        correo_electronico: &str,
        contrasena_hash: &str,
        rol: RolGlobal,
        nombre_completo: &str,
    ) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            "INSERT INTO usuarios
                (nombre_usuario, correo_electronico, contrasena, rol, nombre_completo)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(nombre_usuario)
        .bind(correo_electronico)
        .bind(contrasena_hash)
        .bind(rol)
        .bind(nombre_completo)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                "Usuario o correo ya registrado",
                "Referencia inválida al crear usuario",
            )
        })
    }

    // Atualiza a linha inteira já com o parche aplicado (allow-list fixa)
    pub async fn actualizar_datos(&self, usuario: &Usuario) -> Result<Usuario, AppError> {
        sqlx::query_as::<_, Usuario>(
            "UPDATE usuarios
                SET nombre_usuario = $2,
                    correo_electronico = $3,
                    nombre_completo = $4,
                    rol = $5,
                    updated_at = now()
              WHERE id_usuario = $1
              RETURNING *",
        )
        .bind(usuario.id_usuario)
        .bind(&usuario.nombre_usuario)
        .bind(&usuario.correo_electronico)
        .bind(&usuario.nombre_completo)
        .bind(usuario.rol)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            mapear_error_sqlx(
                e,
                "Ya existe un registro con ese nombre_usuario o correo_electronico",
                "Referencia inválida al actualizar usuario",
            )
        })
    }

    pub async fn actualizar_contrasena(
        &self,
        id_usuario: Uuid,
        contrasena_hash: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE usuarios SET contrasena = $2, updated_at = now() WHERE id_usuario = $1",
        )
        .bind(id_usuario)
        .bind(contrasena_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn eliminar(&self, id_usuario: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id_usuario)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflicto {
                            mensaje: "No se puede eliminar: tiene datos relacionados"
                                .to_string(),
                            detalle: Some(db_err.message().to_string()),
                        };
                    }
                }
                AppError::BaseDatos(e)
            })?;
        Ok(result.rows_affected())
    }
}
