// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{MembresiaRepository, UsuarioRepository},
    models::auth::{
        AsignacionPayload, Claims, ParTokens, RegistroPayload, RolGlobal, Usuario,
    },
    services::{
        autorizacion::{self, Actor, Operacion},
        membresia_service::MembresiaService,
    },
};

const ACCESS_MINUTOS: i64 = 15;
const REFRESH_DIAS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    membresia_repo: MembresiaRepository,
    membresia_service: MembresiaService,
    jwt_secret: String,
    refresh_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        usuario_repo: UsuarioRepository,
        membresia_repo: MembresiaRepository,
        membresia_service: MembresiaService,
        jwt_secret: String,
        refresh_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            usuario_repo,
            membresia_repo,
            membresia_service,
            jwt_secret,
            refresh_secret,
            pool,
        }
    }

    // Registro com as regras de rol global e de asignação por finca.
    // O actor é opcional: a rota é pública, mas um token presente habilita
    // as variantes privilegiadas.
    pub async fn registrar(
        &self,
        actor_claims: Option<&Claims>,
        payload: &RegistroPayload,
    ) -> Result<(Usuario, Option<AsignacionPayload>), AppError> {
        // 1) Só um SuperAdmin cria OUTRO SuperAdmin
        if payload.rol_global == RolGlobal::SuperAdmin {
            let es_superadmin = actor_claims
                .map(|c| c.rol == RolGlobal::SuperAdmin)
                .unwrap_or(false);
            if !es_superadmin {
                return Err(AppError::Autorizacion(
                    "Sólo SuperAdmin puede crear SuperAdmin".to_string(),
                ));
            }
        }

        // 2) Asignação a finca: SuperAdmin em qualquer finca; senão, tem
        //    que ser AdminFinca DESSA finca.
        if let Some(asignacion) = &payload.asignacion {
            let claims = actor_claims.ok_or_else(|| {
                AppError::Autenticacion("Token requerido".to_string())
            })?;
            let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
            let actor = Actor::desde_claims(claims, membresias);
            autorizacion::exigir(
                &actor,
                &Operacion::AdministrarFinca(asignacion.id_finca),
                "Sólo AdminFinca de esa finca (o SuperAdmin) puede asignar miembros a la finca",
            )?;
        }

        // 3) Hashing fora da transação (não toca o banco)
        let contrasena = payload.contrasena.clone();
        let contrasena_hash =
            tokio::task::spawn_blocking(move || hash(&contrasena, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 4) Usuário + asignação opcional, atômicos
        let mut tx = self.pool.begin().await?;

        let usuario = self
            .usuario_repo
            .crear(
                &mut *tx,
                &payload.nombre_usuario,
                &payload.correo_electronico,
                &contrasena_hash,
                payload.rol_global,
                &payload.nombre_completo,
            )
            .await?;

        if let Some(asignacion) = &payload.asignacion {
            // Mesmo caminho de upsert do POST /miembros: mantém o cache
            // administrador_id coerente também no registro.
            self.membresia_service
                .asignar_rol_tx(
                    &mut tx,
                    usuario.id_usuario,
                    asignacion.id_finca,
                    asignacion.rol_finca,
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!("👤 Usuario '{}' registrado", usuario.nombre_usuario);
        Ok((usuario, payload.asignacion.clone()))
    }

    pub async fn login(
        &self,
        usuario: &str,
        contrasena: &str,
    ) -> Result<(Usuario, ParTokens), AppError> {
        let fila = self
            .usuario_repo
            .find_por_login(usuario)
            .await?
            .ok_or_else(|| AppError::Autenticacion("Credenciales inválidas".to_string()))?;

        // Verificação bcrypt num thread separado
        let contrasena = contrasena.to_owned();
        let hash_guardado = fila.contrasena.clone();
        let valida = tokio::task::spawn_blocking(move || verify(&contrasena, &hash_guardado))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !valida {
            return Err(AppError::Autenticacion("Credenciales inválidas".to_string()));
        }

        let tokens = self.crear_tokens(&fila)?;
        Ok((fila, tokens))
    }

    // Verifica o refresh token com o SEGREDO DE REFRESH e reemite o par.
    // O rol sai do banco, não do token velho.
    pub async fn refresh(&self, refresh_token: &str) -> Result<ParTokens, AppError> {
        let token_data = decode::<Claims>(
            refresh_token,
            &DecodingKey::from_secret(self.refresh_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::TokenInvalido)?;

        let usuario = self
            .usuario_repo
            .find_por_id(token_data.claims.id_usuario)
            .await?
            .ok_or(AppError::TokenInvalido)?;

        self.crear_tokens(&usuario)
    }

    // Valida o access token (usado pelo auth_guard)
    pub fn validar_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::TokenInvalido)?;
        Ok(token_data.claims)
    }

    pub fn crear_tokens(&self, usuario: &Usuario) -> Result<ParTokens, AppError> {
        let access = self.firmar(usuario, &self.jwt_secret, chrono::Duration::minutes(ACCESS_MINUTOS))?;
        let refresh = self.firmar(usuario, &self.refresh_secret, chrono::Duration::days(REFRESH_DIAS))?;
        Ok(ParTokens {
            access_token: access,
            refresh_token: refresh,
        })
    }

    fn firmar(
        &self,
        usuario: &Usuario,
        secret: &str,
        duracion: chrono::Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            id_usuario: usuario.id_usuario,
            rol: usuario.rol,
            nombre_usuario: usuario.nombre_usuario.clone(),
            exp: (now + duracion).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )?)
    }
}
