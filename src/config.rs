// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        FincaRepository, MembresiaRepository, MovimientoRepository,
        RegistroMedicoRepository, ReportesRepository, SemovienteRepository,
        UsuarioRepository,
    },
    services::{
        auth::AuthService, finca_service::FincaService,
        membresia_service::MembresiaService, reportes_service::ReportesService,
        semoviente_service::SemovienteService, usuario_service::UsuarioService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub usuario_service: UsuarioService,
    pub finca_service: FincaService,
    pub membresia_service: MembresiaService,
    pub semoviente_service: SemovienteService,
    pub reportes_service: ReportesService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL debe ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET debe ser definido")?;
        let refresh_secret =
            env::var("REFRESH_SECRET").context("REFRESH_SECRET debe ser definido")?;

        // Pool acotada com timeout de aquisição; as conexões voltam à pool
        // por escopo em todos os caminhos, inclusive os de erro.
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        // --- Monta o gráfico de dependências ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let finca_repo = FincaRepository::new(db_pool.clone());
        let membresia_repo = MembresiaRepository::new(db_pool.clone());
        let semoviente_repo = SemovienteRepository::new(db_pool.clone());
        let registro_repo = RegistroMedicoRepository::new(db_pool.clone());
        let movimiento_repo = MovimientoRepository::new(db_pool.clone());
        let reportes_repo = ReportesRepository::new(db_pool.clone());

        let membresia_service = MembresiaService::new(
            membresia_repo.clone(),
            finca_repo.clone(),
            db_pool.clone(),
        );
        let auth_service = AuthService::new(
            usuario_repo.clone(),
            membresia_repo.clone(),
            membresia_service.clone(),
            jwt_secret,
            refresh_secret,
            db_pool.clone(),
        );
        let usuario_service = UsuarioService::new(
            usuario_repo.clone(),
            membresia_repo.clone(),
            finca_repo.clone(),
        );
        let finca_service = FincaService::new(
            finca_repo.clone(),
            membresia_repo.clone(),
            db_pool.clone(),
        );
        let semoviente_service = SemovienteService::new(
            semoviente_repo,
            registro_repo,
            movimiento_repo,
            finca_repo.clone(),
            membresia_repo.clone(),
            db_pool.clone(),
        );
        let reportes_service = ReportesService::new(
            reportes_repo,
            finca_repo,
            membresia_repo,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            usuario_service,
            finca_service,
            membresia_service,
            semoviente_service,
            reportes_service,
        })
    }
}
