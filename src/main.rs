// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve
    // iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas");

    // Rotas de autenticação (públicas; o registro aceita token opcional)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::registrar))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    let usuario_routes = Router::new()
        .route(
            "/me",
            get(handlers::usuarios::mi_perfil).patch(handlers::usuarios::actualizar_mi_perfil),
        )
        .route("/me/password", patch(handlers::usuarios::cambiar_mi_contrasena))
        .route("/", get(handlers::usuarios::listar))
        .route(
            "/{id}",
            patch(handlers::usuarios::actualizar_admin).delete(handlers::usuarios::eliminar),
        )
        .route("/{id}/password", patch(handlers::usuarios::cambiar_password))
        .route(
            "/{id}/password/reset",
            patch(handlers::usuarios::resetear_contrasena),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let finca_routes = Router::new()
        .route(
            "/",
            get(handlers::fincas::listar).post(handlers::fincas::crear),
        )
        .route(
            "/{id}",
            get(handlers::fincas::obtener)
                .patch(handlers::fincas::actualizar)
                .delete(handlers::fincas::eliminar),
        )
        .route(
            "/{id}/miembros",
            get(handlers::fincas::listar_miembros).post(handlers::fincas::asignar_miembro),
        )
        .route(
            "/{id}/miembros/{id_usuario}",
            delete(handlers::fincas::quitar_miembro),
        )
        .route(
            "/{id}/reportes/inventario",
            get(handlers::fincas::reporte_inventario),
        )
        .route(
            "/{id}/reportes/sanitario",
            get(handlers::fincas::reporte_sanitario),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let semoviente_routes = Router::new()
        .route(
            "/",
            get(handlers::semovientes::listar).post(handlers::semovientes::crear),
        )
        .route(
            "/{id}",
            get(handlers::semovientes::obtener)
                .patch(handlers::semovientes::actualizar)
                .delete(handlers::semovientes::eliminar),
        )
        .route("/{id}/estado", patch(handlers::semovientes::cambiar_estado))
        .route(
            "/{id}/ficha-completa",
            get(handlers::semovientes::ficha_completa),
        )
        .route(
            "/{id}/eventos",
            get(handlers::semovientes::listar_registros)
                .post(handlers::semovientes::crear_registro),
        )
        .route(
            "/{id}/eventos/{id_registro}",
            patch(handlers::semovientes::actualizar_registro)
                .delete(handlers::semovientes::eliminar_registro),
        )
        .route(
            "/{id}/movimientos",
            get(handlers::movimientos::listar).post(handlers::movimientos::crear),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/salud", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/fincas", finca_routes)
        .nest("/api/semovientes", semoviente_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
