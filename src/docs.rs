// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::registrar,
        handlers::auth::login,
        handlers::auth::refresh,

        // --- Usuarios ---
        handlers::usuarios::mi_perfil,
        handlers::usuarios::actualizar_mi_perfil,
        handlers::usuarios::cambiar_mi_contrasena,
        handlers::usuarios::listar,
        handlers::usuarios::actualizar_admin,
        handlers::usuarios::eliminar,
        handlers::usuarios::cambiar_password,
        handlers::usuarios::resetear_contrasena,

        // --- Fincas ---
        handlers::fincas::listar,
        handlers::fincas::obtener,
        handlers::fincas::crear,
        handlers::fincas::actualizar,
        handlers::fincas::eliminar,

        // --- Miembros ---
        handlers::fincas::listar_miembros,
        handlers::fincas::asignar_miembro,
        handlers::fincas::quitar_miembro,

        // --- Reportes ---
        handlers::fincas::reporte_inventario,
        handlers::fincas::reporte_sanitario,

        // --- Semovientes ---
        handlers::semovientes::listar,
        handlers::semovientes::crear,
        handlers::semovientes::obtener,
        handlers::semovientes::actualizar,
        handlers::semovientes::eliminar,
        handlers::semovientes::cambiar_estado,
        handlers::semovientes::ficha_completa,

        // --- Registros médicos ---
        handlers::semovientes::listar_registros,
        handlers::semovientes::crear_registro,
        handlers::semovientes::actualizar_registro,
        handlers::semovientes::eliminar_registro,

        // --- Movimientos ---
        handlers::movimientos::crear,
        handlers::movimientos::listar,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RolGlobal,
            models::auth::Usuario,
            models::auth::AsignacionPayload,
            models::auth::RegistroPayload,
            models::auth::LoginPayload,
            models::auth::RefreshPayload,
            models::auth::ParTokens,
            models::auth::ActualizarPerfilPayload,
            models::auth::ActualizarUsuarioAdminPayload,
            models::auth::CambiarContrasenaPayload,
            models::auth::CambiarPasswordPayload,
            models::auth::ResetPasswordPayload,

            // --- Fincas ---
            models::finca::Finca,
            models::finca::RolFinca,
            models::finca::MembresiaFinca,
            models::finca::MiembroFinca,
            models::finca::FincaConRol,
            models::finca::CrearFincaPayload,
            models::finca::ActualizarFincaPayload,
            models::finca::MiembroPayload,

            // --- Semovientes ---
            models::semoviente::Sexo,
            models::semoviente::EstadoSemoviente,
            models::semoviente::TipoIngreso,
            models::semoviente::Semoviente,
            models::semoviente::CrearSemovientePayload,
            models::semoviente::ActualizarSemovientePayload,
            models::semoviente::CambiarEstadoPayload,

            // --- Registros médicos ---
            models::registro_medico::RegistroMedico,
            models::registro_medico::CrearRegistroMedicoPayload,
            models::registro_medico::ActualizarRegistroMedicoPayload,

            // --- Movimientos ---
            models::movimiento::TipoMovimiento,
            models::movimiento::Movimiento,
            models::movimiento::TipoMovimientoSolicitado,
            models::movimiento::CrearMovimientoPayload,

            // --- Reportes ---
            models::reportes::ConteoPorClave,
            models::reportes::ReporteInventario,
            models::reportes::EventoProximo,
            models::reportes::ReporteSanitario,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Usuarios", description = "Perfil y administración de usuarios"),
        (name = "Fincas", description = "Gestión de fincas"),
        (name = "Miembros", description = "Roles por finca"),
        (name = "Reportes", description = "Inventario y calendario sanitario"),
        (name = "Semovientes", description = "Gestión de semovientes y su ciclo de vida"),
        (name = "Registros Médicos", description = "Historial sanitario por semoviente"),
        (name = "Movimientos", description = "Libro de movimientos (auditoría)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
