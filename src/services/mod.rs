pub mod auth;
pub mod autorizacion;
pub mod finca_service;
pub mod membresia_service;
pub mod reportes_service;
pub mod semoviente_service;
pub mod usuario_service;
