pub mod auth;
pub mod finca;
pub mod movimiento;
pub mod registro_medico;
pub mod reportes;
pub mod semoviente;
