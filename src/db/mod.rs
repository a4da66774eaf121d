pub mod finca_repo;
pub use finca_repo::FincaRepository;
pub mod membresia_repo;
pub use membresia_repo::MembresiaRepository;
pub mod movimiento_repo;
pub use movimiento_repo::MovimientoRepository;
pub mod registro_medico_repo;
pub use registro_medico_repo::RegistroMedicoRepository;
pub mod reportes_repo;
pub use reportes_repo::ReportesRepository;
pub mod semoviente_repo;
pub use semoviente_repo::SemovienteRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
