//! Repositories module - acceso a datos, un repositorio por tabla
//!
//! Cada repositorio guarda una copia del pool y expone las operaciones
//! genéricas de `traits` más las consultas propias de su tabla.

// ************************* NOTA SOBRE SQLX ************************* //

/*
   Todas las consultas usan la API en tiempo de ejecución:

       sqlx::query_as::<_, Entidad>("SELECT * FROM tabla WHERE id = ?")
           .bind(id)
           .fetch_optional(&self.connection_pool)
           .await

   así el crate compila sin una base de datos levantada. Las entidades
   derivan `sqlx::FromRow` y los enums `sqlx::Type`, guardados como TEXT.

   Qué método usar según las filas esperadas:
   - ninguna (INSERT/UPDATE/DELETE sin RETURNING) -> .execute()
   - cero o una                                   -> .fetch_optional()
   - exactamente una (agregados, RETURNING)       -> .fetch_one()
   - varias                                       -> .fetch_all()

   Las fechas se generan siempre en Rust (`Utc::now()`) y se enlazan como
   parámetro, nunca con CURRENT_TIMESTAMP: así todas comparten formato y
   las comparaciones de texto en SQLite siguen el orden cronológico.
*/

// ************************* MÓDULOS ************************* //

pub mod actividad;
pub mod admin;
pub mod agenda;
pub mod aplicacion;
pub mod asignacion;
pub mod baneo;
mod cascada;
pub mod chat;
pub mod cita;
pub mod evidencia;
pub mod foro;
pub mod mensaje;
pub mod mensaje_foro;
pub mod moderacion;
pub mod modulo;
pub mod nota;
pub mod notificacion;
pub mod paciente;
pub mod participante;
pub mod psicologo;
pub mod reporte;
pub mod soporte;
pub mod tema;
pub mod token;
pub mod traits;

// Re-exports de los traits
pub use traits::{Create, Delete, Read, Update};

// Re-exports de los repositorios
pub use actividad::ActividadRepository;
pub use admin::AdminRepository;
pub use agenda::AgendaRepository;
pub use aplicacion::AplicacionRepository;
pub use asignacion::AsignacionRepository;
pub use baneo::ForoBaneoRepository;
pub use chat::ChatRepository;
pub use cita::CitaRepository;
pub use evidencia::EvidenciaRepository;
pub use foro::ForoRepository;
pub use mensaje::MensajeRepository;
pub use mensaje_foro::MensajeForoRepository;
pub use moderacion::ModeracionLogRepository;
pub use modulo::ModuloRepository;
pub use nota::NotaRepository;
pub use notificacion::NotificacionRepository;
pub use paciente::PacienteRepository;
pub use participante::{ForoParticipanteRepository, ParticipanteId};
pub use psicologo::PsicologoRepository;
pub use reporte::ReporteRepository;
pub use soporte::SoporteRepository;
pub use tema::TemaRepository;
pub use test::TestRepository;
pub use token::TokenRepository;
