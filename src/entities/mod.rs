//! Entities module - Entidades del dominio
//!
//! Cada entidad corresponde a una tabla de `migrations/`.

pub mod actividad;
pub mod agenda;
pub mod chat;
pub mod enums;
pub mod foro;
pub mod nota;
pub mod notificacion;
pub mod test;
pub mod token;
pub mod usuarios;

// Re-exports para facilitar el import
pub use actividad::{Actividad, ActividadAsignada, Evidencia, Modulo};
pub use agenda::{Agenda, Cita};
pub use chat::{Chat, ChatSoporte, Mensaje};
pub use enums::{
    AccionModeracion, EstadoAplicacion, EstadoAsignacion, EstadoCita, Modalidad, PropositoToken,
    RolForo, TipoNotificacion, TipoUsuario,
};
pub use foro::{Foro, ForoBaneo, ForoParticipante, MensajeForo, ModeracionLog, Tema};
pub use nota::Nota;
pub use notificacion::Notificacion;
pub use test::{AplicacionTest, PreguntaTest, ResultadoTest, Test};
pub use token::TokenCuenta;
pub use usuarios::{Admin, Paciente, Psicologo, hash_password, verificar_password};
