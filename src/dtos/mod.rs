//! DTOs module - Data Transfer Objects
//!
//! Cuerpos de petición y respuesta de la API, más los DTOs internos
//! `Create*DTO` que reciben los repositorios.

pub mod agenda;
pub mod auth;
pub mod chat;
pub mod foro;
pub mod nota;
pub mod notificacion;
pub mod query;
pub mod reporte;
pub mod terapia;
pub mod test;
pub mod usuarios;

// Re-exports para facilitar el import
pub use agenda::{
    AgendaDTO, CreateCitaDTO, CreateCitaRequestDTO, UpdateAgendaDTO, UpdateCitaDTO, fecha_en_rango,
};
pub use auth::{
    ActivarCuentaDTO, AvisoDTO, CambiarPasswordDTO, LoginDTO, LoginResponseDTO,
    RecuperarPasswordDTO, RegistroPsicologoDTO, RestablecerPasswordDTO, UsuarioSesionDTO,
    cedula_valida, password_robusta,
};
pub use chat::{
    ChatDTO, ChatSoporteDTO, CreateChatRequestDTO, CreateMensajeDTO, CreateMensajeRequestDTO,
    MarcadosDTO, MensajeDTO,
};
pub use foro::{
    AgregarParticipanteDTO, CambiarRolDTO, CreateBaneoDTO, CreateBaneoRequestDTO, CreateForoDTO,
    CreateForoRequestDTO, CreateMensajeForoDTO, CreateModeracionLogDTO, CreateTemaDTO,
    CreateTemaRequestDTO, ForoDTO, MensajeForoDTO, MensajeForoRequestDTO, UpdateForoDTO,
};
pub use nota::{CreateNotaDTO, CreateNotaRequestDTO, NotaDTO, UpdateNotaDTO};
pub use notificacion::CreateNotificacionDTO;
pub use query::{
    ActividadesQuery, AgendaQuery, BaneosQuery, BusquedaQuery, CitasQuery, MensajesQuery,
    NotificacionesQuery, ParticipantePath, PsicologosQuery,
};
pub use reporte::{
    ConteoEstadoDTO, EstadisticasDTO, ProgresoModuloDTO, ReportePacienteDTO, ResumenDTO,
};
pub use terapia::{
    AsignacionDTO, AsignarActividadDTO, CompletarAsignacionDTO, CreateActividadDTO,
    CreateActividadRequestDTO, CreateAsignacionDTO, CreateEvidenciaDTO, CreateModuloDTO,
    ModuloDTO, RetroalimentacionDTO, UpdateActividadDTO, UpdateModuloDTO,
};
pub use test::{
    AplicacionDTO, AplicacionResumenDTO, AsignarTestDTO, CreateAplicacionDTO, CreatePreguntaDTO,
    CreateTestDTO, RespuestaDTO, RespuestasDTO, TestDTO,
};
pub use usuarios::{
    CreateAdminDTO, CreatePacienteDTO, CreatePacienteRequestDTO, CreatePsicologoDTO, PacienteDTO, PsicologoDTO,
    SuspensionDTO, UpdatePacienteDTO, UpdatePsicologoDTO,
};
