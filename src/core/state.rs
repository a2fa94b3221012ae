//! Application State - Estado global de la aplicación
//!
//! Contiene todos los repositorios, la configuración y los servicios
//! compartidos (cifrado, correo) que usan rutas y middlewares.

use crate::core::config::Config;
use crate::core::crypto::{Cifrador, CryptoError};
use crate::core::mailer::Mailer;
use crate::repositories::{
    ActividadRepository, AdminRepository, AgendaRepository, AplicacionRepository,
    AsignacionRepository, ChatRepository, CitaRepository, EvidenciaRepository,
    ForoBaneoRepository, ForoParticipanteRepository, ForoRepository, MensajeForoRepository,
    MensajeRepository, ModeracionLogRepository, ModuloRepository, NotaRepository,
    NotificacionRepository, PacienteRepository, PsicologoRepository, ReporteRepository,
    SoporteRepository, TemaRepository, TestRepository, TokenRepository,
};
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Estado global compartido entre todas las rutas y middlewares
pub struct AppState {
    // cuentas
    pub admin: AdminRepository,
    pub psicologo: PsicologoRepository,
    pub paciente: PacienteRepository,
    pub token: TokenRepository,

    // agenda
    pub agenda: AgendaRepository,
    pub cita: CitaRepository,

    // mensajería cifrada
    pub chat: ChatRepository,
    pub msg: MensajeRepository,
    pub soporte: SoporteRepository,

    // foros y moderación
    pub foro: ForoRepository,
    pub participante: ForoParticipanteRepository,
    pub baneo: ForoBaneoRepository,
    pub tema: TemaRepository,
    pub mensaje_foro: MensajeForoRepository,
    pub moderacion: ModeracionLogRepository,

    // programa terapéutico
    pub modulo: ModuloRepository,
    pub actividad: ActividadRepository,
    pub asignacion: AsignacionRepository,
    pub evidencia: EvidenciaRepository,
    pub test: TestRepository,
    pub aplicacion: AplicacionRepository,
    pub nota: NotaRepository,

    pub notificacion: NotificacionRepository,
    pub reporte: ReporteRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,

    /// Cifrado de mensajes y notas en reposo
    pub cifrador: Cifrador,
    pub mailer: Mailer,

    /// Base de los enlaces de activación/recuperación enviados por correo
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Crea el estado inicializando todos los repositorios con el pool recibido.
    ///
    /// Falla solo si la clave de cifrado de la configuración no es válida.
    pub fn new(pool: SqlitePool, config: &Config, mailer: Mailer) -> Result<Self, CryptoError> {
        let cifrador = Cifrador::from_base64(&config.encryption_key)?;
        Ok(Self {
            admin: AdminRepository::new(pool.clone()),
            psicologo: PsicologoRepository::new(pool.clone()),
            paciente: PacienteRepository::new(pool.clone()),
            token: TokenRepository::new(pool.clone()),
            agenda: AgendaRepository::new(pool.clone()),
            cita: CitaRepository::new(pool.clone()),
            chat: ChatRepository::new(pool.clone()),
            msg: MensajeRepository::new(pool.clone()),
            soporte: SoporteRepository::new(pool.clone()),
            foro: ForoRepository::new(pool.clone()),
            participante: ForoParticipanteRepository::new(pool.clone()),
            baneo: ForoBaneoRepository::new(pool.clone()),
            tema: TemaRepository::new(pool.clone()),
            mensaje_foro: MensajeForoRepository::new(pool.clone()),
            moderacion: ModeracionLogRepository::new(pool.clone()),
            modulo: ModuloRepository::new(pool.clone()),
            actividad: ActividadRepository::new(pool.clone()),
            asignacion: AsignacionRepository::new(pool.clone()),
            evidencia: EvidenciaRepository::new(pool.clone()),
            test: TestRepository::new(pool.clone()),
            aplicacion: AplicacionRepository::new(pool.clone()),
            nota: NotaRepository::new(pool.clone()),
            notificacion: NotificacionRepository::new(pool.clone()),
            reporte: ReporteRepository::new(pool),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
            cifrador,
            mailer,
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            upload_dir: PathBuf::from(&config.upload_dir),
            max_upload_bytes: config.max_upload_bytes(),
        })
    }
}
