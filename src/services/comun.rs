//! Utilidades compartidas por los handlers

use crate::core::{Actor, AppError, AppState, Correo};
use crate::dtos::CreateNotificacionDTO;
use crate::entities::{Paciente, TipoUsuario};
use crate::repositories::Create;
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Mensajes por página en los chats
pub const MENSAJES_POR_PAGINA: i64 = 50;

pub fn hoy() -> NaiveDate {
    Utc::now().date_naive()
}

/// Crea una notificación interna. Un fallo se registra pero no tumba la petición.
pub async fn notificar(state: &AppState, notificacion: CreateNotificacionDTO) {
    if let Err(e) = state.notificacion.create(&notificacion).await {
        warn!(
            "Could not create notification for {} {}: {}",
            notificacion.destinatario_tipo, notificacion.destinatario_id, e
        );
    }
}

/// Envía un correo. Un fallo del servidor SMTP se registra pero no tumba la petición.
pub async fn enviar_correo(state: &AppState, correo: Correo) {
    let para = correo.para.clone();
    if let Err(e) = state.mailer.enviar(correo).await {
        warn!("Could not send mail to {}: {}", para, e);
    }
}

/// Borra del disco archivos cuyas filas ya no existen
pub async fn borrar_archivos(rutas: Vec<String>) {
    for ruta in rutas {
        if let Err(e) = tokio::fs::remove_file(PathBuf::from(&ruta)).await {
            warn!("Could not remove file {}: {}", ruta, e);
        } else {
            debug!("Removed file {}", ruta);
        }
    }
}

/// Paciente del psicólogo autenticado; 404 si no existe o es de otro psicólogo
pub async fn paciente_propio(
    state: &AppState,
    actor: &Actor,
    paciente_id: i64,
) -> Result<Paciente, AppError> {
    state
        .paciente
        .read_de_psicologo(&paciente_id, &actor.id)
        .await?
        .ok_or_else(|| {
            warn!(
                "Psicologo {} requested paciente {} not owned",
                actor.id, paciente_id
            );
            AppError::not_found("Paciente no encontrado")
        })
}

/// Descifra un campo guardado
pub fn descifrar(state: &AppState, guardado: &str) -> Result<String, AppError> {
    Ok(state.cifrador.descifrar(guardado)?)
}

/// El actor es el psicólogo dueño o el paciente afectado
pub fn es_psicologo_o_paciente(actor: &Actor, psicologo_id: i64, paciente_id: i64) -> bool {
    actor.es(TipoUsuario::Psicologo, psicologo_id) || actor.es(TipoUsuario::Paciente, paciente_id)
}
