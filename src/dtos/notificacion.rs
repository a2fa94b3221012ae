//! Notificacion DTOs

use crate::entities::{TipoNotificacion, TipoUsuario};

#[derive(Debug, Clone)]
pub struct CreateNotificacionDTO {
    pub destinatario_tipo: TipoUsuario,
    pub destinatario_id: i64,
    pub tipo: TipoNotificacion,
    pub titulo: String,
    pub mensaje: String,
}

impl CreateNotificacionDTO {
    pub fn new(
        destinatario_tipo: TipoUsuario,
        destinatario_id: i64,
        tipo: TipoNotificacion,
        titulo: impl Into<String>,
        mensaje: impl Into<String>,
    ) -> Self {
        Self {
            destinatario_tipo,
            destinatario_id,
            tipo,
            titulo: titulo.into(),
            mensaje: mensaje.into(),
        }
    }
}
