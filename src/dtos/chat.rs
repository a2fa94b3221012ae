//! Chat DTOs - mensajería cifrada y soporte

use crate::entities::{Chat, ChatSoporte, Mensaje, TipoUsuario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Mensaje ya descifrado, listo para el cliente
#[derive(Serialize, Deserialize, Debug)]
pub struct MensajeDTO {
    pub id: i64,
    pub chat_id: i64,
    pub remitente_tipo: TipoUsuario,
    pub remitente_id: i64,
    pub contenido: String,
    pub leido: bool,
    pub creado_en: DateTime<Utc>,
}

impl MensajeDTO {
    pub fn con_contenido(mensaje: Mensaje, contenido: String) -> Self {
        Self {
            id: mensaje.id,
            chat_id: mensaje.chat_id,
            remitente_tipo: mensaje.remitente_tipo,
            remitente_id: mensaje.remitente_id,
            contenido,
            leido: mensaje.leido,
            creado_en: mensaje.creado_en,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct CreateMensajeRequestDTO {
    #[validate(length(min = 1, max = 5000, message = "El mensaje debe tener entre 1 y 5000 caracteres"))]
    pub contenido: String,
}

/// DTO para insertar un mensaje; `contenido` ya viene cifrado
#[derive(Debug, Clone)]
pub struct CreateMensajeDTO {
    pub chat_id: i64,
    pub remitente_tipo: TipoUsuario,
    pub remitente_id: i64,
    pub contenido: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateChatRequestDTO {
    pub paciente_id: i64,
}

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ChatDTO {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub chat: Chat,
    pub no_leidos: i64,
}

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ChatSoporteDTO {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub chat: ChatSoporte,
    pub psicologo_nombre: String,
    pub no_leidos: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MarcadosDTO {
    pub marcados: u64,
}
