//! Chat entities - conversaciones cifradas psicólogo/paciente y soporte admin/psicólogo

use super::enums::TipoUsuario;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Chat {
    pub id: i64,
    pub psicologo_id: i64,
    pub paciente_id: i64,
    pub creado_en: DateTime<Utc>,
}

impl Chat {
    pub fn es_miembro(&self, tipo: TipoUsuario, id: i64) -> bool {
        match tipo {
            TipoUsuario::Psicologo => self.psicologo_id == id,
            TipoUsuario::Paciente => self.paciente_id == id,
            TipoUsuario::Admin => false,
        }
    }
}

/// Hilo de soporte entre un psicólogo y el equipo de administración
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ChatSoporte {
    pub id: i64,
    pub psicologo_id: i64,
    pub creado_en: DateTime<Utc>,
}

/// Mensaje tal como se guarda: `contenido` es base64(nonce || ciphertext)
/// Se usa tanto para `mensajes` como para `mensajes_soporte`.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Mensaje {
    pub id: i64,
    pub chat_id: i64,
    pub remitente_tipo: TipoUsuario,
    pub remitente_id: i64,
    pub contenido: String,
    pub leido: bool,
    pub creado_en: DateTime<Utc>,
}
