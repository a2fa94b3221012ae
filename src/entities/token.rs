//! TokenCuenta - tokens de activación y recuperación de cuenta

use super::enums::{PropositoToken, TipoUsuario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct TokenCuenta {
    pub id: i64,
    pub tipo_usuario: TipoUsuario,
    pub usuario_id: i64,
    pub proposito: PropositoToken,
    // sha256 en hex, el token en claro solo viaja por correo
    pub token_hash: String,
    pub expira_en: DateTime<Utc>,
    pub usado: bool,
    pub creado_en: DateTime<Utc>,
}

impl TokenCuenta {
    pub fn es_valido(&self, ahora: DateTime<Utc>) -> bool {
        !self.usado && self.expira_en > ahora
    }
}
