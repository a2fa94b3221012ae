//! Notificacion entity

use super::enums::{TipoNotificacion, TipoUsuario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Notificacion {
    pub id: i64,
    pub destinatario_tipo: TipoUsuario,
    pub destinatario_id: i64,
    pub tipo: TipoNotificacion,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    pub creada_en: DateTime<Utc>,
}
