//! Foro entities - foros, temas, mensajes, participantes, baneos y bitácora de moderación

use super::enums::{AccionModeracion, RolForo, TipoUsuario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Foro {
    pub id: i64,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub publico: bool,
    pub creado_por_tipo: TipoUsuario,
    pub creado_por_id: i64,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ForoParticipante {
    pub foro_id: i64,
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
    pub rol: RolForo,
    pub unido_en: DateTime<Utc>,
}

impl ForoParticipante {
    pub fn es(&self, tipo: TipoUsuario, id: i64) -> bool {
        self.usuario_tipo == tipo && self.usuario_id == id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Tema {
    pub id: i64,
    pub foro_id: i64,
    pub titulo: String,
    pub autor_tipo: TipoUsuario,
    pub autor_id: i64,
    pub cerrado: bool,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MensajeForo {
    pub id: i64,
    pub tema_id: i64,
    pub autor_tipo: TipoUsuario,
    pub autor_id: i64,
    pub contenido: String,
    // borrado lógico, el contenido se conserva para la bitácora
    pub eliminado: bool,
    pub eliminado_por_tipo: Option<TipoUsuario>,
    pub eliminado_por_id: Option<i64>,
    pub eliminado_en: Option<DateTime<Utc>>,
    pub editado_en: Option<DateTime<Utc>>,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ForoBaneo {
    pub id: i64,
    pub foro_id: i64,
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
    pub motivo: String,
    pub baneado_por_tipo: TipoUsuario,
    pub baneado_por_id: i64,
    pub inicio: DateTime<Utc>,
    // None = permanente
    pub fin: Option<DateTime<Utc>>,
    pub activo: bool,
    pub levantado_en: Option<DateTime<Utc>>,
}

impl ForoBaneo {
    /// Un baneo está vigente si sigue activo y no ha llegado su fin
    pub fn vigente(&self, ahora: DateTime<Utc>) -> bool {
        self.activo && self.inicio <= ahora && self.fin.is_none_or(|fin| fin > ahora)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ModeracionLog {
    pub id: i64,
    pub foro_id: i64,
    pub moderador_tipo: TipoUsuario,
    pub moderador_id: i64,
    pub accion: AccionModeracion,
    pub objetivo_tipo: Option<TipoUsuario>,
    pub objetivo_id: Option<i64>,
    pub detalle: Option<String>,
    pub creado_en: DateTime<Utc>,
}
