//! Foro DTOs - foros, temas, mensajes y moderación

use crate::entities::{Foro, MensajeForo, RolForo, TipoUsuario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ForoDTO {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub foro: Foro,
    /// Rol del usuario que consulta, si participa
    pub mi_rol: Option<RolForo>,
}

fn publico_por_defecto() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateForoRequestDTO {
    #[validate(length(min = 3, max = 150, message = "El título debe tener entre 3 y 150 caracteres"))]
    pub titulo: String,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    #[serde(default = "publico_por_defecto")]
    pub publico: bool,
}

#[derive(Debug, Clone)]
pub struct CreateForoDTO {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub publico: bool,
    pub creado_por_tipo: TipoUsuario,
    pub creado_por_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdateForoDTO {
    #[validate(length(min = 3, max = 150))]
    pub titulo: Option<String>,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    pub publico: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgregarParticipanteDTO {
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CambiarRolDTO {
    pub rol: RolForo,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct CreateTemaRequestDTO {
    #[validate(length(min = 3, max = 200, message = "El título debe tener entre 3 y 200 caracteres"))]
    pub titulo: String,
    /// Primer mensaje del tema
    #[validate(length(min = 1, max = 5000))]
    pub contenido: String,
}

#[derive(Debug, Clone)]
pub struct CreateTemaDTO {
    pub foro_id: i64,
    pub titulo: String,
    pub autor_tipo: TipoUsuario,
    pub autor_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct MensajeForoRequestDTO {
    #[validate(length(min = 1, max = 5000, message = "El mensaje debe tener entre 1 y 5000 caracteres"))]
    pub contenido: String,
}

#[derive(Debug, Clone)]
pub struct CreateMensajeForoDTO {
    pub tema_id: i64,
    pub autor_tipo: TipoUsuario,
    pub autor_id: i64,
    pub contenido: String,
}

/// Mensaje de foro tal como lo ve el cliente; los eliminados no muestran contenido
#[derive(Serialize, Deserialize, Debug)]
pub struct MensajeForoDTO {
    pub id: i64,
    pub tema_id: i64,
    pub autor_tipo: TipoUsuario,
    pub autor_id: i64,
    pub contenido: Option<String>,
    pub eliminado: bool,
    pub editado_en: Option<DateTime<Utc>>,
    pub creado_en: DateTime<Utc>,
}

impl From<MensajeForo> for MensajeForoDTO {
    fn from(value: MensajeForo) -> Self {
        Self {
            id: value.id,
            tema_id: value.tema_id,
            autor_tipo: value.autor_tipo,
            autor_id: value.autor_id,
            contenido: if value.eliminado {
                None
            } else {
                Some(value.contenido)
            },
            eliminado: value.eliminado,
            editado_en: value.editado_en,
            creado_en: value.creado_en,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct CreateBaneoRequestDTO {
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
    #[validate(length(min = 3, max = 500, message = "El motivo debe tener entre 3 y 500 caracteres"))]
    pub motivo: String,
    /// Sin duración el baneo es permanente
    #[validate(range(min = 1, max = 8760))]
    pub duracion_horas: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateBaneoDTO {
    pub foro_id: i64,
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
    pub motivo: String,
    pub baneado_por_tipo: TipoUsuario,
    pub baneado_por_id: i64,
    pub inicio: DateTime<Utc>,
    pub fin: Option<DateTime<Utc>>,
}

/// Entrada de la bitácora de moderación
#[derive(Debug, Clone)]
pub struct CreateModeracionLogDTO {
    pub foro_id: i64,
    pub moderador_tipo: TipoUsuario,
    pub moderador_id: i64,
    pub accion: crate::entities::AccionModeracion,
    pub objetivo_tipo: Option<TipoUsuario>,
    pub objetivo_id: Option<i64>,
    pub detalle: Option<String>,
}
