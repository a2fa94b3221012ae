//! Query DTOs - parámetros de query string

use super::agenda::fecha_en_rango;
use crate::entities::TipoUsuario;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// /pacientes?buscar=ana
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BusquedaQuery {
    #[serde(default)]
    pub buscar: Option<String>,
}

/// Paginación de mensajes hacia atrás
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MensajesQuery {
    #[serde(default)]
    pub antes_de: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct AgendaQuery {
    #[serde(default)]
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct CitasQuery {
    #[serde(default)]
    #[validate(custom(function = "fecha_en_rango"))]
    pub desde: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom(function = "fecha_en_rango"))]
    pub hasta: Option<NaiveDate>,
    #[serde(default)]
    pub paciente_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BaneosQuery {
    #[serde(default)]
    pub activos: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct NotificacionesQuery {
    #[serde(default)]
    pub no_leidas: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ActividadesQuery {
    #[serde(default)]
    pub modulo_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PsicologosQuery {
    #[serde(default)]
    pub activo: Option<bool>,
}

/// Segmentos `/{usuario_tipo}/{usuario_id}` de las rutas de participantes
#[derive(Serialize, Deserialize, Debug)]
pub struct ParticipantePath {
    pub foro_id: i64,
    pub usuario_tipo: TipoUsuario,
    pub usuario_id: i64,
}
