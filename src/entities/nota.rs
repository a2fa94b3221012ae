//! Nota clínica - el contenido se guarda cifrado

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Nota {
    pub id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub cita_id: Option<i64>,
    pub titulo: String,
    pub contenido: String,
    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}
