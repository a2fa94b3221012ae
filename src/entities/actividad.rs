//! Módulos terapéuticos, actividades, asignaciones y evidencias

use super::enums::EstadoAsignacion;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Modulo {
    pub id: i64,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub orden: i64,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Actividad {
    pub id: i64,
    pub modulo_id: Option<i64>,
    // None = actividad del catálogo general (creada por un admin)
    pub psicologo_id: Option<i64>,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub instrucciones: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl Actividad {
    /// Un psicólogo puede usar las del catálogo y las suyas
    pub fn visible_para(&self, psicologo_id: i64) -> bool {
        self.psicologo_id.is_none_or(|p| p == psicologo_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ActividadAsignada {
    pub id: i64,
    pub actividad_id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub fecha_limite: Option<NaiveDate>,
    pub estado: EstadoAsignacion,
    pub comentario_paciente: Option<String>,
    pub retroalimentacion: Option<String>,
    pub asignada_en: DateTime<Utc>,
    pub completada_en: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Evidencia {
    pub id: i64,
    pub asignacion_id: i64,
    pub nombre_archivo: String,
    #[serde(skip_serializing)]
    pub ruta: String,
    pub tipo_mime: String,
    pub tamano: i64,
    pub subido_en: DateTime<Utc>,
}
