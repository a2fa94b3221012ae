//! DTOs del programa terapéutico - módulos, actividades y asignaciones

use super::agenda::fecha_en_rango;
use crate::entities::{Actividad, ActividadAsignada, Modulo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct ModuloDTO {
    #[serde(flatten)]
    pub modulo: Modulo,
    pub actividades: Vec<Actividad>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateModuloDTO {
    #[validate(length(min = 3, max = 150))]
    pub titulo: String,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub orden: i64,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdateModuloDTO {
    #[validate(length(min = 3, max = 150))]
    pub titulo: Option<String>,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    pub orden: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateActividadRequestDTO {
    pub modulo_id: Option<i64>,
    #[validate(length(min = 3, max = 150))]
    pub titulo: String,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    #[validate(length(max = 5000))]
    pub instrucciones: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateActividadDTO {
    /// None para el catálogo general
    pub psicologo_id: Option<i64>,
    pub datos: CreateActividadRequestDTO,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdateActividadDTO {
    pub modulo_id: Option<i64>,
    #[validate(length(min = 3, max = 150))]
    pub titulo: Option<String>,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    #[validate(length(max = 5000))]
    pub instrucciones: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct AsignarActividadDTO {
    pub actividad_id: i64,
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha_limite: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct CreateAsignacionDTO {
    pub actividad_id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub fecha_limite: Option<NaiveDate>,
}

/// Asignación con el título de su actividad
#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct AsignacionDTO {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub asignacion: ActividadAsignada,
    pub actividad_titulo: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct CompletarAsignacionDTO {
    #[validate(length(max = 2000))]
    pub comentario: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RetroalimentacionDTO {
    #[validate(length(min = 1, max = 5000))]
    pub retroalimentacion: String,
}

#[derive(Debug, Clone)]
pub struct CreateEvidenciaDTO {
    pub asignacion_id: i64,
    pub nombre_archivo: String,
    pub ruta: String,
    pub tipo_mime: String,
    pub tamano: i64,
}
