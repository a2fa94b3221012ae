//! Nota DTOs - el contenido viaja en claro, se cifra al guardar

use crate::entities::Nota;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct NotaDTO {
    pub id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub cita_id: Option<i64>,
    pub titulo: String,
    pub contenido: String,
    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

impl NotaDTO {
    pub fn con_contenido(nota: Nota, contenido: String) -> Self {
        Self {
            id: nota.id,
            paciente_id: nota.paciente_id,
            psicologo_id: nota.psicologo_id,
            cita_id: nota.cita_id,
            titulo: nota.titulo,
            contenido,
            creado_en: nota.creado_en,
            actualizado_en: nota.actualizado_en,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct CreateNotaRequestDTO {
    #[validate(length(min = 1, max = 200))]
    pub titulo: String,
    #[validate(length(min = 1, max = 20000))]
    pub contenido: String,
    pub cita_id: Option<i64>,
}

/// `contenido` ya cifrado
#[derive(Debug, Clone)]
pub struct CreateNotaDTO {
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub cita_id: Option<i64>,
    pub titulo: String,
    pub contenido: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdateNotaDTO {
    #[validate(length(min = 1, max = 200))]
    pub titulo: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub contenido: Option<String>,
}
