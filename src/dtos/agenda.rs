//! Agenda DTOs

use crate::entities::{Agenda, Cita, EstadoCita, Modalidad};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Años admitidos en cualquier fecha de entrada
pub const ANIO_MIN: i32 = 1900;
pub const ANIO_MAX: i32 = 2200;

/// Rechaza fechas con años extendidos (`+262142-12-31`) antes de operar con ellas
pub fn fecha_en_rango(fecha: &NaiveDate) -> Result<(), ValidationError> {
    if (ANIO_MIN..=ANIO_MAX).contains(&fecha.year()) {
        return Ok(());
    }
    let mut error = ValidationError::new("fecha_fuera_de_rango");
    error.message = Some(format!("El año debe estar entre {} y {}", ANIO_MIN, ANIO_MAX).into());
    Err(error)
}

/// Agenda semanal con sus citas ordenadas
#[derive(Serialize, Deserialize, Debug)]
pub struct AgendaDTO {
    #[serde(flatten)]
    pub agenda: Agenda,
    pub citas: Vec<Cita>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct UpdateAgendaDTO {
    #[validate(length(max = 2000))]
    pub notas: Option<String>,
}

/// Cuerpo de POST /citas
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCitaRequestDTO {
    pub paciente_id: i64,
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub modalidad: Modalidad,
    #[validate(length(max = 500))]
    pub motivo: Option<String>,
}

/// DTO para insertar una cita ya ubicada en su agenda
#[derive(Debug, Clone)]
pub struct CreateCitaDTO {
    pub agenda_id: i64,
    pub psicologo_id: i64,
    pub paciente_id: i64,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub modalidad: Modalidad,
    pub motivo: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateCitaDTO {
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha: Option<NaiveDate>,
    pub hora_inicio: Option<NaiveTime>,
    pub hora_fin: Option<NaiveTime>,
    pub modalidad: Option<Modalidad>,
    pub estado: Option<EstadoCita>,
    #[validate(length(max = 500))]
    pub motivo: Option<String>,
    /// Lo rellena el servicio cuando cambia la agenda de la cita
    #[serde(skip)]
    pub agenda_id: Option<i64>,
}

impl UpdateCitaDTO {
    /// Cambia fecha u horario
    pub fn reprograma(&self) -> bool {
        self.fecha.is_some() || self.hora_inicio.is_some() || self.hora_fin.is_some()
    }
}
