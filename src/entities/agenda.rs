//! Agenda y Cita - agenda semanal del psicólogo y sus citas

use super::enums::{EstadoCita, Modalidad};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Agenda {
    pub id: i64,
    pub psicologo_id: i64,
    // siempre lunes
    pub semana_inicio: NaiveDate,
    // siempre domingo
    pub semana_fin: NaiveDate,
    pub notas: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl Agenda {
    /// Devuelve (lunes, domingo) de la semana que contiene `fecha`;
    /// `None` en los extremos del calendario
    pub fn semana_de(fecha: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let desde_lunes = fecha.weekday().num_days_from_monday() as u64;
        let lunes = fecha.checked_sub_days(Days::new(desde_lunes))?;
        Some((lunes, lunes.checked_add_days(Days::new(6))?))
    }

    pub fn contiene(&self, fecha: NaiveDate) -> bool {
        fecha >= self.semana_inicio && fecha <= self.semana_fin
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Cita {
    pub id: i64,
    pub agenda_id: i64,
    pub psicologo_id: i64,
    pub paciente_id: i64,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub modalidad: Modalidad,
    pub estado: EstadoCita,
    pub motivo: Option<String>,
    pub recordatorio_enviado: bool,
    pub creado_en: DateTime<Utc>,
}

impl Cita {
    /// Dos intervalos [inicio, fin) se solapan si cada uno empieza antes de que acabe el otro
    pub fn se_solapa(&self, fecha: NaiveDate, inicio: NaiveTime, fin: NaiveTime) -> bool {
        self.fecha == fecha && self.hora_inicio < fin && inicio < self.hora_fin
    }
}
