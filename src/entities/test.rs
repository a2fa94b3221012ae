//! Tests psicométricos - cuestionarios, preguntas, aplicaciones y respuestas

use super::enums::EstadoAplicacion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Test {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub modulo_id: Option<i64>,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PreguntaTest {
    pub id: i64,
    pub test_id: i64,
    pub texto: String,
    pub orden: i64,
    pub valor_min: i64,
    pub valor_max: i64,
}

impl PreguntaTest {
    pub fn admite(&self, valor: i64) -> bool {
        (self.valor_min..=self.valor_max).contains(&valor)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct AplicacionTest {
    pub id: i64,
    pub test_id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
    pub estado: EstadoAplicacion,
    pub puntaje_total: Option<i64>,
    pub asignada_en: DateTime<Utc>,
    pub completada_en: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ResultadoTest {
    pub id: i64,
    pub aplicacion_id: i64,
    pub pregunta_id: i64,
    pub valor: i64,
}
