//! DTOs de tests psicométricos

use crate::entities::{AplicacionTest, PreguntaTest, ResultadoTest, Test};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct TestDTO {
    #[serde(flatten)]
    pub test: Test,
    pub preguntas: Vec<PreguntaTest>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreatePreguntaDTO {
    #[validate(length(min = 1, max = 500))]
    pub texto: String,
    #[validate(range(min = -1000, max = 1000))]
    pub valor_min: i64,
    #[validate(range(min = -1000, max = 1000))]
    pub valor_max: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateTestDTO {
    #[validate(length(min = 3, max = 150))]
    pub nombre: String,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    pub modulo_id: Option<i64>,
    #[validate(length(min = 1, message = "El test necesita al menos una pregunta"), nested)]
    pub preguntas: Vec<CreatePreguntaDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AsignarTestDTO {
    pub test_id: i64,
}

#[derive(Debug, Clone)]
pub struct CreateAplicacionDTO {
    pub test_id: i64,
    pub paciente_id: i64,
    pub psicologo_id: i64,
}

/// Aplicación con el nombre del test
#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct AplicacionResumenDTO {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub aplicacion: AplicacionTest,
    pub test_nombre: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AplicacionDTO {
    #[serde(flatten)]
    pub aplicacion: AplicacionTest,
    pub test: TestDTO,
    pub resultados: Vec<ResultadoTest>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RespuestaDTO {
    pub pregunta_id: i64,
    pub valor: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RespuestasDTO {
    pub respuestas: Vec<RespuestaDTO>,
}
