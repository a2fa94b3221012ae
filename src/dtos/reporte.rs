//! Reporte DTOs - agregados por paciente y resúmenes

use super::test::AplicacionResumenDTO;
use super::usuarios::PacienteDTO;
use serde::{Deserialize, Serialize};

/// Conteo agrupado por estado
#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ConteoEstadoDTO {
    pub estado: String,
    pub total: i64,
}

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ProgresoModuloDTO {
    pub modulo_id: i64,
    pub modulo_titulo: String,
    pub actividades_asignadas: i64,
    pub actividades_completadas: i64,
    pub tests_asignados: i64,
    pub tests_completados: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReportePacienteDTO {
    pub paciente: PacienteDTO,
    pub citas: Vec<ConteoEstadoDTO>,
    pub tests: Vec<AplicacionResumenDTO>,
    pub actividades: Vec<ConteoEstadoDTO>,
    pub modulos: Vec<ProgresoModuloDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResumenDTO {
    pub pacientes: i64,
    pub citas_mes: i64,
    pub tests_pendientes: i64,
    pub actividades_pendientes: i64,
    pub mensajes_no_leidos: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EstadisticasDTO {
    pub psicologos: i64,
    pub psicologos_activos: i64,
    pub psicologos_suspendidos: i64,
    pub pacientes: i64,
    pub citas: i64,
    pub foros: i64,
    pub baneos_activos: i64,
    pub tests_completados: i64,
}
