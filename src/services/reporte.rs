//! Reporte services - progreso de un paciente y resumen del psicólogo

use super::comun::{hoy, paciente_propio};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{PacienteDTO, ReportePacienteDTO, ResumenDTO};
use crate::entities::TipoUsuario;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Primer y último día del mes que contiene `fecha`
fn mes_de(fecha: NaiveDate) -> (NaiveDate, NaiveDate) {
    let primero = fecha.with_day(1).unwrap_or(fecha);
    let ultimo = primero
        .checked_add_months(Months::new(1))
        .and_then(|siguiente| siguiente.pred_opt())
        .unwrap_or(fecha);
    (primero, ultimo)
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn reporte_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<Json<ReportePacienteDTO>, AppError> {
    debug!("Building patient report");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let paciente = paciente_propio(&state, &actor, paciente_id).await?;

    let citas = state.reporte.citas_por_estado(&paciente.id).await?;
    let tests = state.aplicacion.list_de_paciente(&paciente.id).await?;
    let actividades = state.reporte.actividades_por_estado(&paciente.id).await?;
    let modulos = state.reporte.progreso_modulos(&paciente.id).await?;

    Ok(Json(ReportePacienteDTO {
        paciente: PacienteDTO::from(paciente),
        citas,
        tests,
        actividades,
        modulos,
    }))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn resumen(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ResumenDTO>, AppError> {
    debug!("Building monthly summary");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let (desde, hasta) = mes_de(hoy());
    Ok(Json(state.reporte.resumen(&actor.id, desde, hasta).await?))
}
