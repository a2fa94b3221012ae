//! Paciente services - gestión de pacientes por su psicólogo

use super::auth::enviar_activacion;
use super::comun::{borrar_archivos, hoy, paciente_propio};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{
    BusquedaQuery, CreatePacienteDTO, CreatePacienteRequestDTO, PacienteDTO, UpdatePacienteDTO,
};
use crate::entities::TipoUsuario;
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn validar_fecha_nacimiento(fecha: Option<NaiveDate>) -> Result<(), AppError> {
    if fecha.is_some_and(|f| f > hoy()) {
        warn!("Birth date in the future");
        return Err(AppError::bad_request("Error de validación")
            .with_details("fecha_nacimiento: no puede ser futura"));
    }
    Ok(())
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn crear_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(mut body): Json<CreatePacienteRequestDTO>,
) -> Result<(StatusCode, Json<PacienteDTO>), AppError> {
    debug!("Creating paciente");
    // 1. Validar datos; la fecha de nacimiento no puede ser futura
    // 2. Email único entre todos los usuarios
    // 3. Crear el paciente inactivo asociado al psicólogo
    // 4. Enviar enlace de activación, donde el paciente elegirá su contraseña
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    validar_fecha_nacimiento(body.fecha_nacimiento)?;

    body.email = body.email.trim().to_lowercase();
    if state.psicologo.email_en_uso(&body.email).await? {
        warn!("Email already registered");
        return Err(AppError::conflict("El email ya está registrado"));
    }

    let paciente = state
        .paciente
        .create(&CreatePacienteDTO {
            psicologo_id: actor.id,
            datos: body,
        })
        .await?;

    enviar_activacion(
        &state,
        TipoUsuario::Paciente,
        paciente.id,
        &paciente.email,
        &paciente.nombre,
    )
    .await?;

    info!("Paciente {} created by psicologo {}", paciente.id, actor.id);
    Ok((StatusCode::CREATED, Json(PacienteDTO::from(paciente))))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn list_pacientes(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<BusquedaQuery>,
) -> Result<Json<Vec<PacienteDTO>>, AppError> {
    debug!("Listing pacientes");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let pacientes = state
        .paciente
        .list_de_psicologo(&actor.id, params.buscar.as_deref())
        .await?;
    info!("Found {} pacientes", pacientes.len());
    Ok(Json(pacientes.into_iter().map(PacienteDTO::from).collect()))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn get_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<Json<PacienteDTO>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let paciente = paciente_propio(&state, &actor, paciente_id).await?;
    Ok(Json(PacienteDTO::from(paciente)))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn update_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
    Json(body): Json<UpdatePacienteDTO>,
) -> Result<Json<PacienteDTO>, AppError> {
    debug!("Updating paciente");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    validar_fecha_nacimiento(body.fecha_nacimiento)?;
    paciente_propio(&state, &actor, paciente_id).await?;

    let paciente = state.paciente.update(&paciente_id, &body).await?;
    info!("Paciente {} updated", paciente_id);
    Ok(Json(PacienteDTO::from(paciente)))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn delete_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting paciente");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    paciente_propio(&state, &actor, paciente_id).await?;

    let rutas = state.paciente.delete_cascada(&paciente_id).await?;
    borrar_archivos(rutas).await;
    info!("Paciente {} deleted", paciente_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn get_mi_ficha(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<PacienteDTO>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    let paciente = state
        .paciente
        .read(&actor.id)
        .await?
        .ok_or_else(|| AppError::not_found("Paciente no encontrado"))?;
    Ok(Json(PacienteDTO::from(paciente)))
}
