//! Nota services - notas clínicas cifradas del psicólogo sobre sus pacientes

use super::comun::{descifrar, paciente_propio};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{CreateNotaDTO, CreateNotaRequestDTO, NotaDTO, UpdateNotaDTO};
use crate::entities::{Nota, TipoUsuario};
use crate::repositories::{Create, Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn a_dto(state: &AppState, nota: Nota) -> Result<NotaDTO, AppError> {
    let contenido = descifrar(state, &nota.contenido)?;
    Ok(NotaDTO::con_contenido(nota, contenido))
}

/// Nota escrita por el psicólogo autenticado; 404 si no
async fn nota_propia(state: &AppState, actor: &Actor, nota_id: i64) -> Result<Nota, AppError> {
    require_tipo(actor, &[TipoUsuario::Psicologo])?;
    state
        .nota
        .read(&nota_id)
        .await?
        .filter(|n| n.psicologo_id == actor.id)
        .ok_or_else(|| AppError::not_found("Nota no encontrada"))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn list_notas(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<Json<Vec<NotaDTO>>, AppError> {
    debug!("Listing notes");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    paciente_propio(&state, &actor, paciente_id).await?;

    let notas = state
        .nota
        .list_de_paciente(&paciente_id)
        .await?
        .into_iter()
        .map(|n| a_dto(&state, n))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(notas))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn crear_nota(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
    Json(body): Json<CreateNotaRequestDTO>,
) -> Result<(StatusCode, Json<NotaDTO>), AppError> {
    debug!("Creating note");
    // 1. Paciente propio; la cita, si se indica, debe ser de ese paciente
    // 2. Cifrar el contenido y guardar
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    let paciente = paciente_propio(&state, &actor, paciente_id).await?;

    if let Some(cita_id) = body.cita_id {
        let es_del_paciente = state
            .cita
            .read(&cita_id)
            .await?
            .is_some_and(|c| c.paciente_id == paciente.id);
        if !es_del_paciente {
            warn!("Cita {} does not belong to paciente {}", cita_id, paciente.id);
            return Err(AppError::bad_request("La cita no corresponde a este paciente"));
        }
    }

    let cifrado = state.cifrador.cifrar(&body.contenido)?;
    let nota = state
        .nota
        .create(&CreateNotaDTO {
            paciente_id: paciente.id,
            psicologo_id: actor.id,
            cita_id: body.cita_id,
            titulo: body.titulo,
            contenido: cifrado,
        })
        .await?;

    info!("Note {} created for paciente {}", nota.id, paciente.id);
    Ok((StatusCode::CREATED, Json(NotaDTO::con_contenido(nota, body.contenido))))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn get_nota(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(nota_id): Path<i64>,
) -> Result<Json<NotaDTO>, AppError> {
    let nota = nota_propia(&state, &actor, nota_id).await?;
    Ok(Json(a_dto(&state, nota)?))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn update_nota(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(nota_id): Path<i64>,
    Json(body): Json<UpdateNotaDTO>,
) -> Result<Json<NotaDTO>, AppError> {
    debug!("Updating note");
    body.validate()?;
    nota_propia(&state, &actor, nota_id).await?;

    let cifrado = body
        .contenido
        .as_deref()
        .map(|c| state.cifrador.cifrar(c))
        .transpose()?;
    let nota = state
        .nota
        .actualizar(&nota_id, body.titulo.as_deref(), cifrado.as_deref())
        .await?;
    Ok(Json(a_dto(&state, nota)?))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn delete_nota(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(nota_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    nota_propia(&state, &actor, nota_id).await?;
    state.nota.delete(&nota_id).await?;
    info!("Note {} deleted", nota_id);
    Ok(StatusCode::NO_CONTENT)
}
