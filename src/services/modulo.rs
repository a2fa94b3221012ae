//! Modulo services - módulos del programa terapéutico

use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{CreateModuloDTO, ModuloDTO, UpdateModuloDTO};
use crate::entities::{Modulo, TipoUsuario};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

async fn con_actividades(state: &AppState, modulo: Modulo) -> Result<ModuloDTO, AppError> {
    let actividades = state.actividad.list_de_modulo(&modulo.id).await?;
    Ok(ModuloDTO {
        modulo,
        actividades,
    })
}

#[instrument(skip(state))]
pub async fn list_modulos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ModuloDTO>>, AppError> {
    debug!("Listing modules");
    let modulos = state.modulo.list().await?;
    let pendientes: Vec<_> = modulos
        .into_iter()
        .map(|modulo| con_actividades(&state, modulo))
        .collect();
    let resultado = futures::future::try_join_all(pendientes).await?;
    Ok(Json(resultado))
}

#[instrument(skip(state))]
pub async fn get_modulo(
    State(state): State<Arc<AppState>>,
    Path(modulo_id): Path<i64>,
) -> Result<Json<ModuloDTO>, AppError> {
    let modulo = state
        .modulo
        .read(&modulo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Módulo no encontrado"))?;
    Ok(Json(con_actividades(&state, modulo).await?))
}

#[instrument(skip(state, actor, body), fields(admin_id = %actor.id))]
pub async fn crear_modulo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateModuloDTO>,
) -> Result<(StatusCode, Json<Modulo>), AppError> {
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    body.validate()?;
    let modulo = state.modulo.create(&body).await?;
    info!("Module {} created", modulo.id);
    Ok((StatusCode::CREATED, Json(modulo)))
}

#[instrument(skip(state, actor, body), fields(admin_id = %actor.id))]
pub async fn update_modulo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(modulo_id): Path<i64>,
    Json(body): Json<UpdateModuloDTO>,
) -> Result<Json<Modulo>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    body.validate()?;
    state
        .modulo
        .read(&modulo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Módulo no encontrado"))?;
    Ok(Json(state.modulo.update(&modulo_id, &body).await?))
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn delete_modulo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(modulo_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    state
        .modulo
        .read(&modulo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Módulo no encontrado"))?;
    state.modulo.delete(&modulo_id).await?;
    info!("Module {} deleted", modulo_id);
    Ok(StatusCode::NO_CONTENT)
}
