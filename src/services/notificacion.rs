//! Notificacion services - bandeja de notificaciones del usuario

use crate::core::{Actor, AppError, AppState};
use crate::dtos::{MarcadosDTO, NotificacionesQuery};
use crate::entities::Notificacion;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_notificaciones(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<NotificacionesQuery>,
) -> Result<Json<Vec<Notificacion>>, AppError> {
    debug!("Listing notifications");
    let notificaciones = state
        .notificacion
        .list(actor.tipo, actor.id, params.no_leidas.unwrap_or(false))
        .await?;
    Ok(Json(notificaciones))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn marcar_leida(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(notificacion_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state
        .notificacion
        .marcar_leida(&notificacion_id, actor.tipo, actor.id)
        .await?
    {
        return Err(AppError::not_found("Notificación no encontrada"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn marcar_todas(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<MarcadosDTO>, AppError> {
    let marcados = state.notificacion.marcar_todas(actor.tipo, actor.id).await?;
    Ok(Json(MarcadosDTO { marcados }))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn delete_notificacion(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(notificacion_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state
        .notificacion
        .delete_propia(&notificacion_id, actor.tipo, actor.id)
        .await?
    {
        return Err(AppError::not_found("Notificación no encontrada"));
    }
    Ok(StatusCode::NO_CONTENT)
}
