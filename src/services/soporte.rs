//! Soporte services - hilo de cada psicólogo con el equipo de administración

use super::chat::descifrar_pagina;
use super::comun::{MENSAJES_POR_PAGINA, notificar};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{
    ChatSoporteDTO, CreateMensajeDTO, CreateMensajeRequestDTO, CreateNotificacionDTO, MensajeDTO,
    MensajesQuery,
};
use crate::entities::{ChatSoporte, TipoNotificacion, TipoUsuario};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

async fn hilo(state: &AppState, chat_id: i64) -> Result<ChatSoporte, AppError> {
    state
        .soporte
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chat de soporte no encontrado"))
}

/// Cifra y guarda un mensaje del hilo
async fn guardar(
    state: &AppState,
    actor: &Actor,
    chat_id: i64,
    body: CreateMensajeRequestDTO,
) -> Result<MensajeDTO, AppError> {
    body.validate()?;
    let cifrado = state.cifrador.cifrar(&body.contenido)?;
    let mensaje = state
        .soporte
        .crear_mensaje(&CreateMensajeDTO {
            chat_id,
            remitente_tipo: actor.tipo,
            remitente_id: actor.id,
            contenido: cifrado,
        })
        .await?;
    info!("Support message {} stored in thread {}", mensaje.id, chat_id);
    Ok(MensajeDTO::con_contenido(mensaje, body.contenido))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn get_mis_mensajes(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<MensajesQuery>,
) -> Result<Json<Vec<MensajeDTO>>, AppError> {
    debug!("Getting own support thread");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let chat = state.soporte.get_or_create(actor.id).await?;
    let mensajes = state
        .soporte
        .list_mensajes(&chat.id, params.antes_de, MENSAJES_POR_PAGINA)
        .await?;
    state.soporte.marcar_leidos(&chat.id, actor.tipo).await?;
    Ok(Json(descifrar_pagina(&state, mensajes)?))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn enviar_mi_mensaje(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateMensajeRequestDTO>,
) -> Result<(StatusCode, Json<MensajeDTO>), AppError> {
    debug!("Writing to support");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let chat = state.soporte.get_or_create(actor.id).await?;
    let mensaje = guardar(&state, &actor, chat.id, body).await?;
    Ok((StatusCode::CREATED, Json(mensaje)))
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn list_hilos(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ChatSoporteDTO>>, AppError> {
    debug!("Listing support threads");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    let hilos = state.soporte.list_todos().await?;
    info!("Found {} support threads", hilos.len());
    Ok(Json(hilos))
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn get_mensajes_hilo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<i64>,
    Query(params): Query<MensajesQuery>,
) -> Result<Json<Vec<MensajeDTO>>, AppError> {
    debug!("Getting support thread messages");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    let chat = hilo(&state, chat_id).await?;
    let mensajes = state
        .soporte
        .list_mensajes(&chat.id, params.antes_de, MENSAJES_POR_PAGINA)
        .await?;
    state.soporte.marcar_leidos(&chat.id, actor.tipo).await?;
    Ok(Json(descifrar_pagina(&state, mensajes)?))
}

#[instrument(skip(state, actor, body), fields(admin_id = %actor.id))]
pub async fn responder_hilo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<i64>,
    Json(body): Json<CreateMensajeRequestDTO>,
) -> Result<(StatusCode, Json<MensajeDTO>), AppError> {
    debug!("Answering support thread");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    let chat = hilo(&state, chat_id).await?;
    let mensaje = guardar(&state, &actor, chat.id, body).await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Psicologo,
            chat.psicologo_id,
            TipoNotificacion::Sistema,
            "Respuesta de soporte",
            "El equipo de soporte ha respondido a tu consulta",
        ),
    )
    .await;
    Ok((StatusCode::CREATED, Json(mensaje)))
}
