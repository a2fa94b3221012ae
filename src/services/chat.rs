//! Chat services - mensajería cifrada entre psicólogo y paciente

use super::comun::{MENSAJES_POR_PAGINA, descifrar, notificar, paciente_propio};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{
    ChatDTO, CreateChatRequestDTO, CreateMensajeDTO, CreateMensajeRequestDTO,
    CreateNotificacionDTO, MarcadosDTO, MensajeDTO, MensajesQuery,
};
use crate::entities::{Chat, Mensaje, TipoNotificacion, TipoUsuario};
use crate::repositories::Create;
use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Descifra una página de mensajes guardados
pub(crate) fn descifrar_pagina(
    state: &AppState,
    mensajes: Vec<Mensaje>,
) -> Result<Vec<MensajeDTO>, AppError> {
    mensajes
        .into_iter()
        .map(|m| {
            let contenido = descifrar(state, &m.contenido)?;
            Ok(MensajeDTO::con_contenido(m, contenido))
        })
        .collect()
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ChatDTO>>, AppError> {
    debug!("Listing chats");
    require_tipo(&actor, &[TipoUsuario::Psicologo, TipoUsuario::Paciente])?;
    let chats = state.chat.list_de_usuario(actor.tipo, actor.id).await?;
    info!("Found {} chats", chats.len());
    Ok(Json(chats))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn crear_chat(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateChatRequestDTO>,
) -> Result<(StatusCode, Json<Chat>), AppError> {
    debug!("Getting or creating chat");
    // 1. El paciente debe ser del psicólogo
    // 2. Un único chat por pareja: 201 si se crea, 200 si ya existía
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let paciente = paciente_propio(&state, &actor, body.paciente_id).await?;

    let (chat, creado) = state.chat.get_or_create(actor.id, paciente.id).await?;
    let status = if creado {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(chat)))
}

#[instrument(skip(state, chat), fields(chat_id = %chat.id))]
pub async fn get_mensajes(
    State(state): State<Arc<AppState>>,
    Extension(chat): Extension<Chat>,
    Query(params): Query<MensajesQuery>,
) -> Result<Json<Vec<MensajeDTO>>, AppError> {
    debug!("Getting chat messages");
    let mensajes = state
        .msg
        .list_pagina(&chat.id, params.antes_de, MENSAJES_POR_PAGINA)
        .await?;
    info!("Found {} messages", mensajes.len());
    Ok(Json(descifrar_pagina(&state, mensajes)?))
}

#[instrument(skip(state, actor, chat, body), fields(chat_id = %chat.id, actor_id = %actor.id))]
pub async fn enviar_mensaje(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(chat): Extension<Chat>,
    Json(body): Json<CreateMensajeRequestDTO>,
) -> Result<(StatusCode, Json<MensajeDTO>), AppError> {
    debug!("Sending chat message");
    // 1. Validar longitud
    // 2. Cifrar y guardar
    // 3. Notificar a la otra parte
    body.validate()?;
    let cifrado = state.cifrador.cifrar(&body.contenido)?;

    let mensaje = state
        .msg
        .create(&CreateMensajeDTO {
            chat_id: chat.id,
            remitente_tipo: actor.tipo,
            remitente_id: actor.id,
            contenido: cifrado,
        })
        .await?;

    let (destinatario_tipo, destinatario_id) = match actor.tipo {
        TipoUsuario::Psicologo => (TipoUsuario::Paciente, chat.paciente_id),
        _ => (TipoUsuario::Psicologo, chat.psicologo_id),
    };
    notificar(
        &state,
        CreateNotificacionDTO::new(
            destinatario_tipo,
            destinatario_id,
            TipoNotificacion::Mensaje,
            "Nuevo mensaje",
            format!("{} te ha escrito", actor.nombre),
        ),
    )
    .await;

    info!("Message {} sent in chat {}", mensaje.id, chat.id);
    Ok((
        StatusCode::CREATED,
        Json(MensajeDTO::con_contenido(mensaje, body.contenido)),
    ))
}

#[instrument(skip(state, actor, chat), fields(chat_id = %chat.id))]
pub async fn marcar_leidos(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(chat): Extension<Chat>,
) -> Result<Json<MarcadosDTO>, AppError> {
    let marcados = state.msg.marcar_leidos(&chat.id, actor.tipo).await?;
    Ok(Json(MarcadosDTO { marcados }))
}
