//! Foro services - foros, participación, temas y mensajes

use super::comun::notificar;
use super::moderacion::registrar;
use crate::core::{
    Actor, AppError, AppState, ContextoForo, baneo_vigente, contexto_foro, require_rol_foro,
    require_tipo,
};
use crate::dtos::{
    AgregarParticipanteDTO, CreateForoDTO, CreateForoRequestDTO, CreateMensajeForoDTO,
    CreateNotificacionDTO, CreateTemaDTO, CreateTemaRequestDTO, ForoDTO, MensajeForoDTO,
    MensajeForoRequestDTO, UpdateForoDTO,
};
use crate::entities::{
    AccionModeracion, Foro, ForoParticipante, RolForo, Tema, TipoNotificacion, TipoUsuario,
};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const MODERADORES: &[RolForo] = &[RolForo::Admin, RolForo::Moderador];

/// Comprueba que exista la cuenta indicada
async fn usuario_existe(state: &AppState, tipo: TipoUsuario, id: i64) -> Result<bool, AppError> {
    let existe = match tipo {
        TipoUsuario::Admin => state.admin.read(&id).await?.is_some(),
        TipoUsuario::Psicologo => state.psicologo.read(&id).await?.is_some(),
        TipoUsuario::Paciente => state.paciente.read(&id).await?.is_some(),
    };
    Ok(existe)
}

pub(crate) async fn tema_del_foro(
    state: &AppState,
    foro_id: i64,
    tema_id: i64,
) -> Result<Tema, AppError> {
    state
        .tema
        .read_de_foro(&foro_id, &tema_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tema no encontrado"))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_foros(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ForoDTO>>, AppError> {
    debug!("Listing forums");
    let foros = state.foro.list_visibles(actor.tipo, actor.id).await?;
    info!("Found {} forums", foros.len());
    Ok(Json(foros))
}

#[instrument(skip(state, actor, body), fields(actor_id = %actor.id))]
pub async fn crear_foro(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateForoRequestDTO>,
) -> Result<(StatusCode, Json<Foro>), AppError> {
    debug!("Creating forum");
    // 1. Solo psicólogos y admins crean foros
    // 2. El creador queda como admin del foro (misma transacción)
    require_tipo(&actor, &[TipoUsuario::Psicologo, TipoUsuario::Admin])?;
    body.validate()?;

    let foro = state
        .foro
        .create(&CreateForoDTO {
            titulo: body.titulo,
            descripcion: body.descripcion,
            publico: body.publico,
            creado_por_tipo: actor.tipo,
            creado_por_id: actor.id,
        })
        .await?;
    info!("Forum {} created", foro.id);
    Ok((StatusCode::CREATED, Json(foro)))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn get_foro(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(foro_id): Path<i64>,
) -> Result<Json<ForoDTO>, AppError> {
    debug!("Getting forum");
    let foro = state
        .foro
        .read(&foro_id)
        .await?
        .ok_or_else(|| AppError::not_found("Foro no encontrado"))?;

    let participante = state
        .participante
        .read(&(foro_id, actor.tipo, actor.id))
        .await?;
    let mi_rol = match (&participante, actor.tipo) {
        (_, TipoUsuario::Admin) => Some(RolForo::Admin),
        (Some(p), _) => Some(p.rol),
        (None, _) => None,
    };

    if !foro.publico && mi_rol.is_none() {
        warn!("{} {} cannot see private forum {}", actor.tipo, actor.id, foro_id);
        return Err(AppError::forbidden("No participas en este foro"));
    }
    Ok(Json(ForoDTO { foro, mi_rol }))
}

#[instrument(skip(state, actor, body), fields(actor_id = %actor.id))]
pub async fn update_foro(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(foro_id): Path<i64>,
    Json(body): Json<UpdateForoDTO>,
) -> Result<Json<Foro>, AppError> {
    debug!("Updating forum");
    let contexto = contexto_foro(&state, &actor, foro_id).await?;
    require_rol_foro(&contexto.participante, &[RolForo::Admin])?;
    body.validate()?;

    let foro = state.foro.update(&foro_id, &body).await?;
    info!("Forum {} updated", foro_id);
    Ok(Json(foro))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn delete_foro(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(foro_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting forum");
    let contexto = contexto_foro(&state, &actor, foro_id).await?;
    require_rol_foro(&contexto.participante, &[RolForo::Admin])?;

    state.foro.delete(&foro_id).await?;
    info!("Forum {} deleted", foro_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn unirse(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(foro_id): Path<i64>,
) -> Result<(StatusCode, Json<ForoParticipante>), AppError> {
    debug!("Joining forum");
    // 1. Solo foros públicos admiten unirse libremente
    // 2. Un baneo vigente lo impide (403 con motivo y fin)
    // 3. 409 si ya participa
    let foro = state
        .foro
        .read(&foro_id)
        .await?
        .ok_or_else(|| AppError::not_found("Foro no encontrado"))?;
    if !foro.publico {
        return Err(AppError::forbidden("El foro es privado")
            .with_details("Un moderador debe añadirte como participante"));
    }

    if let Some(baneo) = state
        .baneo
        .find_vigente(&foro_id, actor.tipo, &actor.id)
        .await?
    {
        warn!("{} {} is banned from forum {}", actor.tipo, actor.id, foro_id);
        return Err(baneo_vigente(&baneo));
    }

    if state
        .participante
        .read(&(foro_id, actor.tipo, actor.id))
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Ya participas en este foro"));
    }

    let participante = state
        .participante
        .agregar(foro_id, actor.tipo, actor.id, RolForo::Miembro)
        .await?;
    Ok((StatusCode::CREATED, Json(participante)))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn salir(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(foro_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Leaving forum");
    // 1. Un baneo vigente no impide salir; el baneo sigue en pie
    // 2. El último admin del foro no puede irse
    state
        .foro
        .read(&foro_id)
        .await?
        .ok_or_else(|| AppError::not_found("Foro no encontrado"))?;
    let id = (foro_id, actor.tipo, actor.id);
    let participante = state
        .participante
        .read(&id)
        .await?
        .ok_or_else(|| AppError::not_found("No participas en este foro"))?;

    if participante.rol == RolForo::Admin && state.participante.contar_admins(&foro_id).await? <= 1
    {
        warn!("Last admin of forum {} tried to leave", foro_id);
        return Err(AppError::conflict("Eres el último admin del foro")
            .with_details("Nombra otro admin antes de salir"));
    }

    state.participante.delete(&id).await?;
    info!("{} {} left forum {}", actor.tipo, actor.id, foro_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn list_participantes(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
) -> Result<Json<Vec<ForoParticipante>>, AppError> {
    let participantes = state.participante.list(&contexto.foro.id).await?;
    Ok(Json(participantes))
}

#[instrument(skip(state, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn agregar_participante(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
    Json(body): Json<AgregarParticipanteDTO>,
) -> Result<(StatusCode, Json<ForoParticipante>), AppError> {
    debug!("Adding participant");
    // 1. Moderador o superior
    // 2. La cuenta debe existir y no tener un baneo vigente
    // 3. 409 si ya participa
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let foro_id = contexto.foro.id;

    if !usuario_existe(&state, body.usuario_tipo, body.usuario_id).await? {
        return Err(AppError::not_found("Usuario no encontrado"));
    }
    if let Some(baneo) = state
        .baneo
        .find_vigente(&foro_id, body.usuario_tipo, &body.usuario_id)
        .await?
    {
        warn!("Cannot add banned user to forum {}", foro_id);
        return Err(AppError::forbidden("El usuario tiene un baneo vigente en este foro")
            .with_details(format!("Baneo {}: {}", baneo.id, baneo.motivo)));
    }
    if state
        .participante
        .read(&(foro_id, body.usuario_tipo, body.usuario_id))
        .await?
        .is_some()
    {
        return Err(AppError::conflict("El usuario ya participa en este foro"));
    }

    let participante = state
        .participante
        .agregar(foro_id, body.usuario_tipo, body.usuario_id, RolForo::Miembro)
        .await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            body.usuario_tipo,
            body.usuario_id,
            TipoNotificacion::Foro,
            "Nuevo foro",
            format!("Te han añadido al foro \"{}\"", contexto.foro.titulo),
        ),
    )
    .await;
    Ok((StatusCode::CREATED, Json(participante)))
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn list_temas(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
) -> Result<Json<Vec<Tema>>, AppError> {
    let temas = state.tema.list(&contexto.foro.id).await?;
    Ok(Json(temas))
}

#[instrument(skip(state, actor, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn crear_tema(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Json(body): Json<CreateTemaRequestDTO>,
) -> Result<(StatusCode, Json<Tema>), AppError> {
    debug!("Creating topic");
    body.validate()?;
    let (tema, _) = state
        .tema
        .create_con_mensaje(
            &CreateTemaDTO {
                foro_id: contexto.foro.id,
                titulo: body.titulo,
                autor_tipo: actor.tipo,
                autor_id: actor.id,
            },
            &body.contenido,
        )
        .await?;
    info!("Topic {} created in forum {}", tema.id, contexto.foro.id);
    Ok((StatusCode::CREATED, Json(tema)))
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn get_tema(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
) -> Result<Json<Tema>, AppError> {
    let tema = tema_del_foro(&state, contexto.foro.id, tema_id).await?;
    Ok(Json(tema))
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn list_mensajes(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<MensajeForoDTO>>, AppError> {
    debug!("Listing topic messages");
    let tema = tema_del_foro(&state, contexto.foro.id, tema_id).await?;
    let mensajes = state.mensaje_foro.list(&tema.id).await?;
    Ok(Json(mensajes.into_iter().map(MensajeForoDTO::from).collect()))
}

#[instrument(skip(state, actor, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn publicar_mensaje(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
    Json(body): Json<MensajeForoRequestDTO>,
) -> Result<(StatusCode, Json<MensajeForoDTO>), AppError> {
    debug!("Posting to topic");
    // 1. El tema debe ser del foro y estar abierto
    // 2. Guardar el mensaje
    // 3. Avisar al autor del tema si es otra persona
    body.validate()?;
    let tema = tema_del_foro(&state, contexto.foro.id, tema_id).await?;
    if tema.cerrado {
        warn!("Topic {} is closed", tema.id);
        return Err(AppError::forbidden("El tema está cerrado"));
    }

    let mensaje = state
        .mensaje_foro
        .create(&CreateMensajeForoDTO {
            tema_id: tema.id,
            autor_tipo: actor.tipo,
            autor_id: actor.id,
            contenido: body.contenido,
        })
        .await?;

    if !actor.es(tema.autor_tipo, tema.autor_id) {
        notificar(
            &state,
            CreateNotificacionDTO::new(
                tema.autor_tipo,
                tema.autor_id,
                TipoNotificacion::Foro,
                "Nueva respuesta",
                format!("{} respondió en \"{}\"", actor.nombre, tema.titulo),
            ),
        )
        .await;
    }
    Ok((StatusCode::CREATED, Json(MensajeForoDTO::from(mensaje))))
}

#[instrument(skip(state, actor, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn editar_mensaje(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, mensaje_id)): Path<(i64, i64)>,
    Json(body): Json<MensajeForoRequestDTO>,
) -> Result<Json<MensajeForoDTO>, AppError> {
    debug!("Editing forum message");
    body.validate()?;
    let mensaje = state
        .mensaje_foro
        .read_de_foro(&contexto.foro.id, &mensaje_id)
        .await?
        .ok_or_else(|| AppError::not_found("Mensaje no encontrado"))?;

    if !actor.es(mensaje.autor_tipo, mensaje.autor_id) {
        return Err(AppError::forbidden("Solo el autor puede editar el mensaje"));
    }
    if mensaje.eliminado {
        return Err(AppError::conflict("El mensaje fue eliminado"));
    }

    let mensaje = state.mensaje_foro.editar(&mensaje_id, &body.contenido).await?;
    Ok(Json(MensajeForoDTO::from(mensaje)))
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn eliminar_mensaje(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, mensaje_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting forum message");
    // 1. El autor o un moderador
    // 2. Borrado lógico
    // 3. Si lo borra un moderador queda en la bitácora
    let foro_id = contexto.foro.id;
    let mensaje = state
        .mensaje_foro
        .read_de_foro(&foro_id, &mensaje_id)
        .await?
        .ok_or_else(|| AppError::not_found("Mensaje no encontrado"))?;

    let es_autor = actor.es(mensaje.autor_tipo, mensaje.autor_id);
    if !es_autor {
        require_rol_foro(&contexto.participante, MODERADORES)?;
    }
    if mensaje.eliminado {
        return Err(AppError::conflict("El mensaje ya fue eliminado"));
    }

    state
        .mensaje_foro
        .eliminar(&mensaje_id, actor.tipo, actor.id)
        .await?;

    if !es_autor {
        registrar(
            &state,
            &actor,
            foro_id,
            AccionModeracion::EliminarMensaje,
            Some((mensaje.autor_tipo, mensaje.autor_id)),
            Some(format!("Mensaje {} del tema {}", mensaje.id, mensaje.tema_id)),
        )
        .await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
