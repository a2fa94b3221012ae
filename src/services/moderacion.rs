//! Moderacion services - baneos, roles, expulsiones y bitácora
//!
//! Toda acción de moderación deja una entrada en `moderacion_log`.

use super::comun::notificar;
use super::foro::tema_del_foro;
use crate::core::{Actor, AppError, AppState, ContextoForo, require_rol_foro};
use crate::dtos::{
    BaneosQuery, CambiarRolDTO, CreateBaneoDTO, CreateBaneoRequestDTO, CreateModeracionLogDTO,
    CreateNotificacionDTO, ParticipantePath,
};
use crate::entities::{
    AccionModeracion, ForoBaneo, ForoParticipante, ModeracionLog, RolForo, Tema,
    TipoNotificacion, TipoUsuario,
};
use crate::repositories::{Create, Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const MODERADORES: &[RolForo] = &[RolForo::Admin, RolForo::Moderador];

/// Añade una entrada a la bitácora del foro
pub(crate) async fn registrar(
    state: &AppState,
    actor: &Actor,
    foro_id: i64,
    accion: AccionModeracion,
    objetivo: Option<(TipoUsuario, i64)>,
    detalle: Option<String>,
) -> Result<ModeracionLog, AppError> {
    let entrada = state
        .moderacion
        .create(&CreateModeracionLogDTO {
            foro_id,
            moderador_tipo: actor.tipo,
            moderador_id: actor.id,
            accion,
            objetivo_tipo: objetivo.map(|(tipo, _)| tipo),
            objetivo_id: objetivo.map(|(_, id)| id),
            detalle,
        })
        .await?;
    info!("Moderation action {:?} logged in forum {}", accion, foro_id);
    Ok(entrada)
}

async fn participante_objetivo(
    state: &AppState,
    path: &ParticipantePath,
) -> Result<ForoParticipante, AppError> {
    state
        .participante
        .read(&(path.foro_id, path.usuario_tipo, path.usuario_id))
        .await?
        .ok_or_else(|| AppError::not_found("Participante no encontrado"))
}

#[debug_handler]
#[instrument(skip(state, actor, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn banear(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Json(body): Json<CreateBaneoRequestDTO>,
) -> Result<(StatusCode, Json<ForoBaneo>), AppError> {
    debug!("Banning user");
    // 1. Moderador o superior, nunca sobre sí mismo
    // 2. No se banea a admins (del foro o de la plataforma);
    //    un moderador no puede banear a otro moderador
    // 3. 409 si ya hay un baneo vigente (los expirados se cierran antes)
    // 4. Crear baneo, registrar en bitácora y avisar al afectado
    require_rol_foro(&contexto.participante, MODERADORES)?;
    body.validate()?;
    let foro_id = contexto.foro.id;

    if actor.es(body.usuario_tipo, body.usuario_id) {
        return Err(AppError::bad_request("No puedes banearte a ti mismo"));
    }
    if body.usuario_tipo == TipoUsuario::Admin {
        return Err(AppError::forbidden("No se puede banear a un admin de la plataforma"));
    }

    let objetivo = state
        .participante
        .read(&(foro_id, body.usuario_tipo, body.usuario_id))
        .await?;
    match objetivo.map(|p| p.rol) {
        Some(RolForo::Admin) => {
            warn!("Attempt to ban a forum admin in forum {}", foro_id);
            return Err(AppError::forbidden("No se puede banear a un admin del foro"));
        }
        Some(RolForo::Moderador) if contexto.participante.rol == RolForo::Moderador => {
            warn!("Moderator attempted to ban another moderator in forum {}", foro_id);
            return Err(AppError::forbidden("Un moderador no puede banear a otro moderador"));
        }
        _ => {}
    }

    if let Some(vigente) = state
        .baneo
        .find_vigente(&foro_id, body.usuario_tipo, &body.usuario_id)
        .await?
    {
        return Err(AppError::conflict("El usuario ya tiene un baneo vigente")
            .with_details(format!("Baneo {}", vigente.id)));
    }

    let inicio = Utc::now();
    let baneo = state
        .baneo
        .create(&CreateBaneoDTO {
            foro_id,
            usuario_tipo: body.usuario_tipo,
            usuario_id: body.usuario_id,
            motivo: body.motivo.clone(),
            baneado_por_tipo: actor.tipo,
            baneado_por_id: actor.id,
            inicio,
            fin: body.duracion_horas.map(|h| inicio + Duration::hours(h)),
        })
        .await?;

    let duracion = match baneo.fin {
        Some(fin) => format!("hasta {}", fin.format("%d/%m/%Y %H:%M UTC")),
        None => "permanente".to_string(),
    };
    registrar(
        &state,
        &actor,
        foro_id,
        AccionModeracion::Banear,
        Some((body.usuario_tipo, body.usuario_id)),
        Some(format!("{} ({})", body.motivo, duracion)),
    )
    .await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            body.usuario_tipo,
            body.usuario_id,
            TipoNotificacion::Foro,
            "Baneo en foro",
            format!(
                "Has sido baneado del foro \"{}\" ({}). Motivo: {}",
                contexto.foro.titulo, duracion, body.motivo
            ),
        ),
    )
    .await;

    info!("Ban {} created in forum {}", baneo.id, foro_id);
    Ok((StatusCode::CREATED, Json(baneo)))
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn list_baneos(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
    Query(params): Query<BaneosQuery>,
) -> Result<Json<Vec<ForoBaneo>>, AppError> {
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let baneos = state
        .baneo
        .list(&contexto.foro.id, params.activos.unwrap_or(false))
        .await?;
    Ok(Json(baneos))
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn levantar_baneo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, baneo_id)): Path<(i64, i64)>,
) -> Result<Json<ForoBaneo>, AppError> {
    debug!("Lifting ban");
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let foro_id = contexto.foro.id;

    let baneo = state
        .baneo
        .levantar(&foro_id, &baneo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Baneo activo no encontrado"))?;

    registrar(
        &state,
        &actor,
        foro_id,
        AccionModeracion::Desbanear,
        Some((baneo.usuario_tipo, baneo.usuario_id)),
        None,
    )
    .await?;
    Ok(Json(baneo))
}

#[instrument(skip(state, actor, contexto, body), fields(foro_id = %contexto.foro.id))]
pub async fn cambiar_rol(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path(path): Path<ParticipantePath>,
    Json(body): Json<CambiarRolDTO>,
) -> Result<Json<ForoParticipante>, AppError> {
    debug!("Changing participant role");
    // 1. Solo el admin del foro, nunca sobre sí mismo
    // 2. El foro no puede quedarse sin admin
    require_rol_foro(&contexto.participante, &[RolForo::Admin])?;
    if actor.es(path.usuario_tipo, path.usuario_id) {
        return Err(AppError::bad_request("No puedes cambiar tu propio rol"));
    }

    let objetivo = participante_objetivo(&state, &path).await?;
    if objetivo.rol == RolForo::Admin
        && body.rol != RolForo::Admin
        && state.participante.contar_admins(&path.foro_id).await? <= 1
    {
        return Err(AppError::conflict("El foro se quedaría sin admin"));
    }

    let actualizado = state
        .participante
        .cambiar_rol(&(path.foro_id, path.usuario_tipo, path.usuario_id), body.rol)
        .await?;
    registrar(
        &state,
        &actor,
        path.foro_id,
        AccionModeracion::CambiarRol,
        Some((path.usuario_tipo, path.usuario_id)),
        Some(format!("{:?} -> {:?}", objetivo.rol, body.rol)),
    )
    .await?;
    Ok(Json(actualizado))
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn expulsar(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path(path): Path<ParticipantePath>,
) -> Result<StatusCode, AppError> {
    debug!("Expelling participant");
    // 1. Moderador o superior; para uno mismo está /salir
    // 2. Un moderador solo expulsa a miembros
    // 3. El foro no puede quedarse sin admin
    require_rol_foro(&contexto.participante, MODERADORES)?;
    if actor.es(path.usuario_tipo, path.usuario_id) {
        return Err(AppError::bad_request("Para abandonar el foro usa /salir"));
    }

    let objetivo = participante_objetivo(&state, &path).await?;
    if contexto.participante.rol == RolForo::Moderador && objetivo.rol.puede_moderar() {
        warn!("Moderator attempted to expel a {:?}", objetivo.rol);
        return Err(AppError::forbidden("Un moderador solo puede expulsar a miembros"));
    }
    if objetivo.rol == RolForo::Admin && state.participante.contar_admins(&path.foro_id).await? <= 1
    {
        return Err(AppError::conflict("El foro se quedaría sin admin"));
    }

    state
        .participante
        .delete(&(path.foro_id, path.usuario_tipo, path.usuario_id))
        .await?;
    registrar(
        &state,
        &actor,
        path.foro_id,
        AccionModeracion::Expulsar,
        Some((path.usuario_tipo, path.usuario_id)),
        None,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_cerrado(
    state: &AppState,
    actor: &Actor,
    contexto: &ContextoForo,
    tema_id: i64,
    cerrado: bool,
) -> Result<Tema, AppError> {
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let tema = tema_del_foro(state, contexto.foro.id, tema_id).await?;
    let tema = state.tema.set_cerrado(&tema.id, cerrado).await?;

    let accion = if cerrado {
        AccionModeracion::CerrarTema
    } else {
        AccionModeracion::AbrirTema
    };
    registrar(
        state,
        actor,
        contexto.foro.id,
        accion,
        None,
        Some(format!("Tema {}", tema.id)),
    )
    .await?;
    Ok(tema)
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn cerrar_tema(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
) -> Result<Json<Tema>, AppError> {
    Ok(Json(set_cerrado(&state, &actor, &contexto, tema_id, true).await?))
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn abrir_tema(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
) -> Result<Json<Tema>, AppError> {
    Ok(Json(set_cerrado(&state, &actor, &contexto, tema_id, false).await?))
}

#[instrument(skip(state, actor, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn eliminar_tema(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Extension(contexto): Extension<ContextoForo>,
    Path((_, tema_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting topic");
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let tema = tema_del_foro(&state, contexto.foro.id, tema_id).await?;

    state.tema.delete(&tema.id).await?;
    registrar(
        &state,
        &actor,
        contexto.foro.id,
        AccionModeracion::EliminarTema,
        Some((tema.autor_tipo, tema.autor_id)),
        Some(tema.titulo),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, contexto), fields(foro_id = %contexto.foro.id))]
pub async fn list_bitacora(
    State(state): State<Arc<AppState>>,
    Extension(contexto): Extension<ContextoForo>,
) -> Result<Json<Vec<ModeracionLog>>, AppError> {
    require_rol_foro(&contexto.participante, MODERADORES)?;
    let entradas = state.moderacion.list(&contexto.foro.id).await?;
    Ok(Json(entradas))
}
