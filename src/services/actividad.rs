//! Actividad services - catálogo, asignaciones a pacientes y evidencias

use super::comun::{borrar_archivos, es_psicologo_o_paciente, hoy, notificar, paciente_propio};
use crate::core::tokens::generar_token;
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{
    ActividadesQuery, AsignacionDTO, AsignarActividadDTO, CompletarAsignacionDTO,
    CreateActividadDTO, CreateActividadRequestDTO, CreateAsignacionDTO, CreateEvidenciaDTO,
    CreateNotificacionDTO, RetroalimentacionDTO, UpdateActividadDTO,
};
use crate::entities::{
    Actividad, ActividadAsignada, EstadoAsignacion, Evidencia, TipoNotificacion, TipoUsuario,
};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Campo del formulario que trae el archivo
const CAMPO_ARCHIVO: &str = "archivo";

/// Tipos admitidos y la extensión con la que se guardan
fn extension_de(tipo_mime: &str) -> Option<&'static str> {
    match tipo_mime {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "application/pdf" => Some("pdf"),
        "audio/mpeg" => Some("mp3"),
        "audio/mp4" | "audio/x-m4a" => Some("m4a"),
        _ => None,
    }
}

/// Actividad que el actor puede editar o borrar.
/// Un psicólogo solo las suyas; un admin solo las del catálogo.
async fn actividad_editable(
    state: &AppState,
    actor: &Actor,
    actividad_id: i64,
) -> Result<Actividad, AppError> {
    require_tipo(actor, &[TipoUsuario::Psicologo, TipoUsuario::Admin])?;
    let actividad = state
        .actividad
        .read(&actividad_id)
        .await?
        .ok_or_else(|| AppError::not_found("Actividad no encontrada"))?;

    match (actor.tipo, actividad.psicologo_id) {
        (TipoUsuario::Psicologo, Some(dueno)) if dueno != actor.id => {
            Err(AppError::not_found("Actividad no encontrada"))
        }
        (TipoUsuario::Psicologo, None) => Err(AppError::forbidden(
            "Las actividades del catálogo solo las gestiona un admin",
        )),
        (TipoUsuario::Admin, Some(_)) => Err(AppError::forbidden(
            "La actividad pertenece a un psicólogo",
        )),
        _ => Ok(actividad),
    }
}

async fn asignacion(state: &AppState, asignacion_id: i64) -> Result<ActividadAsignada, AppError> {
    state
        .asignacion
        .read(&asignacion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asignación no encontrada"))
}

/// Asignación del paciente autenticado
async fn asignacion_del_paciente(
    state: &AppState,
    actor: &Actor,
    asignacion_id: i64,
) -> Result<ActividadAsignada, AppError> {
    require_tipo(actor, &[TipoUsuario::Paciente])?;
    let asignacion = asignacion(state, asignacion_id).await?;
    if asignacion.paciente_id != actor.id {
        return Err(AppError::not_found("Asignación no encontrada"));
    }
    Ok(asignacion)
}

/// Asignación hecha por el psicólogo autenticado
async fn asignacion_del_psicologo(
    state: &AppState,
    actor: &Actor,
    asignacion_id: i64,
) -> Result<ActividadAsignada, AppError> {
    require_tipo(actor, &[TipoUsuario::Psicologo])?;
    let asignacion = asignacion(state, asignacion_id).await?;
    if asignacion.psicologo_id != actor.id {
        return Err(AppError::not_found("Asignación no encontrada"));
    }
    Ok(asignacion)
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_actividades(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ActividadesQuery>,
) -> Result<Json<Vec<Actividad>>, AppError> {
    debug!("Listing activities");
    require_tipo(&actor, &[TipoUsuario::Psicologo, TipoUsuario::Admin])?;
    let psicologo_id = (actor.tipo == TipoUsuario::Psicologo).then_some(actor.id);
    let actividades = state
        .actividad
        .list_visibles(psicologo_id, params.modulo_id)
        .await?;
    info!("Found {} activities", actividades.len());
    Ok(Json(actividades))
}

#[instrument(skip(state, actor, body), fields(actor_id = %actor.id))]
pub async fn crear_actividad(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateActividadRequestDTO>,
) -> Result<(StatusCode, Json<Actividad>), AppError> {
    debug!("Creating activity");
    // 1. Un admin crea entradas del catálogo, un psicólogo actividades propias
    // 2. El módulo, si se indica, debe existir
    require_tipo(&actor, &[TipoUsuario::Psicologo, TipoUsuario::Admin])?;
    body.validate()?;
    if let Some(modulo_id) = body.modulo_id {
        state
            .modulo
            .read(&modulo_id)
            .await?
            .ok_or_else(|| AppError::bad_request("El módulo indicado no existe"))?;
    }

    let psicologo_id = (actor.tipo == TipoUsuario::Psicologo).then_some(actor.id);
    let actividad = state
        .actividad
        .create(&CreateActividadDTO {
            psicologo_id,
            datos: body,
        })
        .await?;
    info!("Activity {} created", actividad.id);
    Ok((StatusCode::CREATED, Json(actividad)))
}

#[instrument(skip(state, actor, body), fields(actor_id = %actor.id))]
pub async fn update_actividad(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(actividad_id): Path<i64>,
    Json(body): Json<UpdateActividadDTO>,
) -> Result<Json<Actividad>, AppError> {
    debug!("Updating activity");
    body.validate()?;
    actividad_editable(&state, &actor, actividad_id).await?;
    if let Some(modulo_id) = body.modulo_id {
        state
            .modulo
            .read(&modulo_id)
            .await?
            .ok_or_else(|| AppError::bad_request("El módulo indicado no existe"))?;
    }
    Ok(Json(state.actividad.update(&actividad_id, &body).await?))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn delete_actividad(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(actividad_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting activity");
    actividad_editable(&state, &actor, actividad_id).await?;
    let rutas = state.actividad.delete_con_evidencias(&actividad_id).await?;
    borrar_archivos(rutas).await;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn asignar_actividad(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
    Json(body): Json<AsignarActividadDTO>,
) -> Result<(StatusCode, Json<ActividadAsignada>), AppError> {
    debug!("Assigning activity");
    // 1. Paciente propio y actividad visible para el psicólogo
    // 2. La fecha límite no puede estar en el pasado
    // 3. Crear la asignación y avisar al paciente
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    let paciente = paciente_propio(&state, &actor, paciente_id).await?;

    let actividad = state
        .actividad
        .read(&body.actividad_id)
        .await?
        .filter(|a| a.visible_para(actor.id))
        .ok_or_else(|| AppError::not_found("Actividad no encontrada"))?;

    if body.fecha_limite.is_some_and(|f| f < hoy()) {
        return Err(AppError::bad_request("Error de validación")
            .with_details("fecha_limite: no puede estar en el pasado"));
    }

    let asignacion = state
        .asignacion
        .create(&CreateAsignacionDTO {
            actividad_id: actividad.id,
            paciente_id: paciente.id,
            psicologo_id: actor.id,
            fecha_limite: body.fecha_limite,
        })
        .await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Paciente,
            paciente.id,
            TipoNotificacion::Actividad,
            "Nueva actividad",
            format!("Tienes una nueva actividad: {}", actividad.titulo),
        ),
    )
    .await;

    info!("Activity {} assigned to paciente {}", actividad.id, paciente.id);
    Ok((StatusCode::CREATED, Json(asignacion)))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn list_asignaciones_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<Json<Vec<AsignacionDTO>>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    paciente_propio(&state, &actor, paciente_id).await?;
    Ok(Json(state.asignacion.list_de_paciente(&paciente_id).await?))
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn mis_asignaciones(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<AsignacionDTO>>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    Ok(Json(state.asignacion.list_de_paciente(&actor.id).await?))
}

#[instrument(skip(state, actor, body), fields(paciente_id = %actor.id))]
pub async fn completar_asignacion(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(asignacion_id): Path<i64>,
    Json(body): Json<CompletarAsignacionDTO>,
) -> Result<Json<ActividadAsignada>, AppError> {
    debug!("Completing assignment");
    body.validate()?;
    let asignacion = asignacion_del_paciente(&state, &actor, asignacion_id).await?;

    let completada = state
        .asignacion
        .completar(&asignacion.id, body.comentario.as_deref())
        .await?
        .ok_or_else(|| {
            warn!("Assignment {} is {:?}", asignacion.id, asignacion.estado);
            AppError::conflict("La asignación ya fue completada")
        })?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Psicologo,
            asignacion.psicologo_id,
            TipoNotificacion::Actividad,
            "Actividad completada",
            format!("{} completó una actividad", actor.nombre),
        ),
    )
    .await;
    Ok(Json(completada))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn retroalimentar(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(asignacion_id): Path<i64>,
    Json(body): Json<RetroalimentacionDTO>,
) -> Result<Json<ActividadAsignada>, AppError> {
    debug!("Reviewing assignment");
    body.validate()?;
    let asignacion = asignacion_del_psicologo(&state, &actor, asignacion_id).await?;

    let revisada = state
        .asignacion
        .revisar(&asignacion.id, &body.retroalimentacion)
        .await?
        .ok_or_else(|| {
            AppError::conflict("Solo se puede revisar una asignación completada")
        })?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Paciente,
            asignacion.paciente_id,
            TipoNotificacion::Actividad,
            "Actividad revisada",
            "Tu psicólogo ha dejado comentarios sobre tu actividad",
        ),
    )
    .await;
    Ok(Json(revisada))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn delete_asignacion(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(asignacion_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting assignment");
    asignacion_del_psicologo(&state, &actor, asignacion_id).await?;
    let rutas = state.asignacion.delete_con_evidencias(&asignacion_id).await?;
    borrar_archivos(rutas).await;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
#[instrument(skip(state, actor, multipart), fields(paciente_id = %actor.id))]
pub async fn subir_evidencia(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(asignacion_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Evidencia>), AppError> {
    debug!("Uploading evidence");
    // 1. Asignación propia y no revisada
    // 2. Leer el campo `archivo`: tipo admitido y tamaño máximo
    // 3. Guardar en disco con nombre aleatorio
    // 4. Registrar metadatos; si falla, se borra el archivo
    // 5. La primera evidencia pasa la asignación a en_progreso
    let asignacion = asignacion_del_paciente(&state, &actor, asignacion_id).await?;
    if asignacion.estado == EstadoAsignacion::Revisada {
        return Err(AppError::conflict("La asignación ya fue revisada"));
    }

    let mut archivo = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(CAMPO_ARCHIVO) {
            continue;
        }
        let nombre = field.file_name().unwrap_or("evidencia").to_string();
        let tipo_mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let datos = field.bytes().await?;
        archivo = Some((nombre, tipo_mime, datos));
    }
    let (nombre, tipo_mime, datos) = archivo.ok_or_else(|| {
        AppError::bad_request("Falta el archivo")
            .with_details(format!("Envía el archivo en el campo '{}'", CAMPO_ARCHIVO))
    })?;

    let extension = extension_de(&tipo_mime).ok_or_else(|| {
        warn!("Rejected evidence with type {}", tipo_mime);
        AppError::bad_request("Tipo de archivo no admitido")
            .with_details("Se admiten jpeg, png, pdf, mp3 y m4a")
    })?;
    if datos.len() > state.max_upload_bytes {
        return Err(AppError::payload_too_large("El archivo supera el tamaño máximo"));
    }

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let ruta = state
        .upload_dir
        .join(format!("{}.{}", generar_token(), extension))
        .to_string_lossy()
        .into_owned();
    tokio::fs::write(&ruta, &datos).await?;

    let evidencia = match state
        .evidencia
        .create(&CreateEvidenciaDTO {
            asignacion_id: asignacion.id,
            nombre_archivo: nombre,
            ruta: ruta.clone(),
            tipo_mime,
            tamano: datos.len() as i64,
        })
        .await
    {
        Ok(evidencia) => evidencia,
        Err(e) => {
            error!("Could not save evidence metadata: {}", e);
            borrar_archivos(vec![ruta]).await;
            return Err(e.into());
        }
    };

    state.asignacion.marcar_en_progreso(&asignacion.id).await?;
    info!("Evidence {} uploaded ({} bytes)", evidencia.id, evidencia.tamano);
    Ok((StatusCode::CREATED, Json(evidencia)))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_evidencias(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(asignacion_id): Path<i64>,
) -> Result<Json<Vec<Evidencia>>, AppError> {
    let asignacion = asignacion(&state, asignacion_id).await?;
    if !es_psicologo_o_paciente(&actor, asignacion.psicologo_id, asignacion.paciente_id) {
        return Err(AppError::not_found("Asignación no encontrada"));
    }
    Ok(Json(state.evidencia.list(&asignacion.id).await?))
}

/// Evidencia y su asignación, si el actor es el paciente o el psicólogo
async fn evidencia_visible(
    state: &AppState,
    actor: &Actor,
    evidencia_id: i64,
) -> Result<(Evidencia, ActividadAsignada), AppError> {
    let evidencia = state
        .evidencia
        .read(&evidencia_id)
        .await?
        .ok_or_else(|| AppError::not_found("Evidencia no encontrada"))?;
    let asignacion = asignacion(state, evidencia.asignacion_id).await?;
    if !es_psicologo_o_paciente(actor, asignacion.psicologo_id, asignacion.paciente_id) {
        return Err(AppError::not_found("Evidencia no encontrada"));
    }
    Ok((evidencia, asignacion))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn descargar_evidencia(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(evidencia_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Downloading evidence");
    let (evidencia, _) = evidencia_visible(&state, &actor, evidencia_id).await?;

    let datos = tokio::fs::read(&evidencia.ruta).await.map_err(|e| {
        error!("Evidence file {} unreadable: {}", evidencia.ruta, e);
        AppError::not_found("Archivo no disponible")
    })?;

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_str(&evidencia.tipo_mime)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                evidencia.nombre_archivo.replace('"', "")
            ))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
        ),
    ];
    Ok((headers, datos))
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn delete_evidencia(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(evidencia_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting evidence");
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    let (evidencia, asignacion) = evidencia_visible(&state, &actor, evidencia_id).await?;
    if asignacion.estado == EstadoAsignacion::Revisada {
        return Err(AppError::conflict("La asignación ya fue revisada"));
    }

    state.evidencia.delete(&evidencia.id).await?;
    borrar_archivos(vec![evidencia.ruta]).await;
    Ok(StatusCode::NO_CONTENT)
}
