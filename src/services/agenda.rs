//! Agenda services - agendas semanales y citas

use super::comun::{enviar_correo, es_psicologo_o_paciente, hoy, notificar, paciente_propio};
use crate::core::{Actor, AppError, AppState, Correo, require_tipo};
use crate::dtos::{
    AgendaDTO, AgendaQuery, CitasQuery, CreateCitaDTO, CreateCitaRequestDTO,
    CreateNotificacionDTO, UpdateAgendaDTO, UpdateCitaDTO,
};
use crate::entities::{Cita, EstadoCita, TipoNotificacion, TipoUsuario};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::{Days, NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Amplitud máxima de una consulta de citas por rango
const MAX_DIAS_RANGO: i64 = 366;
/// Rango por defecto cuando no se indica `hasta`
const DIAS_RANGO_DEFECTO: u64 = 30;

/// Horario coherente y fecha no pasada
fn validar_horario(fecha: NaiveDate, inicio: NaiveTime, fin: NaiveTime) -> Result<(), AppError> {
    if fin <= inicio {
        return Err(AppError::bad_request("Error de validación")
            .with_details("hora_fin: debe ser posterior a hora_inicio"));
    }
    if fecha < hoy() {
        return Err(AppError::bad_request("Error de validación")
            .with_details("fecha: no puede estar en el pasado"));
    }
    Ok(())
}

/// Ninguna otra cita viva del psicólogo ocupa ese hueco
async fn comprobar_solapes(
    state: &AppState,
    psicologo_id: i64,
    fecha: NaiveDate,
    inicio: NaiveTime,
    fin: NaiveTime,
    excluir: Option<i64>,
) -> Result<(), AppError> {
    let ocupadas = state.cita.ocupadas_del_dia(&psicologo_id, fecha).await?;
    if let Some(choque) = ocupadas
        .iter()
        .filter(|c| Some(c.id) != excluir)
        .find(|c| c.se_solapa(fecha, inicio, fin))
    {
        warn!("Cita overlaps with cita {}", choque.id);
        return Err(AppError::conflict("El horario se solapa con otra cita").with_details(
            format!(
                "Cita {} de {} a {}",
                choque.id,
                choque.hora_inicio.format("%H:%M"),
                choque.hora_fin.format("%H:%M")
            ),
        ));
    }
    Ok(())
}

/// Cita del psicólogo autenticado; 404 si es de otro
async fn cita_propia(state: &AppState, actor: &Actor, cita_id: i64) -> Result<Cita, AppError> {
    state
        .cita
        .read(&cita_id)
        .await?
        .filter(|c| c.psicologo_id == actor.id)
        .ok_or_else(|| AppError::not_found("Cita no encontrada"))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn get_agenda(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<AgendaQuery>,
) -> Result<Json<AgendaDTO>, AppError> {
    debug!("Getting weekly agenda");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    params.validate()?;
    let fecha = params.fecha.unwrap_or_else(hoy);

    let agenda = state.agenda.get_or_create(actor.id, fecha).await?;
    let citas = state.cita.list_de_agenda(&agenda.id).await?;
    info!("Agenda {} has {} citas", agenda.id, citas.len());
    Ok(Json(AgendaDTO { agenda, citas }))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn update_agenda(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(agenda_id): Path<i64>,
    Json(body): Json<UpdateAgendaDTO>,
) -> Result<Json<AgendaDTO>, AppError> {
    debug!("Updating agenda notes");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;

    state
        .agenda
        .read(&agenda_id)
        .await?
        .filter(|a| a.psicologo_id == actor.id)
        .ok_or_else(|| AppError::not_found("Agenda no encontrada"))?;

    let agenda = state
        .agenda
        .update_notas(&agenda_id, body.notas.as_deref())
        .await?;
    let citas = state.cita.list_de_agenda(&agenda.id).await?;
    Ok(Json(AgendaDTO { agenda, citas }))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn crear_cita(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateCitaRequestDTO>,
) -> Result<(StatusCode, Json<Cita>), AppError> {
    debug!("Creating cita");
    // 1. El paciente debe ser del psicólogo
    // 2. Validar horario, fecha y solapamientos
    // 3. Ubicar la cita en la agenda de su semana (se crea si falta)
    // 4. Crear la cita
    // 5. Notificar al paciente y enviarle correo
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    let paciente = paciente_propio(&state, &actor, body.paciente_id).await?;

    validar_horario(body.fecha, body.hora_inicio, body.hora_fin)?;
    comprobar_solapes(
        &state,
        actor.id,
        body.fecha,
        body.hora_inicio,
        body.hora_fin,
        None,
    )
    .await?;

    let agenda = state.agenda.get_or_create(actor.id, body.fecha).await?;

    let cita = state
        .cita
        .create(&CreateCitaDTO {
            agenda_id: agenda.id,
            psicologo_id: actor.id,
            paciente_id: paciente.id,
            fecha: body.fecha,
            hora_inicio: body.hora_inicio,
            hora_fin: body.hora_fin,
            modalidad: body.modalidad,
            motivo: body.motivo,
        })
        .await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Paciente,
            paciente.id,
            TipoNotificacion::Cita,
            "Nueva cita",
            format!(
                "Tienes una cita el {} a las {}",
                cita.fecha.format("%d/%m/%Y"),
                cita.hora_inicio.format("%H:%M")
            ),
        ),
    )
    .await;
    enviar_correo(
        &state,
        Correo::nueva_cita(&paciente.email, &paciente.nombre, cita.fecha, cita.hora_inicio),
    )
    .await;

    info!("Cita {} created for paciente {}", cita.id, paciente.id);
    Ok((StatusCode::CREATED, Json(cita)))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn list_citas(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<CitasQuery>,
) -> Result<Json<Vec<Cita>>, AppError> {
    debug!("Listing citas by range");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    params.validate()?;
    let desde = params.desde.unwrap_or_else(hoy);
    let hasta = match params.hasta {
        Some(hasta) => hasta,
        None => desde
            .checked_add_days(Days::new(DIAS_RANGO_DEFECTO))
            .ok_or_else(|| AppError::bad_request("Rango de fechas inválido"))?,
    };

    if desde > hasta {
        return Err(AppError::bad_request("Rango de fechas inválido")
            .with_details("desde debe ser anterior o igual a hasta"));
    }
    if (hasta - desde).num_days() > MAX_DIAS_RANGO {
        return Err(AppError::bad_request("Rango de fechas inválido")
            .with_details(format!("El rango no puede superar {} días", MAX_DIAS_RANGO)));
    }

    let citas = state
        .cita
        .list_rango(&actor.id, desde, hasta, params.paciente_id)
        .await?;
    info!("Found {} citas between {} and {}", citas.len(), desde, hasta);
    Ok(Json(citas))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn get_cita(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(cita_id): Path<i64>,
) -> Result<Json<Cita>, AppError> {
    let cita = state
        .cita
        .read(&cita_id)
        .await?
        .filter(|c| es_psicologo_o_paciente(&actor, c.psicologo_id, c.paciente_id))
        .ok_or_else(|| AppError::not_found("Cita no encontrada"))?;
    Ok(Json(cita))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn update_cita(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(cita_id): Path<i64>,
    Json(mut body): Json<UpdateCitaDTO>,
) -> Result<Json<Cita>, AppError> {
    debug!("Updating cita");
    // 1. Solo el psicólogo dueño
    // 2. Cancelada o completada: únicamente se puede cambiar el motivo
    // 3. Si cambia fecha u horario se repiten las comprobaciones de alta;
    //    los solapes no cuentan si la cita queda cancelada
    // 4. Si la nueva fecha cae fuera de su agenda pasa a la de esa semana
    // 5. Avisar al paciente de cancelaciones y reprogramaciones
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    let cita = cita_propia(&state, &actor, cita_id).await?;

    if cita.estado.es_final()
        && (body.reprograma() || body.modalidad.is_some() || body.estado.is_some())
    {
        warn!("Cita {} is {:?} and cannot change", cita.id, cita.estado);
        return Err(AppError::conflict("La cita ya no admite cambios")
            .with_details("Solo se puede modificar el motivo de una cita cancelada o completada"));
    }

    if body.reprograma() {
        let fecha = body.fecha.unwrap_or(cita.fecha);
        let inicio = body.hora_inicio.unwrap_or(cita.hora_inicio);
        let fin = body.hora_fin.unwrap_or(cita.hora_fin);
        validar_horario(fecha, inicio, fin)?;
        if body.estado != Some(EstadoCita::Cancelada) {
            comprobar_solapes(&state, actor.id, fecha, inicio, fin, Some(cita.id)).await?;
        }

        let actual = state.agenda.read(&cita.agenda_id).await?;
        if !actual.is_some_and(|a| a.contiene(fecha)) {
            let agenda = state.agenda.get_or_create(actor.id, fecha).await?;
            debug!("Cita moves to agenda {}", agenda.id);
            body.agenda_id = Some(agenda.id);
        }
    }

    let actualizada = state.cita.update(&cita_id, &body).await?;

    let aviso = if actualizada.estado == EstadoCita::Cancelada && cita.estado != EstadoCita::Cancelada
    {
        Some((
            "Cita cancelada",
            format!(
                "Tu cita del {} a las {} ha sido cancelada",
                cita.fecha.format("%d/%m/%Y"),
                cita.hora_inicio.format("%H:%M")
            ),
        ))
    } else if body.reprograma() {
        Some((
            "Cita reprogramada",
            format!(
                "Tu cita ahora es el {} a las {}",
                actualizada.fecha.format("%d/%m/%Y"),
                actualizada.hora_inicio.format("%H:%M")
            ),
        ))
    } else {
        None
    };
    if let Some((titulo, mensaje)) = aviso {
        notificar(
            &state,
            CreateNotificacionDTO::new(
                TipoUsuario::Paciente,
                actualizada.paciente_id,
                TipoNotificacion::Cita,
                titulo,
                mensaje,
            ),
        )
        .await;
    }

    info!("Cita {} updated", cita_id);
    Ok(Json(actualizada))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn delete_cita(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(cita_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting cita");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    cita_propia(&state, &actor, cita_id).await?;
    state.cita.delete(&cita_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn confirmar_cita(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(cita_id): Path<i64>,
) -> Result<Json<Cita>, AppError> {
    debug!("Confirming cita");
    // 1. Solo el paciente de la cita
    // 2. programada → confirmada, cualquier otro estado es conflicto
    // 3. Avisar al psicólogo
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    let cita = state
        .cita
        .read(&cita_id)
        .await?
        .filter(|c| c.paciente_id == actor.id)
        .ok_or_else(|| AppError::not_found("Cita no encontrada"))?;

    if !state.cita.confirmar(&cita.id).await? {
        warn!("Cita {} is {:?}, not programada", cita.id, cita.estado);
        return Err(AppError::conflict("Solo se puede confirmar una cita programada"));
    }

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Psicologo,
            cita.psicologo_id,
            TipoNotificacion::Cita,
            "Cita confirmada",
            format!(
                "{} confirmó la cita del {} a las {}",
                actor.nombre,
                cita.fecha.format("%d/%m/%Y"),
                cita.hora_inicio.format("%H:%M")
            ),
        ),
    )
    .await;

    let cita = state
        .cita
        .read(&cita_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cita no encontrada"))?;
    info!("Cita {} confirmed", cita_id);
    Ok(Json(cita))
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn mis_citas(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Cita>>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    let citas = state.cita.proximas_de_paciente(&actor.id, hoy()).await?;
    Ok(Json(citas))
}
