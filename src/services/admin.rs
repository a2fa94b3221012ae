//! Admin services - gestión de psicólogos, estadísticas y admin inicial

use super::comun::{borrar_archivos, notificar};
use crate::core::{Actor, AppError, AppState, Config, require_tipo};
use crate::dtos::{
    CreateAdminDTO, CreateNotificacionDTO, EstadisticasDTO, PsicologoDTO, PsicologosQuery,
    SuspensionDTO,
};
use crate::entities::{TipoNotificacion, TipoUsuario, hash_password};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Crea el admin de `ADMIN_EMAIL`/`ADMIN_PASSWORD` si aún no existe
pub async fn bootstrap_admin(state: &AppState, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        debug!("No bootstrap admin configured");
        return Ok(());
    };
    let email = email.trim().to_lowercase();
    if state.admin.find_by_email(&email).await?.is_some() {
        debug!("Bootstrap admin {} already exists", email);
        return Ok(());
    }
    if state.psicologo.email_en_uso(&email).await? {
        warn!("Bootstrap admin email {} is used by another account", email);
        return Ok(());
    }

    state
        .admin
        .create(&CreateAdminDTO {
            nombre: "Administrador".to_string(),
            email: email.clone(),
            password: hash_password(password)?,
        })
        .await?;
    info!("Bootstrap admin {} created", email);
    Ok(())
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn list_psicologos(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<PsicologosQuery>,
) -> Result<Json<Vec<PsicologoDTO>>, AppError> {
    debug!("Listing psicologos");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    let psicologos = state.psicologo.list(params.activo).await?;
    info!("Found {} psicologos", psicologos.len());
    Ok(Json(psicologos.into_iter().map(PsicologoDTO::from).collect()))
}

#[instrument(skip(state, actor, body), fields(admin_id = %actor.id))]
pub async fn set_suspension(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(psicologo_id): Path<i64>,
    Json(body): Json<SuspensionDTO>,
) -> Result<Json<PsicologoDTO>, AppError> {
    debug!("Changing psicologo suspension");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    state
        .psicologo
        .read(&psicologo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Psicólogo no encontrado"))?;

    let psicologo = state
        .psicologo
        .set_suspendido(&psicologo_id, body.suspendido)
        .await?;

    let (titulo, mensaje) = if body.suspendido {
        ("Cuenta suspendida", "Tu cuenta ha sido suspendida por un administrador")
    } else {
        ("Cuenta reactivada", "Tu cuenta vuelve a estar activa")
    };
    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Psicologo,
            psicologo_id,
            TipoNotificacion::Sistema,
            titulo,
            mensaje,
        ),
    )
    .await;

    info!("Psicologo {} suspended: {}", psicologo_id, body.suspendido);
    Ok(Json(PsicologoDTO::from(psicologo)))
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn delete_psicologo(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(psicologo_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting psicologo");
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    state
        .psicologo
        .read(&psicologo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Psicólogo no encontrado"))?;

    let rutas = state.psicologo.delete_cascada(&psicologo_id).await?;
    borrar_archivos(rutas).await;
    info!("Psicologo {} deleted by admin {}", psicologo_id, actor.id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn estadisticas(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<EstadisticasDTO>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    Ok(Json(state.reporte.estadisticas().await?))
}
