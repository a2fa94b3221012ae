//! Psicologo services - perfil propio del psicólogo

use super::comun::borrar_archivos;
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{AvisoDTO, CambiarPasswordDTO, PsicologoDTO, UpdatePsicologoDTO, password_robusta};
use crate::entities::{TipoUsuario, hash_password, verificar_password};
use crate::repositories::{Read, Update};
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn get_perfil(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<PsicologoDTO>, AppError> {
    debug!("Getting own profile");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let psicologo = state
        .psicologo
        .read(&actor.id)
        .await?
        .ok_or_else(|| AppError::not_found("Psicólogo no encontrado"))?;
    Ok(Json(PsicologoDTO::from(psicologo)))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn update_perfil(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<UpdatePsicologoDTO>,
) -> Result<Json<PsicologoDTO>, AppError> {
    debug!("Updating own profile");
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    body.validate()?;
    let psicologo = state.psicologo.update(&actor.id, &body).await?;
    info!("Profile of psicologo {} updated", actor.id);
    Ok(Json(PsicologoDTO::from(psicologo)))
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn cambiar_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CambiarPasswordDTO>,
) -> Result<Json<AvisoDTO>, AppError> {
    debug!("Changing password");
    // 1. Verificar la contraseña actual (401 si no coincide)
    // 2. Validar la nueva y guardar su hash
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let psicologo = state
        .psicologo
        .read(&actor.id)
        .await?
        .ok_or_else(|| AppError::not_found("Psicólogo no encontrado"))?;

    if !verificar_password(&body.actual, &psicologo.password) {
        warn!("Wrong current password");
        return Err(AppError::unauthorized("La contraseña actual no es correcta"));
    }
    if !password_robusta(&body.nueva) {
        return Err(AppError::bad_request("Error de validación").with_details(
            "nueva: mínimo 8 caracteres con al menos una letra y un dígito",
        ));
    }

    state
        .psicologo
        .set_password(&actor.id, &hash_password(&body.nueva)?)
        .await?;
    info!("Password changed for psicologo {}", actor.id);
    Ok(Json(AvisoDTO::new("Contraseña actualizada")))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn delete_cuenta(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<StatusCode, AppError> {
    debug!("Deleting own account");
    // 1. Borrado en cascada en una transacción
    // 2. Tras el commit, borrar del disco las evidencias de sus pacientes
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let rutas = state.psicologo.delete_cascada(&actor.id).await?;
    borrar_archivos(rutas).await;
    info!("Psicologo {} deleted own account", actor.id);
    Ok(StatusCode::NO_CONTENT)
}
