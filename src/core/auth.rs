use crate::core::{AppError, AppState};
use crate::entities::{Chat, Foro, ForoBaneo, ForoParticipante, RolForo, TipoUsuario};
use crate::repositories::Read;
use axum::extract::{Path, State};
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// contenido del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub sub: i64,
    pub tipo: TipoUsuario,
    pub email: String,
}

/// Usuario autenticado de la petición actual, lo inserta `authentication_middleware`
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub id: i64,
    pub tipo: TipoUsuario,
    pub email: String,
    pub nombre: String,
    /// Para pacientes: el psicólogo que los atiende
    pub psicologo_id: Option<i64>,
}

impl Actor {
    pub fn es(&self, tipo: TipoUsuario, id: i64) -> bool {
        self.tipo == tipo && self.id == id
    }
}

/// Foro y participación del actor, lo inserta `foro_participante_middleware`
#[derive(Debug, Clone)]
pub struct ContextoForo {
    pub foro: Foro,
    pub participante: ForoParticipante,
}

#[instrument(skip(secret), fields(id = %id, tipo = %tipo))]
pub fn encode_jwt(
    id: i64,
    tipo: TipoUsuario,
    email: String,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, AppError> {
    debug!("Encoding JWT token");
    let now = Utc::now();
    let exp = (now + Duration::hours(expiration_hours)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        sub: id,
        tipo,
        email,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        AppError::internal_server_error("Error al generar el token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, AppError> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::unauthorized("Token inválido o caducado")
    })
}

/// Carga la cuenta referida por los claims y construye el `Actor`.
/// Las cuentas sin activar o suspendidas no pasan.
async fn cargar_actor(state: &AppState, claims: &Claims) -> Result<Actor, AppError> {
    match claims.tipo {
        TipoUsuario::Admin => {
            let admin = state
                .admin
                .read(&claims.sub)
                .await?
                .ok_or_else(|| AppError::unauthorized("Usuario no autorizado"))?;
            Ok(Actor {
                id: admin.id,
                tipo: TipoUsuario::Admin,
                email: admin.email,
                nombre: admin.nombre,
                psicologo_id: None,
            })
        }
        TipoUsuario::Psicologo => {
            let psicologo = state
                .psicologo
                .read(&claims.sub)
                .await?
                .ok_or_else(|| AppError::unauthorized("Usuario no autorizado"))?;
            if !psicologo.activo {
                return Err(AppError::unauthorized("La cuenta no está activada"));
            }
            if psicologo.suspendido {
                return Err(AppError::forbidden("La cuenta está suspendida"));
            }
            Ok(Actor {
                id: psicologo.id,
                tipo: TipoUsuario::Psicologo,
                nombre: psicologo.nombre_completo(),
                email: psicologo.email,
                psicologo_id: None,
            })
        }
        TipoUsuario::Paciente => {
            let paciente = state
                .paciente
                .read(&claims.sub)
                .await?
                .ok_or_else(|| AppError::unauthorized("Usuario no autorizado"))?;
            if !paciente.activo {
                return Err(AppError::unauthorized("La cuenta no está activada"));
            }
            Ok(Actor {
                id: paciente.id,
                tipo: TipoUsuario::Paciente,
                nombre: paciente.nombre_completo(),
                email: paciente.email,
                psicologo_id: Some(paciente.psicologo_id),
            })
        }
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Cabecera Authorization inválida")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden(
                "Añade el token JWT a la cabecera Authorization",
            ));
        }
    };

    let mut parts = auth_header.split_whitespace();
    let token = match (parts.next(), parts.next()) {
        (Some(bearer), Some(token)) if bearer.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Se esperaba un token Bearer"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret)?;
    let actor = cargar_actor(&state, &token_data.claims).await?;
    info!("Authenticated {} {}", actor.tipo, actor.id);

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Verifica que el actor sea de uno de los tipos permitidos
pub fn require_tipo(actor: &Actor, permitidos: &[TipoUsuario]) -> Result<(), AppError> {
    if !permitidos.contains(&actor.tipo) {
        warn!(
            "{} {} attempted an action reserved to {:?}",
            actor.tipo, actor.id, permitidos
        );
        return Err(AppError::forbidden("No tienes permiso para esta acción")
            .with_details(format!("Requiere uno de los tipos de usuario: {:?}", permitidos)));
    }
    Ok(())
}

/// Verifica que el participante tenga uno de los roles requeridos en el foro
pub fn require_rol_foro(
    participante: &ForoParticipante,
    permitidos: &[RolForo],
) -> Result<(), AppError> {
    if !permitidos.contains(&participante.rol) {
        warn!(
            "Participant {} {} has insufficient forum role {:?}, required one of: {:?}",
            participante.usuario_tipo, participante.usuario_id, participante.rol, permitidos
        );
        return Err(AppError::forbidden("Rol insuficiente en el foro").with_details(format!(
            "Esta acción requiere uno de los roles: {:?}",
            permitidos
        )));
    }
    Ok(())
}

fn id_de_ruta(params: &HashMap<String, String>, nombre: &str) -> Result<i64, AppError> {
    params
        .get(nombre)
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| {
            warn!("Path parameter {} missing or invalid", nombre);
            AppError::bad_request("Identificador inválido en la ruta")
        })
}

fn actor_de(req: &Request) -> Result<Actor, AppError> {
    req.extensions().get::<Actor>().cloned().ok_or_else(|| {
        warn!("Actor not found in request extensions");
        AppError::unauthorized("Usuario no autenticado")
    })
}

/// Middleware que verifica que el actor sea el psicólogo o el paciente del chat
/// e inserta el `Chat` en las extensions
#[instrument(skip(state, params, req, next))]
pub async fn chat_membership_middleware(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running chat membership middleware");
    let actor = actor_de(&req)?;
    let chat_id = id_de_ruta(&params, "chat_id")?;

    let chat: Chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chat no encontrado"))?;

    if !chat.es_miembro(actor.tipo, actor.id) {
        warn!("{} {} is not a member of chat {}", actor.tipo, actor.id, chat_id);
        return Err(AppError::forbidden("No eres miembro de este chat"));
    }

    req.extensions_mut().insert(chat);
    Ok(next.run(req).await)
}

/// Resuelve el foro y la participación del actor: exige participación y que no haya
/// un baneo vigente. Los admins de la plataforma actúan como admin de cualquier foro.
pub async fn contexto_foro(
    state: &AppState,
    actor: &Actor,
    foro_id: i64,
) -> Result<ContextoForo, AppError> {
    let foro = state
        .foro
        .read(&foro_id)
        .await?
        .ok_or_else(|| AppError::not_found("Foro no encontrado"))?;

    let participante = if actor.tipo == TipoUsuario::Admin {
        ForoParticipante {
            foro_id,
            usuario_tipo: TipoUsuario::Admin,
            usuario_id: actor.id,
            rol: RolForo::Admin,
            unido_en: foro.creado_en,
        }
    } else {
        if let Some(baneo) = state
            .baneo
            .find_vigente(&foro_id, actor.tipo, &actor.id)
            .await?
        {
            warn!("{} {} is banned from forum {}", actor.tipo, actor.id, foro_id);
            return Err(baneo_vigente(&baneo));
        }

        state
            .participante
            .read(&(foro_id, actor.tipo, actor.id))
            .await?
            .ok_or_else(|| {
                warn!("{} {} is not a participant of forum {}", actor.tipo, actor.id, foro_id);
                AppError::forbidden("No participas en este foro")
            })?
    };

    Ok(ContextoForo { foro, participante })
}

/// 403 con el motivo y el fin del baneo
pub fn baneo_vigente(baneo: &ForoBaneo) -> AppError {
    let hasta = baneo
        .fin
        .map(|f| f.to_rfc3339())
        .unwrap_or_else(|| "permanente".to_string());
    AppError::forbidden("Tienes un baneo vigente en este foro")
        .with_details(format!("Motivo: {}. Hasta: {}", baneo.motivo, hasta))
}

/// Middleware de foros, inserta el `ContextoForo` en las extensions
#[instrument(skip(state, params, req, next))]
pub async fn foro_participante_middleware(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running forum participant middleware");
    let actor = actor_de(&req)?;
    let foro_id = id_de_ruta(&params, "foro_id")?;

    let contexto = contexto_foro(&state, &actor, foro_id).await?;
    req.extensions_mut().insert(contexto);
    Ok(next.run(req).await)
}
