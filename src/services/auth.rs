//! Auth services - registro, activación, login y recuperación de contraseña

use super::comun::enviar_correo;
use crate::core::tokens::{HORAS_ACTIVACION, HORAS_RECUPERACION, generar_token, hash_token};
use crate::core::{AppError, AppState, Correo, encode_jwt};
use crate::dtos::{
    ActivarCuentaDTO, AvisoDTO, CreatePsicologoDTO, LoginDTO, LoginResponseDTO, PsicologoDTO,
    RecuperarPasswordDTO, RegistroPsicologoDTO, RestablecerPasswordDTO, UsuarioSesionDTO,
    cedula_valida, password_robusta,
};
use crate::entities::{PropositoToken, TipoUsuario, hash_password, verificar_password};
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Emite un token de un solo uso y devuelve el valor en claro para el enlace
async fn emitir_token(
    state: &AppState,
    tipo: TipoUsuario,
    usuario_id: i64,
    proposito: PropositoToken,
) -> Result<String, AppError> {
    let token = generar_token();
    let horas = match proposito {
        PropositoToken::Activacion => HORAS_ACTIVACION,
        PropositoToken::Recuperacion => HORAS_RECUPERACION,
    };
    state
        .token
        .emitir(
            tipo,
            usuario_id,
            proposito,
            &hash_token(&token),
            Utc::now() + Duration::hours(horas),
        )
        .await?;
    Ok(token)
}

/// Envía el enlace de activación de una cuenta recién creada
pub(crate) async fn enviar_activacion(
    state: &AppState,
    tipo: TipoUsuario,
    usuario_id: i64,
    email: &str,
    nombre: &str,
) -> Result<(), AppError> {
    let token = emitir_token(state, tipo, usuario_id, PropositoToken::Activacion).await?;
    let enlace = format!("{}/activar?token={}", state.frontend_url, token);
    enviar_correo(state, Correo::activacion(email, nombre, &enlace)).await;
    Ok(())
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn registrar_psicologo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegistroPsicologoDTO>,
) -> Result<(StatusCode, Json<PsicologoDTO>), AppError> {
    debug!("Registering psicologo");
    // 1. Validar el DTO (longitudes, email) más cédula y fortaleza de la contraseña
    // 2. Comprobar que el email no exista en ninguna tabla de usuarios
    // 3. Comprobar que la cédula no esté registrada
    // 4. Hashear la contraseña y crear la cuenta inactiva
    // 5. Emitir token de activación (48h) y enviar el enlace por correo
    // 6. Devolver 201 con el perfil creado
    body.validate()?;
    if !cedula_valida(&body.cedula) {
        warn!("Invalid cedula format");
        return Err(AppError::bad_request("Error de validación")
            .with_details("cedula: debe tener 7 u 8 dígitos"));
    }
    if !password_robusta(&body.password) {
        warn!("Weak password on registration");
        return Err(AppError::bad_request("Error de validación").with_details(
            "password: mínimo 8 caracteres con al menos una letra y un dígito",
        ));
    }

    let email = body.email.trim().to_lowercase();
    if state.psicologo.email_en_uso(&email).await? {
        warn!("Email already registered");
        return Err(AppError::conflict("El email ya está registrado"));
    }
    if state.psicologo.cedula_en_uso(&body.cedula).await? {
        warn!("Cedula already registered");
        return Err(AppError::conflict("La cédula ya está registrada"));
    }

    let psicologo = state
        .psicologo
        .create(&CreatePsicologoDTO {
            nombre: body.nombre.trim().to_string(),
            apellidos: body.apellidos.trim().to_string(),
            email,
            cedula: body.cedula,
            telefono: body.telefono,
            especialidad: body.especialidad,
            password: hash_password(&body.password)?,
        })
        .await?;

    enviar_activacion(
        &state,
        TipoUsuario::Psicologo,
        psicologo.id,
        &psicologo.email,
        &psicologo.nombre,
    )
    .await?;

    info!("Psicologo {} registered, pending activation", psicologo.id);
    Ok((StatusCode::CREATED, Json(PsicologoDTO::from(psicologo))))
}

#[instrument(skip(state, body))]
pub async fn activar_cuenta(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivarCuentaDTO>,
) -> Result<Json<AvisoDTO>, AppError> {
    debug!("Activating account");
    // 1. Buscar el token por su hash; debe ser de activación, no usado y no caducado
    // 2. Los pacientes eligen aquí su contraseña: validarla antes de consumir el token
    // 3. Consumir el token (un segundo intento concurrente falla)
    // 4. Activar la cuenta correspondiente
    let token = state
        .token
        .find_by_hash(&hash_token(&body.token), PropositoToken::Activacion)
        .await?
        .filter(|t| t.es_valido(Utc::now()))
        .ok_or_else(|| {
            warn!("Invalid or expired activation token");
            AppError::bad_request("Token de activación inválido o caducado")
        })?;

    let password_hash = match token.tipo_usuario {
        TipoUsuario::Paciente => {
            let password = body.password.as_deref().unwrap_or_default();
            if !password_robusta(password) {
                return Err(AppError::bad_request("Error de validación").with_details(
                    "password: mínimo 8 caracteres con al menos una letra y un dígito",
                ));
            }
            Some(hash_password(password)?)
        }
        _ => None,
    };

    if !state.token.consumir(&token.id).await? {
        warn!("Activation token {} already used", token.id);
        return Err(AppError::bad_request("Token de activación inválido o caducado"));
    }

    match (token.tipo_usuario, password_hash) {
        (TipoUsuario::Paciente, Some(hash)) => {
            state.paciente.activar(&token.usuario_id, &hash).await?
        }
        (TipoUsuario::Psicologo, _) => state.psicologo.activar(&token.usuario_id).await?,
        (tipo, _) => {
            error!("Activation token issued for unsupported user type {}", tipo);
            return Err(AppError::bad_request("Token de activación inválido o caducado"));
        }
    }

    info!("{} {} activated", token.tipo_usuario, token.usuario_id);
    Ok(Json(AvisoDTO::new("Cuenta activada")))
}

/// Cuenta encontrada en el login, ya normalizada
struct CuentaLogin {
    id: i64,
    tipo: TipoUsuario,
    nombre: String,
    email: String,
    password: String,
    activo: bool,
    suspendido: bool,
}

async fn buscar_cuenta(state: &AppState, email: &str) -> Result<Option<CuentaLogin>, AppError> {
    if let Some(admin) = state.admin.find_by_email(email).await? {
        return Ok(Some(CuentaLogin {
            id: admin.id,
            tipo: TipoUsuario::Admin,
            nombre: admin.nombre,
            email: admin.email,
            password: admin.password,
            activo: true,
            suspendido: false,
        }));
    }
    if let Some(psicologo) = state.psicologo.find_by_email(email).await? {
        return Ok(Some(CuentaLogin {
            id: psicologo.id,
            tipo: TipoUsuario::Psicologo,
            nombre: psicologo.nombre_completo(),
            email: psicologo.email,
            password: psicologo.password,
            activo: psicologo.activo,
            suspendido: psicologo.suspendido,
        }));
    }
    if let Some(paciente) = state.paciente.find_by_email(email).await? {
        return Ok(Some(CuentaLogin {
            id: paciente.id,
            tipo: TipoUsuario::Paciente,
            nombre: paciente.nombre_completo(),
            email: paciente.email,
            password: paciente.password,
            activo: paciente.activo,
            suspendido: false,
        }));
    }
    Ok(None)
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Buscar la cuenta por email en admins, psicólogos y pacientes
    // 2. Si no existe o la contraseña no coincide, 401
    // 3. Cuentas sin activar: 401; suspendidas: 403
    // 4. Generar el JWT con id, tipo y email
    // 5. Cookie HttpOnly + cabecera Authorization con el token
    // 6. Devolver 200 con token, tipo y datos básicos del usuario
    let email = body.email.trim().to_lowercase();
    let cuenta = match buscar_cuenta(&state, &email).await? {
        Some(cuenta) if verificar_password(&body.password, &cuenta.password) => cuenta,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Email o contraseña incorrectos"));
        }
    };

    if !cuenta.activo {
        warn!("Login on inactive account {} {}", cuenta.tipo, cuenta.id);
        return Err(AppError::unauthorized("La cuenta no está activada"));
    }
    if cuenta.suspendido {
        warn!("Login on suspended account {} {}", cuenta.tipo, cuenta.id);
        return Err(AppError::forbidden("La cuenta está suspendida"));
    }

    let token = encode_jwt(
        cuenta.id,
        cuenta.tipo,
        cuenta.email.clone(),
        &state.jwt_secret,
        state.jwt_expiration_hours,
    )?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        state.jwt_expiration_hours * 60 * 60
    );
    let cabecera = |valor: String| {
        HeaderValue::from_str(&valor).map_err(|e| {
            error!("Invalid header value: {}", e);
            AppError::internal_server_error("Error interno del servidor")
        })
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cabecera(cookie_value)?);
    headers.insert(header::AUTHORIZATION, cabecera(format!("Bearer {}", token))?);

    info!("{} {} logged in", cuenta.tipo, cuenta.id);
    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponseDTO {
            token,
            tipo: cuenta.tipo,
            usuario: UsuarioSesionDTO {
                id: cuenta.id,
                nombre: cuenta.nombre,
                email: cuenta.email,
            },
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn recuperar_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecuperarPasswordDTO>,
) -> Result<Json<AvisoDTO>, AppError> {
    debug!("Password recovery requested");
    // 1. Responder siempre lo mismo, exista o no la cuenta
    // 2. Si existe una cuenta activa con ese email, emitir token (1h) y enviarlo
    let aviso = AvisoDTO::new("Si el email está registrado, recibirás un enlace de recuperación");
    if body.validate().is_err() {
        return Ok(Json(aviso));
    }

    let email = body.email.trim().to_lowercase();
    match buscar_cuenta(&state, &email).await? {
        Some(cuenta) if cuenta.activo && !cuenta.suspendido => {
            let token =
                emitir_token(&state, cuenta.tipo, cuenta.id, PropositoToken::Recuperacion).await?;
            let enlace = format!("{}/restablecer?token={}", state.frontend_url, token);
            enviar_correo(&state, Correo::recuperacion(&cuenta.email, &cuenta.nombre, &enlace))
                .await;
            info!("Recovery token issued for {} {}", cuenta.tipo, cuenta.id);
        }
        _ => debug!("No active account for recovery request"),
    }

    Ok(Json(aviso))
}

#[instrument(skip(state, body))]
pub async fn restablecer_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RestablecerPasswordDTO>,
) -> Result<Json<AvisoDTO>, AppError> {
    debug!("Resetting password");
    // 1. Validar el token de recuperación
    // 2. Validar la nueva contraseña
    // 3. Consumir el token y guardar el nuevo hash
    let token = state
        .token
        .find_by_hash(&hash_token(&body.token), PropositoToken::Recuperacion)
        .await?
        .filter(|t| t.es_valido(Utc::now()))
        .ok_or_else(|| {
            warn!("Invalid or expired recovery token");
            AppError::bad_request("Token de recuperación inválido o caducado")
        })?;

    if !password_robusta(&body.password) {
        return Err(AppError::bad_request("Error de validación").with_details(
            "password: mínimo 8 caracteres con al menos una letra y un dígito",
        ));
    }
    let hash = hash_password(&body.password)?;

    if !state.token.consumir(&token.id).await? {
        return Err(AppError::bad_request("Token de recuperación inválido o caducado"));
    }

    match token.tipo_usuario {
        TipoUsuario::Admin => state.admin.set_password(&token.usuario_id, &hash).await?,
        TipoUsuario::Psicologo => state.psicologo.set_password(&token.usuario_id, &hash).await?,
        TipoUsuario::Paciente => state.paciente.set_password(&token.usuario_id, &hash).await?,
    }

    info!("Password reset for {} {}", token.tipo_usuario, token.usuario_id);
    Ok(Json(AvisoDTO::new("Contraseña actualizada")))
}
