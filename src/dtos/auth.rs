//! Auth DTOs - registro, login, activación y recuperación

use crate::entities::TipoUsuario;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegistroPsicologoDTO {
    #[validate(length(min = 1, max = 100, message = "El nombre debe tener entre 1 y 100 caracteres"))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "Los apellidos deben tener entre 1 y 100 caracteres"))]
    pub apellidos: String,
    #[validate(email(message = "Email no válido"))]
    pub email: String,
    pub cedula: String,
    #[validate(length(max = 20, message = "Teléfono demasiado largo"))]
    pub telefono: Option<String>,
    #[validate(length(max = 120, message = "Especialidad demasiado larga"))]
    pub especialidad: Option<String>,
    #[validate(length(min = 8, max = 72, message = "La contraseña debe tener entre 8 y 72 caracteres"))]
    pub password: String,
}

/// DTO para el login (solo email y contraseña)
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UsuarioSesionDTO {
    pub id: i64,
    pub nombre: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponseDTO {
    pub token: String,
    pub tipo: TipoUsuario,
    pub usuario: UsuarioSesionDTO,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActivarCuentaDTO {
    pub token: String,
    /// Obligatoria para pacientes, que aún no tienen contraseña
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RecuperarPasswordDTO {
    #[validate(email(message = "Email no válido"))]
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RestablecerPasswordDTO {
    pub token: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CambiarPasswordDTO {
    pub actual: String,
    pub nueva: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AvisoDTO {
    pub mensaje: String,
}

impl AvisoDTO {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
        }
    }
}

lazy_static! {
    static ref CEDULA_RE: Regex = Regex::new(r"^[0-9]{7,8}$").expect("cedula regex");
    static ref LETRA_RE: Regex = Regex::new(r"[A-Za-z]").expect("letter regex");
    static ref DIGITO_RE: Regex = Regex::new(r"[0-9]").expect("digit regex");
}

/// Cédula profesional: 7 u 8 dígitos
pub fn cedula_valida(cedula: &str) -> bool {
    CEDULA_RE.is_match(cedula)
}

/// Al menos 8 caracteres con una letra y un dígito
pub fn password_robusta(password: &str) -> bool {
    password.chars().count() >= 8
        && password.len() <= 72
        && LETRA_RE.is_match(password)
        && DIGITO_RE.is_match(password)
}
