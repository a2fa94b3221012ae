//! DTOs de cuentas - psicólogos y pacientes

use super::agenda::fecha_en_rango;
use crate::entities::{Paciente, Psicologo};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Perfil de psicólogo expuesto al cliente (sin contraseña)
#[derive(Serialize, Deserialize, Debug)]
pub struct PsicologoDTO {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub cedula: String,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub activo: bool,
    pub suspendido: bool,
    pub creado_en: DateTime<Utc>,
}

impl From<Psicologo> for PsicologoDTO {
    fn from(value: Psicologo) -> Self {
        Self {
            id: value.id,
            nombre: value.nombre,
            apellidos: value.apellidos,
            email: value.email,
            cedula: value.cedula,
            telefono: value.telefono,
            especialidad: value.especialidad,
            activo: value.activo,
            suspendido: value.suspendido,
            creado_en: value.creado_en,
        }
    }
}

/// DTO para insertar un psicólogo (contraseña ya hasheada)
#[derive(Debug, Clone)]
pub struct CreatePsicologoDTO {
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub cedula: String,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdatePsicologoDTO {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub apellidos: Option<String>,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    #[validate(length(max = 120))]
    pub especialidad: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PacienteDTO {
    pub id: i64,
    pub psicologo_id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub tipo_duelo: Option<String>,
    pub motivo_consulta: Option<String>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

impl From<Paciente> for PacienteDTO {
    fn from(value: Paciente) -> Self {
        Self {
            id: value.id,
            psicologo_id: value.psicologo_id,
            nombre: value.nombre,
            apellidos: value.apellidos,
            email: value.email,
            telefono: value.telefono,
            fecha_nacimiento: value.fecha_nacimiento,
            tipo_duelo: value.tipo_duelo,
            motivo_consulta: value.motivo_consulta,
            activo: value.activo,
            creado_en: value.creado_en,
        }
    }
}

/// Cuerpo de POST /pacientes
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreatePacienteRequestDTO {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100))]
    pub apellidos: String,
    #[validate(email(message = "Email no válido"))]
    pub email: String,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub tipo_duelo: Option<String>,
    #[validate(length(max = 2000))]
    pub motivo_consulta: Option<String>,
}

/// DTO para insertar un paciente ya asociado a su psicólogo
#[derive(Debug, Clone)]
pub struct CreatePacienteDTO {
    pub psicologo_id: i64,
    pub datos: CreatePacienteRequestDTO,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct UpdatePacienteDTO {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub apellidos: Option<String>,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    #[validate(custom(function = "fecha_en_rango"))]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub tipo_duelo: Option<String>,
    #[validate(length(max = 2000))]
    pub motivo_consulta: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuspensionDTO {
    pub suspendido: bool,
}

/// DTO para insertar un admin (contraseña ya hasheada)
#[derive(Debug, Clone)]
pub struct CreateAdminDTO {
    pub nombre: String,
    pub email: String,
    pub password: String,
}
