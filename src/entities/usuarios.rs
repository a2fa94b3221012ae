//! Cuentas de usuario - admins, psicólogos y pacientes

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Psicologo {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub cedula: String,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub password: String,
    pub activo: bool,
    pub suspendido: bool,
    pub creado_en: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Paciente {
    pub id: i64,
    pub psicologo_id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub tipo_duelo: Option<String>,
    pub motivo_consulta: Option<String>,
    // vacía hasta que el paciente activa su cuenta
    pub password: String,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

/// Verifica `candidata` contra el hash bcrypt guardado.
/// Un hash vacío (cuenta sin activar) nunca coincide.
pub fn verificar_password(candidata: &str, hash_guardado: &str) -> bool {
    if hash_guardado.is_empty() {
        return false;
    }
    verify(candidata, hash_guardado).unwrap_or(false)
}

/// Hash a password using bcrypt with default cost
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

impl Psicologo {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombre, self.apellidos)
    }
}

impl Paciente {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombre, self.apellidos)
    }
}
