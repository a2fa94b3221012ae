//! Enumeraciones - Tipos enumerados utilizados en las entidades
//!
//! Todas se guardan como TEXT en snake_case y se serializan igual en JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

// ********************* ENUMERACIONES ÚTILES **********************//

/// Tipo de cuenta que realiza una acción o es destinataria de ella
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoUsuario {
    Admin,
    Psicologo,
    Paciente,
}

impl fmt::Display for TipoUsuario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TipoUsuario::Admin => "admin",
            TipoUsuario::Psicologo => "psicologo",
            TipoUsuario::Paciente => "paciente",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RolForo {
    Admin,
    Moderador,
    Miembro,
}

impl RolForo {
    /// Moderador o superior
    pub fn puede_moderar(&self) -> bool {
        matches!(self, RolForo::Admin | RolForo::Moderador)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoCita {
    Programada,
    Confirmada,
    Cancelada,
    Completada,
}

impl EstadoCita {
    /// Una cita cancelada o completada ya no ocupa ni admite cambios de horario
    pub fn es_final(&self) -> bool {
        matches!(self, EstadoCita::Cancelada | EstadoCita::Completada)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Modalidad {
    Presencial,
    EnLinea,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoAsignacion {
    Pendiente,
    EnProgreso,
    Completada,
    Revisada,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoAplicacion {
    Pendiente,
    Completada,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoNotificacion {
    Cita,
    Recordatorio,
    Mensaje,
    Test,
    Actividad,
    Foro,
    Sistema,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccionModeracion {
    Banear,
    Desbanear,
    EliminarMensaje,
    CambiarRol,
    Expulsar,
    CerrarTema,
    AbrirTema,
    EliminarTema,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropositoToken {
    Activacion,
    Recuperacion,
}
