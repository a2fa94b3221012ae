//! Services module - Handlers HTTP agrupados por funcionalidad
//!
//! Cada submódulo expone los handlers de una parte del API; el router los
//! referencia por ruta de módulo (`services::agenda::crear_cita`).

pub mod actividad;
pub mod admin;
pub mod agenda;
pub mod auth;
pub mod chat;
pub(crate) mod comun;
pub mod foro;
pub mod moderacion;
pub mod modulo;
pub mod nota;
pub mod notificacion;
pub mod paciente;
pub mod psicologo;
pub mod reporte;
pub mod soporte;
pub mod test;

pub use admin::bootstrap_admin;

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
