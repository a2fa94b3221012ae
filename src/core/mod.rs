//! Core Module - Componentes de infraestructura de la aplicación
//!
//! Este módulo contiene los componentes "core":
//! - Autenticación, JWT y middlewares de pertenencia
//! - Configuración
//! - Gestión de errores
//! - Cifrado de campos y correo saliente
//! - Estado de la aplicación

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod mailer;
pub mod state;
pub mod tokens;

// Re-exports para facilitar el import
pub use auth::{
    Actor, Claims, ContextoForo, authentication_middleware, baneo_vigente,
    chat_membership_middleware, contexto_foro, decode_jwt, encode_jwt,
    foro_participante_middleware, require_rol_foro, require_tipo,
};
pub use config::Config;
pub use crypto::Cifrador;
pub use error::AppError;
pub use mailer::{Correo, Mailer};
pub use state::AppState;
