//! Jobs module - tareas periódicas en segundo plano

pub mod recordatorios;

pub use recordatorios::{barrido_diario, start_recordatorios};
