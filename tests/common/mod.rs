#![allow(dead_code)]

use acompanar::core::{AppState, Config, Mailer, encode_jwt};
use acompanar::entities::TipoUsuario;
pub use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const JWT_SECRET: &str = "unsecretodepruebasquehayquecambiarsiempre";
pub const PASSWORD: &str = "Password123";

/// Config de test: mailer local, clave de cifrado fija, subidas en un directorio temporal
pub fn test_config() -> Config {
    let upload_dir = std::env::temp_dir().join(format!("acompanar-test-{}", rand::random::<u64>()));
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 24,
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        max_connections: 5,
        connection_lifetime_secs: 1800,
        encryption_key: "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2s=".to_string(),
        smtp_host: None,
        smtp_port: 587,
        smtp_user: None,
        smtp_password: None,
        mail_from: "no-reply@acompanar.local".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        upload_dir: upload_dir.to_string_lossy().to_string(),
        max_upload_mb: 1,
        reminder_hour_utc: 8,
        admin_email: None,
        admin_password: None,
        app_env: "test".to_string(),
    }
}

/// Crea un AppState para los tests
///
/// # Arguments
/// * `pool` - Connection pool SQLite creado por `#[sqlx::test]`
///
/// # Returns
/// Arc<AppState> con mailer local y JWT secret de test
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    let config = test_config();
    std::fs::create_dir_all(&config.upload_dir).expect("Failed to create upload dir");
    Arc::new(AppState::new(pool, &config, Mailer::local()).expect("Failed to create state"))
}

/// Crea un TestServer para los tests
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = acompanar::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT válido 24 horas para el usuario indicado
pub fn create_test_jwt(id: i64, tipo: TipoUsuario, email: &str) -> String {
    encode_jwt(id, tipo, email.to_string(), JWT_SECRET, 24).expect("Failed to create JWT token")
}

/// Cabecera Authorization lista para `add_header`
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// Cuentas de fixtures/usuarios.sql
pub fn token_admin() -> String {
    create_test_jwt(1, TipoUsuario::Admin, "admin@acompanar.test")
}

pub fn token_ana() -> String {
    create_test_jwt(1, TipoUsuario::Psicologo, "ana@acompanar.test")
}

pub fn token_bruno() -> String {
    create_test_jwt(2, TipoUsuario::Psicologo, "bruno@acompanar.test")
}

pub fn token_lucia() -> String {
    create_test_jwt(1, TipoUsuario::Paciente, "lucia@acompanar.test")
}

pub fn token_mario() -> String {
    create_test_jwt(2, TipoUsuario::Paciente, "mario@acompanar.test")
}

pub fn token_nora() -> String {
    create_test_jwt(3, TipoUsuario::Paciente, "nora@acompanar.test")
}

/// Extrae el token del último enlace enviado a `para`
pub fn token_del_correo(state: &AppState, para: &str) -> String {
    let correo = state
        .mailer
        .enviados()
        .into_iter()
        .rev()
        .find(|c| c.para == para)
        .expect("No mail sent to address");
    let inicio = correo.cuerpo.find("token=").expect("No token in mail") + "token=".len();
    correo.cuerpo[inicio..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
