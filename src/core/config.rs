use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "un secreto de desarrollo";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    /// Clave AES-256 en base64 (32 bytes)
    pub encryption_key: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: String,
    pub frontend_url: String,
    pub upload_dir: String,
    pub max_upload_mb: usize,
    pub reminder_hour_utc: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub app_env: String,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str, error: &str) -> Result<T, String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| error.to_string())
}

impl Config {
    /// Carga la configuración desde las variables de entorno
    /// Llama a dotenv() automáticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let encryption_key = env::var("ENCRYPTION_KEY")
            .map_err(|_| "ENCRYPTION_KEY must be set (base64 of 32 bytes)".to_string())?;

        let reminder_hour_utc: u32 = parse_var(
            "REMINDER_HOUR_UTC",
            "8",
            "Invalid REMINDER_HOUR_UTC: must be a number between 0-23",
        )?;
        if reminder_hour_utc > 23 {
            return Err("Invalid REMINDER_HOUR_UTC: must be a number between 0-23".to_string());
        }

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_expiration_hours: parse_var(
                "JWT_EXPIRATION_HOURS",
                "24",
                "Invalid JWT_EXPIRATION_HOURS: must be a positive number",
            )?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var(
                "SERVER_PORT",
                "3000",
                "Invalid SERVER_PORT: must be a number between 0-65535",
            )?,
            max_connections: parse_var(
                "MAX_DB_CONNECTIONS",
                "5",
                "Invalid MAX_DB_CONNECTIONS: must be a positive number",
            )?,
            connection_lifetime_secs: parse_var(
                "DB_CONNECTION_LIFETIME_SECS",
                "1800",
                "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number",
            )?,
            encryption_key,
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: parse_var("SMTP_PORT", "587", "Invalid SMTP_PORT")?,
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Acompañar <no-reply@acompanar.local>".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_upload_mb: parse_var(
                "MAX_UPLOAD_MB",
                "10",
                "Invalid MAX_UPLOAD_MB: must be a positive number",
            )?,
            reminder_hour_utc,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Registra la configuración en el log (ocultando los secretos)
    pub fn print_info(&self) {
        info!("Server configuration:");
        info!("  Environment: {}", self.app_env);
        info!("  Server address: {}:{}", self.server_host, self.server_port);
        info!("  Database: {}", Self::mask_url(&self.database_url));
        info!("  Max DB connections: {}", self.max_connections);
        info!("  Connection lifetime: {}s", self.connection_lifetime_secs);
        info!(
            "  JWT secret: {}",
            if self.jwt_secret == DEFAULT_JWT_SECRET {
                "USING DEFAULT (INSECURE!)"
            } else {
                "custom secret configured"
            }
        );
        info!(
            "  SMTP: {}",
            self.smtp_host.as_deref().unwrap_or("not configured, local outbox")
        );
        info!("  Upload dir: {} (max {} MB)", self.upload_dir, self.max_upload_mb);
        info!("  Reminder sweep: daily at {:02}:00 UTC", self.reminder_hour_utc);
    }

    /// Enmascara la URL de la base de datos para el log
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        // sqlite://ruta no lleva credenciales
        if url.starts_with("sqlite:") {
            return url.to_string();
        }
        "***".to_string()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_url_hides_credentials() {
        assert_eq!(
            Config::mask_url("postgres://user:pass@db:5432/app"),
            "postgres://***@db:5432/app"
        );
        assert_eq!(Config::mask_url("sqlite://data/app.db"), "sqlite://data/app.db");
        assert_eq!(Config::mask_url("secreto"), "***");
    }
}
