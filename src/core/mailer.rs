//! Envío de correo saliente
//!
//! Con `SMTP_HOST` configurado se usa un transporte SMTP asíncrono de `lettre`.
//! Sin él, los correos se registran en el log y se guardan en un buzón en
//! memoria (entorno de desarrollo y tests).

use crate::core::config::Config;
use chrono::{NaiveDate, NaiveTime};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Correos que conserva el buzón local; los más antiguos se descartan
pub const CAPACIDAD_BUZON: usize = 200;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correo {
    pub para: String,
    pub asunto: String,
    pub cuerpo: String,
}

impl Correo {
    pub fn activacion(para: &str, nombre: &str, enlace: &str) -> Self {
        Self {
            para: para.to_string(),
            asunto: "Activa tu cuenta".to_string(),
            cuerpo: format!(
                "Hola {nombre},\n\nPara activar tu cuenta visita el siguiente enlace:\n{enlace}\n\nEl enlace caduca en 48 horas."
            ),
        }
    }

    pub fn recuperacion(para: &str, nombre: &str, enlace: &str) -> Self {
        Self {
            para: para.to_string(),
            asunto: "Recupera tu contraseña".to_string(),
            cuerpo: format!(
                "Hola {nombre},\n\nRecibimos una solicitud para restablecer tu contraseña:\n{enlace}\n\nSi no fuiste tú, ignora este mensaje. El enlace caduca en 1 hora."
            ),
        }
    }

    pub fn nueva_cita(para: &str, nombre: &str, fecha: NaiveDate, hora: NaiveTime) -> Self {
        Self {
            para: para.to_string(),
            asunto: "Nueva cita programada".to_string(),
            cuerpo: format!(
                "Hola {nombre},\n\nTu psicólogo programó una cita para el {} a las {}.",
                fecha.format("%d/%m/%Y"),
                hora.format("%H:%M")
            ),
        }
    }

    pub fn recordatorio_cita(para: &str, nombre: &str, fecha: NaiveDate, hora: NaiveTime) -> Self {
        Self {
            para: para.to_string(),
            asunto: "Recordatorio de cita".to_string(),
            cuerpo: format!(
                "Hola {nombre},\n\nTe recordamos tu cita de mañana {} a las {}.",
                fecha.format("%d/%m/%Y"),
                hora.format("%H:%M")
            ),
        }
    }
}

#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        remitente: Mailbox,
    },
    Local {
        buzon: Arc<Mutex<VecDeque<Correo>>>,
    },
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(Self::local());
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?.port(config.smtp_port);
        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self::Smtp {
            transport: builder.build(),
            remitente: config.mail_from.parse()?,
        })
    }

    pub fn local() -> Self {
        Self::Local {
            buzon: Arc::new(Mutex::new(VecDeque::with_capacity(CAPACIDAD_BUZON))),
        }
    }

    /// Correos retenidos por el mailer local, del más antiguo al más reciente (vacío con SMTP)
    pub fn enviados(&self) -> Vec<Correo> {
        match self {
            Self::Local { buzon } => buzon
                .lock()
                .map(|b| b.iter().cloned().collect())
                .unwrap_or_default(),
            Self::Smtp { .. } => Vec::new(),
        }
    }

    #[instrument(skip(self, correo), fields(para = %correo.para, asunto = %correo.asunto))]
    pub async fn enviar(&self, correo: Correo) -> Result<(), MailError> {
        match self {
            Self::Smtp {
                transport,
                remitente,
            } => {
                debug!("Sending mail through SMTP");
                let mensaje = Message::builder()
                    .from(remitente.clone())
                    .to(correo.para.parse()?)
                    .subject(correo.asunto)
                    .header(ContentType::TEXT_PLAIN)
                    .body(correo.cuerpo)?;
                transport.send(mensaje).await?;
                info!("Mail sent");
            }
            Self::Local { buzon } => {
                info!("SMTP not configured, mail kept in local outbox");
                if let Ok(mut b) = buzon.lock() {
                    if b.len() >= CAPACIDAD_BUZON {
                        b.pop_front();
                    }
                    b.push_back(correo);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mailer_local_guarda_correos() {
        let mailer = Mailer::local();
        mailer
            .enviar(Correo::activacion("ana@example.com", "Ana", "http://x/activar?t=1"))
            .await
            .unwrap();
        let enviados = mailer.enviados();
        assert_eq!(enviados.len(), 1);
        assert_eq!(enviados[0].para, "ana@example.com");
        assert!(enviados[0].cuerpo.contains("http://x/activar?t=1"));
    }

    #[tokio::test]
    async fn test_mailer_local_descarta_los_mas_antiguos() {
        let mailer = Mailer::local();
        for i in 0..CAPACIDAD_BUZON + 5 {
            let enlace = format!("http://x/activar?t={}", i);
            mailer
                .enviar(Correo::activacion("ana@example.com", "Ana", &enlace))
                .await
                .unwrap();
        }
        let enviados = mailer.enviados();
        assert_eq!(enviados.len(), CAPACIDAD_BUZON);
        assert!(enviados[0].cuerpo.contains("t=5\n"));
        let ultimo = format!("t={}\n", CAPACIDAD_BUZON + 4);
        assert!(enviados[CAPACIDAD_BUZON - 1].cuerpo.contains(&ultimo));
    }
}
