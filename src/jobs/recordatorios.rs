//! Barrido diario de recordatorios de citas
//!
//! Una vez al día, a `REMINDER_HOUR_UTC`, se avisa a los pacientes de sus
//! citas del día siguiente (correo + notificación) y se cierran los baneos de
//! foro que ya expiraron.

use crate::core::{AppError, AppState, Correo};
use crate::dtos::CreateNotificacionDTO;
use crate::entities::{TipoNotificacion, TipoUsuario};
use crate::repositories::Read;
use crate::services::comun::{enviar_correo, notificar};
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use std::sync::Arc;
use tokio::time;
use tracing::{debug, error, info};

/// Resultado de un barrido
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Barrido {
    pub recordatorios: u64,
    pub baneos_cerrados: u64,
}

/// Tiempo hasta la próxima ocurrencia de `hora` (UTC) estrictamente posterior a `ahora`
fn hasta_proxima(ahora: DateTime<Utc>, hora: u32) -> Duration {
    let objetivo = NaiveTime::from_hms_opt(hora, 0, 0).unwrap_or(NaiveTime::MIN);
    let hoy = ahora.date_naive().and_time(objetivo).and_utc();
    let proxima = if hoy > ahora {
        hoy
    } else {
        hoy + Duration::days(1)
    };
    proxima - ahora
}

/// Ejecuta un barrido completo para la fecha de `ahora`
pub async fn barrido_diario(state: &AppState, ahora: DateTime<Utc>) -> Result<Barrido, AppError> {
    let manana = ahora.date_naive() + Duration::days(1);
    let citas = state.cita.pendientes_de_recordatorio(manana).await?;
    debug!("{} citas need a reminder for {}", citas.len(), manana);

    let mut resultado = Barrido::default();
    for cita in citas {
        let Some(paciente) = state.paciente.read(&cita.paciente_id).await? else {
            continue;
        };

        enviar_correo(
            state,
            Correo::recordatorio_cita(
                &paciente.email,
                &paciente.nombre,
                cita.fecha,
                cita.hora_inicio,
            ),
        )
        .await;
        notificar(
            state,
            CreateNotificacionDTO::new(
                TipoUsuario::Paciente,
                paciente.id,
                TipoNotificacion::Recordatorio,
                "Recordatorio de cita",
                format!(
                    "Mañana tienes cita a las {}",
                    cita.hora_inicio.format("%H:%M")
                ),
            ),
        )
        .await;

        state.cita.marcar_recordatorio(&cita.id).await?;
        resultado.recordatorios += 1;
    }

    resultado.baneos_cerrados = state.baneo.desactivar_expirados(ahora).await?;
    Ok(resultado)
}

/// Task en segundo plano: duerme hasta la hora configurada y barre una vez al día
///
/// ```rust,no_run
/// # use acompanar::{core::AppState, jobs::start_recordatorios};
/// # use std::sync::Arc;
/// # fn lanzar(state: Arc<AppState>) {
/// tokio::spawn(start_recordatorios(state, 8));
/// # }
/// ```
pub async fn start_recordatorios(state: Arc<AppState>, hora_utc: u32) {
    info!("Starting daily reminder sweep at {:02}:00 UTC", hora_utc);

    let espera = hasta_proxima(Utc::now(), hora_utc)
        .to_std()
        .unwrap_or_default();
    time::sleep(espera).await;

    let mut interval = time::interval(std::time::Duration::from_secs(24 * 60 * 60));
    loop {
        // el primer tick es inmediato
        interval.tick().await;
        let ahora = Utc::now();
        match barrido_diario(&state, ahora).await {
            Ok(barrido) => info!(
                "Daily sweep at {:02}:{:02}: {} reminders sent, {} bans closed",
                ahora.hour(),
                ahora.minute(),
                barrido.recordatorios,
                barrido.baneos_cerrados
            ),
            Err(e) => error!("Daily sweep failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hasta_proxima_mismo_dia() {
        let ahora = Utc.with_ymd_and_hms(2025, 3, 10, 6, 30, 0).unwrap();
        assert_eq!(hasta_proxima(ahora, 8), Duration::minutes(90));
    }

    #[test]
    fn test_hasta_proxima_dia_siguiente() {
        let ahora = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(hasta_proxima(ahora, 8), Duration::hours(24));
        let ahora = Utc.with_ymd_and_hms(2025, 3, 10, 23, 0, 0).unwrap();
        assert_eq!(hasta_proxima(ahora, 8), Duration::hours(9));
    }
}
