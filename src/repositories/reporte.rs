//! ReporteRepository - consultas de agregación para reportes y estadísticas

use crate::dtos::{ConteoEstadoDTO, EstadisticasDTO, ProgresoModuloDTO, ResumenDTO};
use crate::entities::{EstadoAplicacion, EstadoAsignacion, EstadoCita, TipoUsuario};
use chrono::NaiveDate;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct ReporteRepository {
    connection_pool: SqlitePool,
}

impl ReporteRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn citas_por_estado(&self, paciente_id: &i64) -> Result<Vec<ConteoEstadoDTO>, Error> {
        sqlx::query_as::<_, ConteoEstadoDTO>(
            "SELECT estado, COUNT(*) AS total FROM citas WHERE paciente_id = ? GROUP BY estado ORDER BY estado",
        )
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn actividades_por_estado(
        &self,
        paciente_id: &i64,
    ) -> Result<Vec<ConteoEstadoDTO>, Error> {
        sqlx::query_as::<_, ConteoEstadoDTO>(
            r#"
            SELECT estado, COUNT(*) AS total FROM actividades_asignadas
            WHERE paciente_id = ? GROUP BY estado ORDER BY estado
            "#,
        )
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Avance del paciente en cada módulo: actividades y tests asignados frente a terminados
    #[instrument(skip(self))]
    pub async fn progreso_modulos(&self, paciente_id: &i64) -> Result<Vec<ProgresoModuloDTO>, Error> {
        debug!("Computing per-module progress");
        sqlx::query_as::<_, ProgresoModuloDTO>(
            r#"
            SELECT
                m.id AS modulo_id,
                m.titulo AS modulo_titulo,
                (SELECT COUNT(*) FROM actividades_asignadas a
                 INNER JOIN actividades act ON act.id = a.actividad_id
                 WHERE a.paciente_id = ?1 AND act.modulo_id = m.id) AS actividades_asignadas,
                (SELECT COUNT(*) FROM actividades_asignadas a
                 INNER JOIN actividades act ON act.id = a.actividad_id
                 WHERE a.paciente_id = ?1 AND act.modulo_id = m.id
                   AND a.estado IN (?2, ?3)) AS actividades_completadas,
                (SELECT COUNT(*) FROM aplicaciones_test ap
                 INNER JOIN tests t ON t.id = ap.test_id
                 WHERE ap.paciente_id = ?1 AND t.modulo_id = m.id) AS tests_asignados,
                (SELECT COUNT(*) FROM aplicaciones_test ap
                 INNER JOIN tests t ON t.id = ap.test_id
                 WHERE ap.paciente_id = ?1 AND t.modulo_id = m.id
                   AND ap.estado = ?4) AS tests_completados
            FROM modulos m
            ORDER BY m.orden, m.id
            "#,
        )
        .bind(paciente_id)
        .bind(EstadoAsignacion::Completada)
        .bind(EstadoAsignacion::Revisada)
        .bind(EstadoAplicacion::Completada)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Resumen del psicólogo; `desde`/`hasta` delimitan el mes en curso
    #[instrument(skip(self))]
    pub async fn resumen(
        &self,
        psicologo_id: &i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> Result<ResumenDTO, Error> {
        debug!("Computing psicologo summary");
        let (pacientes, citas_mes, tests_pendientes, actividades_pendientes, mensajes_no_leidos): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM pacientes WHERE psicologo_id = ?1),
                (SELECT COUNT(*) FROM citas
                 WHERE psicologo_id = ?1 AND fecha >= ?2 AND fecha <= ?3 AND estado <> ?4),
                (SELECT COUNT(*) FROM aplicaciones_test WHERE psicologo_id = ?1 AND estado = ?5),
                (SELECT COUNT(*) FROM actividades_asignadas
                 WHERE psicologo_id = ?1 AND estado IN (?6, ?7)),
                (SELECT COUNT(*) FROM mensajes m
                 INNER JOIN chats c ON c.id = m.chat_id
                 WHERE c.psicologo_id = ?1 AND m.remitente_tipo = ?8 AND m.leido = 0)
            "#,
        )
        .bind(psicologo_id)
        .bind(desde)
        .bind(hasta)
        .bind(EstadoCita::Cancelada)
        .bind(EstadoAplicacion::Pendiente)
        .bind(EstadoAsignacion::Pendiente)
        .bind(EstadoAsignacion::EnProgreso)
        .bind(TipoUsuario::Paciente)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(ResumenDTO {
            pacientes,
            citas_mes,
            tests_pendientes,
            actividades_pendientes,
            mensajes_no_leidos,
        })
    }

    /// Conteos globales para el panel de administración
    #[instrument(skip(self))]
    pub async fn estadisticas(&self) -> Result<EstadisticasDTO, Error> {
        debug!("Computing platform statistics");
        let fila: (i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM psicologos),
                (SELECT COUNT(*) FROM psicologos WHERE activo = 1),
                (SELECT COUNT(*) FROM psicologos WHERE suspendido = 1),
                (SELECT COUNT(*) FROM pacientes),
                (SELECT COUNT(*) FROM citas),
                (SELECT COUNT(*) FROM foros),
                (SELECT COUNT(*) FROM foro_baneos WHERE activo = 1),
                (SELECT COUNT(*) FROM aplicaciones_test WHERE estado = ?)
            "#,
        )
        .bind(EstadoAplicacion::Completada)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(EstadisticasDTO {
            psicologos: fila.0,
            psicologos_activos: fila.1,
            psicologos_suspendidos: fila.2,
            pacientes: fila.3,
            citas: fila.4,
            foros: fila.5,
            baneos_activos: fila.6,
            tests_completados: fila.7,
        })
    }
}
