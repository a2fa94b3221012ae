//! AplicacionRepository - tests asignados a pacientes y sus respuestas

use super::{Create, Read};
use crate::dtos::{AplicacionResumenDTO, CreateAplicacionDTO, RespuestaDTO};
use crate::entities::{AplicacionTest, EstadoAplicacion, ResultadoTest};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument, warn};

pub struct AplicacionRepository {
    connection_pool: SqlitePool,
}

impl AplicacionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn existe_pendiente(&self, test_id: &i64, paciente_id: &i64) -> Result<bool, Error> {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM aplicaciones_test WHERE test_id = ? AND paciente_id = ? AND estado = ?",
        )
        .bind(test_id)
        .bind(paciente_id)
        .bind(EstadoAplicacion::Pendiente)
        .fetch_optional(&self.connection_pool)
        .await?;
        Ok(id.is_some())
    }

    #[instrument(skip(self))]
    pub async fn list_de_paciente(
        &self,
        paciente_id: &i64,
    ) -> Result<Vec<AplicacionResumenDTO>, Error> {
        sqlx::query_as::<_, AplicacionResumenDTO>(
            r#"
            SELECT a.*, t.nombre AS test_nombre
            FROM aplicaciones_test a
            INNER JOIN tests t ON t.id = a.test_id
            WHERE a.paciente_id = ?
            ORDER BY a.asignada_en DESC
            "#,
        )
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn resultados(&self, aplicacion_id: &i64) -> Result<Vec<ResultadoTest>, Error> {
        sqlx::query_as::<_, ResultadoTest>(
            "SELECT * FROM resultados_test WHERE aplicacion_id = ? ORDER BY pregunta_id",
        )
        .bind(aplicacion_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Guarda todas las respuestas y cierra la aplicación en una sola transacción.
    /// `None` si la aplicación ya no estaba pendiente.
    #[instrument(skip(self, respuestas), fields(respuestas = respuestas.len()))]
    pub async fn responder(
        &self,
        id: &i64,
        respuestas: &[RespuestaDTO],
        puntaje_total: i64,
    ) -> Result<Option<AplicacionTest>, Error> {
        debug!("Storing test answers");
        let mut tx = self.connection_pool.begin().await?;

        let aplicacion = sqlx::query_as::<_, AplicacionTest>(
            r#"
            UPDATE aplicaciones_test SET estado = ?, puntaje_total = ?, completada_en = ?
            WHERE id = ? AND estado = ?
            RETURNING *
            "#,
        )
        .bind(EstadoAplicacion::Completada)
        .bind(puntaje_total)
        .bind(Utc::now())
        .bind(id)
        .bind(EstadoAplicacion::Pendiente)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(aplicacion) = aplicacion else {
            warn!("Application {} was not pending", id);
            tx.rollback().await?;
            return Ok(None);
        };

        for respuesta in respuestas {
            sqlx::query("INSERT INTO resultados_test (aplicacion_id, pregunta_id, valor) VALUES (?, ?, ?)")
                .bind(id)
                .bind(respuesta.pregunta_id)
                .bind(respuesta.valor)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Application {} completed with score {}", id, puntaje_total);
        Ok(Some(aplicacion))
    }
}

impl Create<AplicacionTest, CreateAplicacionDTO> for AplicacionRepository {
    #[instrument(skip(self, data), fields(test_id = %data.test_id, paciente_id = %data.paciente_id))]
    async fn create(&self, data: &CreateAplicacionDTO) -> Result<AplicacionTest, Error> {
        debug!("Assigning test");
        let aplicacion = sqlx::query_as::<_, AplicacionTest>(
            r#"
            INSERT INTO aplicaciones_test (test_id, paciente_id, psicologo_id, estado, asignada_en)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.test_id)
        .bind(data.paciente_id)
        .bind(data.psicologo_id)
        .bind(EstadoAplicacion::Pendiente)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Application created with id {}", aplicacion.id);
        Ok(aplicacion)
    }
}

impl Read<AplicacionTest, i64> for AplicacionRepository {
    #[instrument(skip(self), fields(aplicacion_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<AplicacionTest>, Error> {
        sqlx::query_as::<_, AplicacionTest>("SELECT * FROM aplicaciones_test WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
