//! CitaRepository - citas de la agenda

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateCitaDTO, UpdateCitaDTO};
use crate::entities::{Cita, EstadoCita};
use chrono::{NaiveDate, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct CitaRepository {
    connection_pool: SqlitePool,
}

impl CitaRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_de_agenda(&self, agenda_id: &i64) -> Result<Vec<Cita>, Error> {
        debug!("Listing citas of agenda");
        sqlx::query_as::<_, Cita>(
            "SELECT * FROM citas WHERE agenda_id = ? ORDER BY fecha, hora_inicio",
        )
        .bind(agenda_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Citas que ocupan hueco ese día (todas salvo las canceladas)
    #[instrument(skip(self))]
    pub async fn ocupadas_del_dia(
        &self,
        psicologo_id: &i64,
        fecha: NaiveDate,
    ) -> Result<Vec<Cita>, Error> {
        sqlx::query_as::<_, Cita>(
            r#"
            SELECT * FROM citas
            WHERE psicologo_id = ? AND fecha = ? AND estado <> ?
            ORDER BY hora_inicio
            "#,
        )
        .bind(psicologo_id)
        .bind(fecha)
        .bind(EstadoCita::Cancelada)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_rango(
        &self,
        psicologo_id: &i64,
        desde: NaiveDate,
        hasta: NaiveDate,
        paciente_id: Option<i64>,
    ) -> Result<Vec<Cita>, Error> {
        debug!("Listing citas in range");
        sqlx::query_as::<_, Cita>(
            r#"
            SELECT * FROM citas
            WHERE psicologo_id = ?1 AND fecha >= ?2 AND fecha <= ?3
              AND (?4 IS NULL OR paciente_id = ?4)
            ORDER BY fecha, hora_inicio
            "#,
        )
        .bind(psicologo_id)
        .bind(desde)
        .bind(hasta)
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Próximas citas no canceladas de un paciente a partir de `desde`
    #[instrument(skip(self))]
    pub async fn proximas_de_paciente(
        &self,
        paciente_id: &i64,
        desde: NaiveDate,
    ) -> Result<Vec<Cita>, Error> {
        sqlx::query_as::<_, Cita>(
            r#"
            SELECT * FROM citas
            WHERE paciente_id = ? AND fecha >= ? AND estado <> ?
            ORDER BY fecha, hora_inicio
            "#,
        )
        .bind(paciente_id)
        .bind(desde)
        .bind(EstadoCita::Cancelada)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Citas de `fecha` programadas o confirmadas a las que aún no se envió recordatorio
    #[instrument(skip(self))]
    pub async fn pendientes_de_recordatorio(&self, fecha: NaiveDate) -> Result<Vec<Cita>, Error> {
        sqlx::query_as::<_, Cita>(
            r#"
            SELECT * FROM citas
            WHERE fecha = ? AND estado IN (?, ?) AND recordatorio_enviado = 0
            ORDER BY hora_inicio
            "#,
        )
        .bind(fecha)
        .bind(EstadoCita::Programada)
        .bind(EstadoCita::Confirmada)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn marcar_recordatorio(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("UPDATE citas SET recordatorio_enviado = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    /// programada → confirmada; `false` si la cita no estaba programada
    #[instrument(skip(self))]
    pub async fn confirmar(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE citas SET estado = ? WHERE id = ? AND estado = ?")
            .bind(EstadoCita::Confirmada)
            .bind(id)
            .bind(EstadoCita::Programada)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

impl Create<Cita, CreateCitaDTO> for CitaRepository {
    #[instrument(skip(self, data), fields(psicologo_id = %data.psicologo_id, fecha = %data.fecha))]
    async fn create(&self, data: &CreateCitaDTO) -> Result<Cita, Error> {
        debug!("Creating cita");
        let cita = sqlx::query_as::<_, Cita>(
            r#"
            INSERT INTO citas
                (agenda_id, psicologo_id, paciente_id, fecha, hora_inicio, hora_fin,
                 modalidad, estado, motivo, recordatorio_enviado, creado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.agenda_id)
        .bind(data.psicologo_id)
        .bind(data.paciente_id)
        .bind(data.fecha)
        .bind(data.hora_inicio)
        .bind(data.hora_fin)
        .bind(data.modalidad)
        .bind(EstadoCita::Programada)
        .bind(&data.motivo)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Cita created with id {}", cita.id);
        Ok(cita)
    }
}

impl Read<Cita, i64> for CitaRepository {
    #[instrument(skip(self), fields(cita_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Cita>, Error> {
        debug!("Reading cita by id");
        sqlx::query_as::<_, Cita>("SELECT * FROM citas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Cita, UpdateCitaDTO, i64> for CitaRepository {
    #[instrument(skip(self, data), fields(cita_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateCitaDTO) -> Result<Cita, Error> {
        debug!("Updating cita");
        // reprogramar obliga a enviar de nuevo el recordatorio
        sqlx::query_as::<_, Cita>(
            r#"
            UPDATE citas SET
                agenda_id = COALESCE(?, agenda_id),
                fecha = COALESCE(?, fecha),
                hora_inicio = COALESCE(?, hora_inicio),
                hora_fin = COALESCE(?, hora_fin),
                modalidad = COALESCE(?, modalidad),
                estado = COALESCE(?, estado),
                motivo = COALESCE(?, motivo),
                recordatorio_enviado = CASE WHEN ? THEN 0 ELSE recordatorio_enviado END
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(data.agenda_id)
        .bind(data.fecha)
        .bind(data.hora_inicio)
        .bind(data.hora_fin)
        .bind(data.modalidad)
        .bind(data.estado)
        .bind(&data.motivo)
        .bind(data.reprograma())
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Delete<i64> for CitaRepository {
    #[instrument(skip(self), fields(cita_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        debug!("Deleting cita");
        sqlx::query("DELETE FROM citas WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Cita {} deleted", id);
        Ok(())
    }
}
