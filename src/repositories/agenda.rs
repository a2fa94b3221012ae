//! AgendaRepository - una agenda por psicólogo y semana

use super::Read;
use crate::entities::Agenda;
use chrono::{NaiveDate, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument, warn};

pub struct AgendaRepository {
    connection_pool: SqlitePool,
}

impl AgendaRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    async fn find_semana(
        &self,
        psicologo_id: i64,
        semana_inicio: NaiveDate,
    ) -> Result<Option<Agenda>, Error> {
        sqlx::query_as::<_, Agenda>(
            "SELECT * FROM agendas WHERE psicologo_id = ? AND semana_inicio = ?",
        )
        .bind(psicologo_id)
        .bind(semana_inicio)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Devuelve la agenda de la semana que contiene `fecha`, creándola si falta.
    /// Si dos peticiones compiten, la que pierde el INSERT relee la fila ganadora.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, psicologo_id: i64, fecha: NaiveDate) -> Result<Agenda, Error> {
        let (lunes, domingo) = Agenda::semana_de(fecha)
            .ok_or_else(|| Error::Protocol(format!("Date {} has no complete week", fecha)))?;
        if let Some(agenda) = self.find_semana(psicologo_id, lunes).await? {
            debug!("Agenda for week {} found", lunes);
            return Ok(agenda);
        }

        let insert = sqlx::query_as::<_, Agenda>(
            r#"
            INSERT INTO agendas (psicologo_id, semana_inicio, semana_fin, notas, creado_en)
            VALUES (?, ?, ?, NULL, ?)
            RETURNING *
            "#,
        )
        .bind(psicologo_id)
        .bind(lunes)
        .bind(domingo)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await;

        match insert {
            Ok(agenda) => {
                info!("Agenda {} created for week {}", agenda.id, lunes);
                Ok(agenda)
            }
            Err(Error::Database(db)) if db.is_unique_violation() => {
                warn!("Concurrent agenda creation for week {}, re-reading", lunes);
                self.find_semana(psicologo_id, lunes)
                    .await?
                    .ok_or(Error::RowNotFound)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, notas))]
    pub async fn update_notas(&self, id: &i64, notas: Option<&str>) -> Result<Agenda, Error> {
        sqlx::query_as::<_, Agenda>("UPDATE agendas SET notas = ? WHERE id = ? RETURNING *")
            .bind(notas)
            .bind(id)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<Agenda, i64> for AgendaRepository {
    #[instrument(skip(self), fields(agenda_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Agenda>, Error> {
        debug!("Reading agenda by id");
        sqlx::query_as::<_, Agenda>("SELECT * FROM agendas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
