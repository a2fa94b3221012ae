//! NotaRepository - notas clínicas; `contenido` llega y sale cifrado

use super::{Create, Delete, Read};
use crate::dtos::CreateNotaDTO;
use crate::entities::Nota;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct NotaRepository {
    connection_pool: SqlitePool,
}

impl NotaRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_de_paciente(&self, paciente_id: &i64) -> Result<Vec<Nota>, Error> {
        sqlx::query_as::<_, Nota>(
            "SELECT * FROM notas WHERE paciente_id = ? ORDER BY creado_en DESC",
        )
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// `contenido` ya cifrado
    #[instrument(skip(self, titulo, contenido))]
    pub async fn actualizar(
        &self,
        id: &i64,
        titulo: Option<&str>,
        contenido: Option<&str>,
    ) -> Result<Nota, Error> {
        sqlx::query_as::<_, Nota>(
            r#"
            UPDATE notas SET
                titulo = COALESCE(?, titulo),
                contenido = COALESCE(?, contenido),
                actualizado_en = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(titulo)
        .bind(contenido)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Create<Nota, CreateNotaDTO> for NotaRepository {
    #[instrument(skip(self, data), fields(paciente_id = %data.paciente_id))]
    async fn create(&self, data: &CreateNotaDTO) -> Result<Nota, Error> {
        debug!("Creating clinical note");
        let ahora = Utc::now();
        let nota = sqlx::query_as::<_, Nota>(
            r#"
            INSERT INTO notas (paciente_id, psicologo_id, cita_id, titulo, contenido, creado_en, actualizado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.paciente_id)
        .bind(data.psicologo_id)
        .bind(data.cita_id)
        .bind(&data.titulo)
        .bind(&data.contenido)
        .bind(ahora)
        .bind(ahora)
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Note created with id {}", nota.id);
        Ok(nota)
    }
}

impl Read<Nota, i64> for NotaRepository {
    #[instrument(skip(self), fields(nota_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Nota>, Error> {
        sqlx::query_as::<_, Nota>("SELECT * FROM notas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for NotaRepository {
    #[instrument(skip(self), fields(nota_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM notas WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Note {} deleted", id);
        Ok(())
    }
}
