//! MensajeRepository - mensajes cifrados de los chats psicólogo/paciente

use super::Create;
use crate::dtos::CreateMensajeDTO;
use crate::entities::{Mensaje, TipoUsuario};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct MensajeRepository {
    connection_pool: SqlitePool,
}

impl MensajeRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Los `limite` mensajes más recientes anteriores a `antes_de`, en orden cronológico
    #[instrument(skip(self))]
    pub async fn list_pagina(
        &self,
        chat_id: &i64,
        antes_de: Option<DateTime<Utc>>,
        limite: i64,
    ) -> Result<Vec<Mensaje>, Error> {
        debug!("Listing messages page");
        sqlx::query_as::<_, Mensaje>(
            r#"
            SELECT * FROM (
                SELECT * FROM mensajes
                WHERE chat_id = ?1 AND (?2 IS NULL OR creado_en < ?2)
                ORDER BY creado_en DESC, id DESC
                LIMIT ?3
            ) ORDER BY creado_en, id
            "#,
        )
        .bind(chat_id)
        .bind(antes_de)
        .bind(limite)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Marca como leídos los mensajes que envió la otra parte
    #[instrument(skip(self))]
    pub async fn marcar_leidos(&self, chat_id: &i64, lector: TipoUsuario) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE mensajes SET leido = 1 WHERE chat_id = ? AND remitente_tipo <> ? AND leido = 0",
        )
        .bind(chat_id)
        .bind(lector)
        .execute(&self.connection_pool)
        .await?;
        info!("{} messages marked as read", result.rows_affected());
        Ok(result.rows_affected())
    }
}

impl Create<Mensaje, CreateMensajeDTO> for MensajeRepository {
    #[instrument(skip(self, data), fields(chat_id = %data.chat_id))]
    async fn create(&self, data: &CreateMensajeDTO) -> Result<Mensaje, Error> {
        debug!("Creating message");
        let mensaje = sqlx::query_as::<_, Mensaje>(
            r#"
            INSERT INTO mensajes (chat_id, remitente_tipo, remitente_id, contenido, leido, creado_en)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.chat_id)
        .bind(data.remitente_tipo)
        .bind(data.remitente_id)
        .bind(&data.contenido)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Message created with id {}", mensaje.id);
        Ok(mensaje)
    }
}
