//! SoporteRepository - hilo de soporte de cada psicólogo con los admins

use super::Read;
use crate::dtos::{ChatSoporteDTO, CreateMensajeDTO};
use crate::entities::{ChatSoporte, Mensaje, TipoUsuario};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument, warn};

pub struct SoporteRepository {
    connection_pool: SqlitePool,
}

impl SoporteRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    async fn find_de_psicologo(&self, psicologo_id: i64) -> Result<Option<ChatSoporte>, Error> {
        sqlx::query_as::<_, ChatSoporte>("SELECT * FROM chats_soporte WHERE psicologo_id = ?")
            .bind(psicologo_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// El hilo se crea la primera vez que el psicólogo lo abre
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, psicologo_id: i64) -> Result<ChatSoporte, Error> {
        if let Some(chat) = self.find_de_psicologo(psicologo_id).await? {
            return Ok(chat);
        }

        let insert = sqlx::query_as::<_, ChatSoporte>(
            "INSERT INTO chats_soporte (psicologo_id, creado_en) VALUES (?, ?) RETURNING *",
        )
        .bind(psicologo_id)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await;

        match insert {
            Ok(chat) => {
                info!("Support thread {} created", chat.id);
                Ok(chat)
            }
            Err(Error::Database(db)) if db.is_unique_violation() => {
                warn!("Concurrent support thread creation, re-reading");
                self.find_de_psicologo(psicologo_id)
                    .await?
                    .ok_or(Error::RowNotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Todos los hilos, con los mensajes de psicólogos aún sin leer por los admins
    #[instrument(skip(self))]
    pub async fn list_todos(&self) -> Result<Vec<ChatSoporteDTO>, Error> {
        debug!("Listing support threads");
        sqlx::query_as::<_, ChatSoporteDTO>(
            r#"
            SELECT c.*,
                p.nombre || ' ' || p.apellidos AS psicologo_nombre,
                (SELECT COUNT(*) FROM mensajes_soporte m
                 WHERE m.chat_id = c.id AND m.leido = 0 AND m.remitente_tipo = ?) AS no_leidos
            FROM chats_soporte c
            INNER JOIN psicologos p ON p.id = c.psicologo_id
            ORDER BY no_leidos DESC, c.creado_en DESC
            "#,
        )
        .bind(TipoUsuario::Psicologo)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self, data), fields(chat_id = %data.chat_id))]
    pub async fn crear_mensaje(&self, data: &CreateMensajeDTO) -> Result<Mensaje, Error> {
        debug!("Creating support message");
        let mensaje = sqlx::query_as::<_, Mensaje>(
            r#"
            INSERT INTO mensajes_soporte (chat_id, remitente_tipo, remitente_id, contenido, leido, creado_en)
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

        info!("Support message created with id {}", mensaje.id);
        Ok(mensaje)
    }

    #[instrument(skip(self))]
    pub async fn list_mensajes(
        &self,
        chat_id: &i64,
        antes_de: Option<DateTime<Utc>>,
        limite: i64,
    ) -> Result<Vec<Mensaje>, Error> {
        sqlx::query_as::<_, Mensaje>(
            r#"
            SELECT * FROM (
                SELECT * FROM mensajes_soporte
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

    /// Un admin lee lo que escribió el psicólogo y viceversa
    #[instrument(skip(self))]
    pub async fn marcar_leidos(&self, chat_id: &i64, lector: TipoUsuario) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE mensajes_soporte SET leido = 1 WHERE chat_id = ? AND remitente_tipo <> ? AND leido = 0",
        )
        .bind(chat_id)
        .bind(lector)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected())
    }
}

impl Read<ChatSoporte, i64> for SoporteRepository {
    #[instrument(skip(self), fields(chat_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<ChatSoporte>, Error> {
        sqlx::query_as::<_, ChatSoporte>("SELECT * FROM chats_soporte WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
