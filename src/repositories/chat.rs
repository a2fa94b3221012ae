//! ChatRepository - un chat por pareja psicólogo/paciente

use super::Read;
use crate::dtos::ChatDTO;
use crate::entities::{Chat, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument, warn};

pub struct ChatRepository {
    connection_pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    async fn find_pareja(&self, psicologo_id: i64, paciente_id: i64) -> Result<Option<Chat>, Error> {
        sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE psicologo_id = ? AND paciente_id = ?")
            .bind(psicologo_id)
            .bind(paciente_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Devuelve `(chat, creado)`
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        psicologo_id: i64,
        paciente_id: i64,
    ) -> Result<(Chat, bool), Error> {
        if let Some(chat) = self.find_pareja(psicologo_id, paciente_id).await? {
            debug!("Chat {} already exists", chat.id);
            return Ok((chat, false));
        }

        let insert = sqlx::query_as::<_, Chat>(
            "INSERT INTO chats (psicologo_id, paciente_id, creado_en) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(psicologo_id)
        .bind(paciente_id)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await;

        match insert {
            Ok(chat) => {
                info!("Chat created with id {}", chat.id);
                Ok((chat, true))
            }
            Err(Error::Database(db)) if db.is_unique_violation() => {
                warn!("Concurrent chat creation, re-reading");
                let chat = self
                    .find_pareja(psicologo_id, paciente_id)
                    .await?
                    .ok_or(Error::RowNotFound)?;
                Ok((chat, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Chats del usuario con el número de mensajes recibidos sin leer
    #[instrument(skip(self))]
    pub async fn list_de_usuario(&self, tipo: TipoUsuario, id: i64) -> Result<Vec<ChatDTO>, Error> {
        debug!("Listing chats of user");
        let columna = match tipo {
            TipoUsuario::Paciente => "paciente_id",
            _ => "psicologo_id",
        };
        let sql = format!(
            r#"
            SELECT c.*,
                (SELECT COUNT(*) FROM mensajes m
                 WHERE m.chat_id = c.id AND m.leido = 0 AND m.remitente_tipo <> ?1) AS no_leidos
            FROM chats c
            WHERE c.{} = ?2
            ORDER BY c.creado_en DESC
            "#,
            columna
        );
        sqlx::query_as::<_, ChatDTO>(&sql)
            .bind(tipo)
            .bind(id)
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Read<Chat, i64> for ChatRepository {
    #[instrument(skip(self), fields(chat_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Chat>, Error> {
        debug!("Reading chat by id");
        sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
