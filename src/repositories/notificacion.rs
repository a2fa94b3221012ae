//! NotificacionRepository - notificaciones internas de cualquier tipo de usuario

use super::Create;
use crate::dtos::CreateNotificacionDTO;
use crate::entities::{Notificacion, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

const MAX_NOTIFICACIONES: i64 = 100;

pub struct NotificacionRepository {
    connection_pool: SqlitePool,
}

impl NotificacionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tipo: TipoUsuario,
        id: i64,
        solo_no_leidas: bool,
    ) -> Result<Vec<Notificacion>, Error> {
        debug!("Listing notifications");
        sqlx::query_as::<_, Notificacion>(
            r#"
            SELECT * FROM notificaciones
            WHERE destinatario_tipo = ? AND destinatario_id = ? AND (? = 0 OR leida = 0)
            ORDER BY creada_en DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(tipo)
        .bind(id)
        .bind(solo_no_leidas)
        .bind(MAX_NOTIFICACIONES)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// `false` si no existe o no es del destinatario
    #[instrument(skip(self))]
    pub async fn marcar_leida(&self, id: &i64, tipo: TipoUsuario, destinatario_id: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE notificaciones SET leida = 1 WHERE id = ? AND destinatario_tipo = ? AND destinatario_id = ?",
        )
        .bind(id)
        .bind(tipo)
        .bind(destinatario_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    pub async fn marcar_todas(&self, tipo: TipoUsuario, destinatario_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE notificaciones SET leida = 1 WHERE destinatario_tipo = ? AND destinatario_id = ? AND leida = 0",
        )
        .bind(tipo)
        .bind(destinatario_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// `false` si no existe o no es del destinatario
    #[instrument(skip(self))]
    pub async fn delete_propia(&self, id: &i64, tipo: TipoUsuario, destinatario_id: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM notificaciones WHERE id = ? AND destinatario_tipo = ? AND destinatario_id = ?",
        )
        .bind(id)
        .bind(tipo)
        .bind(destinatario_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

impl Create<Notificacion, CreateNotificacionDTO> for NotificacionRepository {
    #[instrument(skip(self, data), fields(destinatario = %data.destinatario_id, tipo = ?data.tipo))]
    async fn create(&self, data: &CreateNotificacionDTO) -> Result<Notificacion, Error> {
        debug!("Creating notification");
        sqlx::query_as::<_, Notificacion>(
            r#"
            INSERT INTO notificaciones (destinatario_tipo, destinatario_id, tipo, titulo, mensaje, leida, creada_en)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.destinatario_tipo)
        .bind(data.destinatario_id)
        .bind(data.tipo)
        .bind(&data.titulo)
        .bind(&data.mensaje)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}
