//! ModeracionLogRepository - bitácora de moderación, solo se inserta y se lee

use super::Create;
use crate::dtos::CreateModeracionLogDTO;
use crate::entities::ModeracionLog;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct ModeracionLogRepository {
    connection_pool: SqlitePool,
}

impl ModeracionLogRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Más recientes primero
    #[instrument(skip(self))]
    pub async fn list(&self, foro_id: &i64) -> Result<Vec<ModeracionLog>, Error> {
        sqlx::query_as::<_, ModeracionLog>(
            "SELECT * FROM moderacion_log WHERE foro_id = ? ORDER BY creado_en DESC, id DESC",
        )
        .bind(foro_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<ModeracionLog, CreateModeracionLogDTO> for ModeracionLogRepository {
    #[instrument(skip(self, data), fields(foro_id = %data.foro_id, accion = ?data.accion))]
    async fn create(&self, data: &CreateModeracionLogDTO) -> Result<ModeracionLog, Error> {
        debug!("Appending moderation log entry");
        sqlx::query_as::<_, ModeracionLog>(
            r#"
            INSERT INTO moderacion_log
                (foro_id, moderador_tipo, moderador_id, accion, objetivo_tipo, objetivo_id, detalle, creado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.foro_id)
        .bind(data.moderador_tipo)
        .bind(data.moderador_id)
        .bind(data.accion)
        .bind(data.objetivo_tipo)
        .bind(data.objetivo_id)
        .bind(&data.detalle)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}
