//! ForoParticipanteRepository - membresía y rol en cada foro

use super::{Delete, Read};
use crate::entities::{ForoParticipante, RolForo, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

/// Clave compuesta (foro_id, usuario_tipo, usuario_id)
pub type ParticipanteId = (i64, TipoUsuario, i64);

pub struct ForoParticipanteRepository {
    connection_pool: SqlitePool,
}

impl ForoParticipanteRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn agregar(
        &self,
        foro_id: i64,
        usuario_tipo: TipoUsuario,
        usuario_id: i64,
        rol: RolForo,
    ) -> Result<ForoParticipante, Error> {
        debug!("Adding forum participant");
        let participante = sqlx::query_as::<_, ForoParticipante>(
            r#"
            INSERT INTO foro_participantes (foro_id, usuario_tipo, usuario_id, rol, unido_en)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(foro_id)
        .bind(usuario_tipo)
        .bind(usuario_id)
        .bind(rol)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("{} {} joined forum {}", usuario_tipo, usuario_id, foro_id);
        Ok(participante)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, foro_id: &i64) -> Result<Vec<ForoParticipante>, Error> {
        sqlx::query_as::<_, ForoParticipante>(
            "SELECT * FROM foro_participantes WHERE foro_id = ? ORDER BY unido_en",
        )
        .bind(foro_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn cambiar_rol(&self, id: &ParticipanteId, rol: RolForo) -> Result<ForoParticipante, Error> {
        let (foro_id, usuario_tipo, usuario_id) = id;
        sqlx::query_as::<_, ForoParticipante>(
            r#"
            UPDATE foro_participantes SET rol = ?
            WHERE foro_id = ? AND usuario_tipo = ? AND usuario_id = ?
            RETURNING *
            "#,
        )
        .bind(rol)
        .bind(foro_id)
        .bind(usuario_tipo)
        .bind(usuario_id)
        .fetch_one(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn contar_admins(&self, foro_id: &i64) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM foro_participantes WHERE foro_id = ? AND rol = ?")
            .bind(foro_id)
            .bind(RolForo::Admin)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<ForoParticipante, ParticipanteId> for ForoParticipanteRepository {
    #[instrument(skip(self))]
    async fn read(&self, id: &ParticipanteId) -> Result<Option<ForoParticipante>, Error> {
        let (foro_id, usuario_tipo, usuario_id) = id;
        sqlx::query_as::<_, ForoParticipante>(
            r#"
            SELECT * FROM foro_participantes
            WHERE foro_id = ? AND usuario_tipo = ? AND usuario_id = ?
            "#,
        )
        .bind(foro_id)
        .bind(usuario_tipo)
        .bind(usuario_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<ParticipanteId> for ForoParticipanteRepository {
    #[instrument(skip(self))]
    async fn delete(&self, id: &ParticipanteId) -> Result<(), Error> {
        let (foro_id, usuario_tipo, usuario_id) = id;
        sqlx::query(
            "DELETE FROM foro_participantes WHERE foro_id = ? AND usuario_tipo = ? AND usuario_id = ?",
        )
        .bind(foro_id)
        .bind(usuario_tipo)
        .bind(usuario_id)
        .execute(&self.connection_pool)
        .await?;
        info!("{} {} left forum {}", usuario_tipo, usuario_id, foro_id);
        Ok(())
    }
}
