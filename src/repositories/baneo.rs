//! ForoBaneoRepository - baneos temporales o permanentes por foro

use super::{Create, Read};
use crate::dtos::CreateBaneoDTO;
use crate::entities::{ForoBaneo, TipoUsuario};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct ForoBaneoRepository {
    connection_pool: SqlitePool,
}

impl ForoBaneoRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    async fn cerrar(&self, baneo: &ForoBaneo, cuando: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query("UPDATE foro_baneos SET activo = 0, levantado_en = ? WHERE id = ? AND activo = 1")
            .bind(cuando)
            .bind(baneo.id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    /// Baneo vigente del usuario en el foro. Si el activo ya expiró, se cierra antes
    /// de responder, así el índice único queda libre para un baneo nuevo.
    #[instrument(skip(self))]
    pub async fn find_vigente(
        &self,
        foro_id: &i64,
        usuario_tipo: TipoUsuario,
        usuario_id: &i64,
    ) -> Result<Option<ForoBaneo>, Error> {
        debug!("Looking for an active ban");
        let activo = sqlx::query_as::<_, ForoBaneo>(
            r#"
            SELECT * FROM foro_baneos
            WHERE foro_id = ? AND usuario_tipo = ? AND usuario_id = ? AND activo = 1
            "#,
        )
        .bind(foro_id)
        .bind(usuario_tipo)
        .bind(usuario_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        let ahora = Utc::now();
        match activo {
            Some(baneo) if baneo.vigente(ahora) => Ok(Some(baneo)),
            Some(baneo) => {
                self.cerrar(&baneo, baneo.fin.unwrap_or(ahora)).await?;
                info!("Expired ban {} closed", baneo.id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, foro_id: &i64, solo_activos: bool) -> Result<Vec<ForoBaneo>, Error> {
        let baneos = sqlx::query_as::<_, ForoBaneo>(
            "SELECT * FROM foro_baneos WHERE foro_id = ? ORDER BY inicio DESC",
        )
        .bind(foro_id)
        .fetch_all(&self.connection_pool)
        .await?;

        if !solo_activos {
            return Ok(baneos);
        }
        let ahora = Utc::now();
        Ok(baneos.into_iter().filter(|b| b.vigente(ahora)).collect())
    }

    /// Levanta un baneo activo; `None` si no existía o ya estaba cerrado
    #[instrument(skip(self))]
    pub async fn levantar(&self, foro_id: &i64, id: &i64) -> Result<Option<ForoBaneo>, Error> {
        sqlx::query_as::<_, ForoBaneo>(
            r#"
            UPDATE foro_baneos SET activo = 0, levantado_en = ?
            WHERE id = ? AND foro_id = ? AND activo = 1
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(foro_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Cierra los baneos temporales cuyo fin ya pasó. Devuelve cuántos cerró.
    #[instrument(skip(self))]
    pub async fn desactivar_expirados(&self, ahora: DateTime<Utc>) -> Result<u64, Error> {
        let activos = sqlx::query_as::<_, ForoBaneo>(
            "SELECT * FROM foro_baneos WHERE activo = 1 AND fin IS NOT NULL",
        )
        .fetch_all(&self.connection_pool)
        .await?;

        let mut cerrados = 0;
        for baneo in activos.iter().filter(|b| !b.vigente(ahora)) {
            self.cerrar(baneo, baneo.fin.unwrap_or(ahora)).await?;
            cerrados += 1;
        }
        Ok(cerrados)
    }
}

impl Create<ForoBaneo, CreateBaneoDTO> for ForoBaneoRepository {
    #[instrument(skip(self, data), fields(foro_id = %data.foro_id, usuario_id = %data.usuario_id))]
    async fn create(&self, data: &CreateBaneoDTO) -> Result<ForoBaneo, Error> {
        debug!("Creating ban");
        let baneo = sqlx::query_as::<_, ForoBaneo>(
            r#"
            INSERT INTO foro_baneos
                (foro_id, usuario_tipo, usuario_id, motivo, baneado_por_tipo, baneado_por_id,
                 inicio, fin, activo, levantado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, NULL)
            RETURNING *
            "#,
        )
        .bind(data.foro_id)
        .bind(data.usuario_tipo)
        .bind(data.usuario_id)
        .bind(&data.motivo)
        .bind(data.baneado_por_tipo)
        .bind(data.baneado_por_id)
        .bind(data.inicio)
        .bind(data.fin)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Ban {} created", baneo.id);
        Ok(baneo)
    }
}

impl Read<ForoBaneo, i64> for ForoBaneoRepository {
    #[instrument(skip(self), fields(baneo_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<ForoBaneo>, Error> {
        sqlx::query_as::<_, ForoBaneo>("SELECT * FROM foro_baneos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
