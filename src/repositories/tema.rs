//! TemaRepository - hilos de cada foro

use super::{Delete, Read};
use crate::dtos::CreateTemaDTO;
use crate::entities::{MensajeForo, Tema};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct TemaRepository {
    connection_pool: SqlitePool,
}

impl TemaRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Crea el tema con su primer mensaje en una transacción
    #[instrument(skip(self, data, contenido), fields(foro_id = %data.foro_id))]
    pub async fn create_con_mensaje(
        &self,
        data: &CreateTemaDTO,
        contenido: &str,
    ) -> Result<(Tema, MensajeForo), Error> {
        debug!("Creating thread with first message");
        let ahora = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let tema = sqlx::query_as::<_, Tema>(
            r#"
            INSERT INTO temas (foro_id, titulo, autor_tipo, autor_id, cerrado, creado_en)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.foro_id)
        .bind(&data.titulo)
        .bind(data.autor_tipo)
        .bind(data.autor_id)
        .bind(ahora)
        .fetch_one(&mut *tx)
        .await?;

        let mensaje = sqlx::query_as::<_, MensajeForo>(
            r#"
            INSERT INTO mensajes_foro (tema_id, autor_tipo, autor_id, contenido, eliminado, creado_en)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(tema.id)
        .bind(data.autor_tipo)
        .bind(data.autor_id)
        .bind(contenido)
        .bind(ahora)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Thread {} created in forum {}", tema.id, tema.foro_id);
        Ok((tema, mensaje))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, foro_id: &i64) -> Result<Vec<Tema>, Error> {
        sqlx::query_as::<_, Tema>("SELECT * FROM temas WHERE foro_id = ? ORDER BY creado_en DESC")
            .bind(foro_id)
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Lee el tema comprobando que pertenece al foro
    #[instrument(skip(self))]
    pub async fn read_de_foro(&self, foro_id: &i64, id: &i64) -> Result<Option<Tema>, Error> {
        sqlx::query_as::<_, Tema>("SELECT * FROM temas WHERE id = ? AND foro_id = ?")
            .bind(id)
            .bind(foro_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_cerrado(&self, id: &i64, cerrado: bool) -> Result<Tema, Error> {
        sqlx::query_as::<_, Tema>("UPDATE temas SET cerrado = ? WHERE id = ? RETURNING *")
            .bind(cerrado)
            .bind(id)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<Tema, i64> for TemaRepository {
    #[instrument(skip(self), fields(tema_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Tema>, Error> {
        sqlx::query_as::<_, Tema>("SELECT * FROM temas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for TemaRepository {
    #[instrument(skip(self), fields(tema_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM temas WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Thread {} deleted", id);
        Ok(())
    }
}
