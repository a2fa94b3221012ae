//! MensajeForoRepository - mensajes de los temas, con borrado lógico

use super::{Create, Read};
use crate::dtos::CreateMensajeForoDTO;
use crate::entities::{MensajeForo, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct MensajeForoRepository {
    connection_pool: SqlitePool,
}

impl MensajeForoRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, tema_id: &i64) -> Result<Vec<MensajeForo>, Error> {
        sqlx::query_as::<_, MensajeForo>(
            "SELECT * FROM mensajes_foro WHERE tema_id = ? ORDER BY creado_en, id",
        )
        .bind(tema_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Lee el mensaje solo si su tema pertenece al foro
    #[instrument(skip(self))]
    pub async fn read_de_foro(&self, foro_id: &i64, id: &i64) -> Result<Option<MensajeForo>, Error> {
        sqlx::query_as::<_, MensajeForo>(
            r#"
            SELECT m.* FROM mensajes_foro m
            INNER JOIN temas t ON t.id = m.tema_id
            WHERE m.id = ? AND t.foro_id = ?
            "#,
        )
        .bind(id)
        .bind(foro_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    #[instrument(skip(self, contenido))]
    pub async fn editar(&self, id: &i64, contenido: &str) -> Result<MensajeForo, Error> {
        sqlx::query_as::<_, MensajeForo>(
            "UPDATE mensajes_foro SET contenido = ?, editado_en = ? WHERE id = ? RETURNING *",
        )
        .bind(contenido)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Borrado lógico; el contenido se conserva para revisión de moderación
    #[instrument(skip(self))]
    pub async fn eliminar(
        &self,
        id: &i64,
        por_tipo: TipoUsuario,
        por_id: i64,
    ) -> Result<MensajeForo, Error> {
        let mensaje = sqlx::query_as::<_, MensajeForo>(
            r#"
            UPDATE mensajes_foro
            SET eliminado = 1, eliminado_por_tipo = ?, eliminado_por_id = ?, eliminado_en = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(por_tipo)
        .bind(por_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Forum message {} deleted by {} {}", id, por_tipo, por_id);
        Ok(mensaje)
    }
}

impl Create<MensajeForo, CreateMensajeForoDTO> for MensajeForoRepository {
    #[instrument(skip(self, data), fields(tema_id = %data.tema_id))]
    async fn create(&self, data: &CreateMensajeForoDTO) -> Result<MensajeForo, Error> {
        debug!("Creating forum message");
        let mensaje = sqlx::query_as::<_, MensajeForo>(
            r#"
            INSERT INTO mensajes_foro (tema_id, autor_tipo, autor_id, contenido, eliminado, creado_en)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.tema_id)
        .bind(data.autor_tipo)
        .bind(data.autor_id)
        .bind(&data.contenido)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Forum message created with id {}", mensaje.id);
        Ok(mensaje)
    }
}

impl Read<MensajeForo, i64> for MensajeForoRepository {
    #[instrument(skip(self), fields(mensaje_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<MensajeForo>, Error> {
        sqlx::query_as::<_, MensajeForo>("SELECT * FROM mensajes_foro WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
