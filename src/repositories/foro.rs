//! ForoRepository - foros de apoyo

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateForoDTO, ForoDTO, UpdateForoDTO};
use crate::entities::{Foro, RolForo, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct ForoRepository {
    connection_pool: SqlitePool,
}

impl ForoRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Foros públicos más aquellos en los que participa el usuario.
    /// Los admins de la plataforma ven todos.
    #[instrument(skip(self))]
    pub async fn list_visibles(&self, tipo: TipoUsuario, id: i64) -> Result<Vec<ForoDTO>, Error> {
        debug!("Listing visible forums");
        sqlx::query_as::<_, ForoDTO>(
            r#"
            SELECT f.*, p.rol AS mi_rol
            FROM foros f
            LEFT JOIN foro_participantes p
                ON p.foro_id = f.id AND p.usuario_tipo = ?1 AND p.usuario_id = ?2
            WHERE f.publico = 1 OR p.rol IS NOT NULL OR ?1 = 'admin'
            ORDER BY f.creado_en DESC
            "#,
        )
        .bind(tipo)
        .bind(id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Foro, CreateForoDTO> for ForoRepository {
    /// Crea el foro y registra al creador como su admin en la misma transacción
    #[instrument(skip(self, data), fields(titulo = %data.titulo))]
    async fn create(&self, data: &CreateForoDTO) -> Result<Foro, Error> {
        debug!("Creating forum");
        let ahora = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let foro = sqlx::query_as::<_, Foro>(
            r#"
            INSERT INTO foros (titulo, descripcion, publico, creado_por_tipo, creado_por_id, creado_en)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.titulo)
        .bind(&data.descripcion)
        .bind(data.publico)
        .bind(data.creado_por_tipo)
        .bind(data.creado_por_id)
        .bind(ahora)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO foro_participantes (foro_id, usuario_tipo, usuario_id, rol, unido_en)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(foro.id)
        .bind(data.creado_por_tipo)
        .bind(data.creado_por_id)
        .bind(RolForo::Admin)
        .bind(ahora)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Forum created with id {}", foro.id);
        Ok(foro)
    }
}

impl Read<Foro, i64> for ForoRepository {
    #[instrument(skip(self), fields(foro_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Foro>, Error> {
        debug!("Reading forum by id");
        sqlx::query_as::<_, Foro>("SELECT * FROM foros WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Foro, UpdateForoDTO, i64> for ForoRepository {
    #[instrument(skip(self, data), fields(foro_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateForoDTO) -> Result<Foro, Error> {
        debug!("Updating forum");
        sqlx::query_as::<_, Foro>(
            r#"
            UPDATE foros SET
                titulo = COALESCE(?, titulo),
                descripcion = COALESCE(?, descripcion),
                publico = COALESCE(?, publico)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&data.titulo)
        .bind(&data.descripcion)
        .bind(data.publico)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Delete<i64> for ForoRepository {
    /// Temas, mensajes, participantes, baneos y bitácora caen por cascada
    #[instrument(skip(self), fields(foro_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM foros WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Forum {} deleted", id);
        Ok(())
    }
}
