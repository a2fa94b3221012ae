//! ModuloRepository - módulos del programa terapéutico

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateModuloDTO, UpdateModuloDTO};
use crate::entities::Modulo;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct ModuloRepository {
    connection_pool: SqlitePool,
}

impl ModuloRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Modulo>, Error> {
        sqlx::query_as::<_, Modulo>("SELECT * FROM modulos ORDER BY orden, id")
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Create<Modulo, CreateModuloDTO> for ModuloRepository {
    #[instrument(skip(self, data), fields(titulo = %data.titulo))]
    async fn create(&self, data: &CreateModuloDTO) -> Result<Modulo, Error> {
        debug!("Creating module");
        let modulo = sqlx::query_as::<_, Modulo>(
            "INSERT INTO modulos (titulo, descripcion, orden, creado_en) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.titulo)
        .bind(&data.descripcion)
        .bind(data.orden)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Module created with id {}", modulo.id);
        Ok(modulo)
    }
}

impl Read<Modulo, i64> for ModuloRepository {
    #[instrument(skip(self), fields(modulo_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Modulo>, Error> {
        sqlx::query_as::<_, Modulo>("SELECT * FROM modulos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Modulo, UpdateModuloDTO, i64> for ModuloRepository {
    #[instrument(skip(self, data), fields(modulo_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateModuloDTO) -> Result<Modulo, Error> {
        sqlx::query_as::<_, Modulo>(
            r#"
            UPDATE modulos SET
                titulo = COALESCE(?, titulo),
                descripcion = COALESCE(?, descripcion),
                orden = COALESCE(?, orden)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&data.titulo)
        .bind(&data.descripcion)
        .bind(data.orden)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Delete<i64> for ModuloRepository {
    /// Actividades y tests del módulo quedan sin módulo (ON DELETE SET NULL)
    #[instrument(skip(self), fields(modulo_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM modulos WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Module {} deleted", id);
        Ok(())
    }
}
