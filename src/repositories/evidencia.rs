//! EvidenciaRepository - metadatos de los archivos subidos; el archivo vive en disco

use super::{Create, Delete, Read};
use crate::dtos::CreateEvidenciaDTO;
use crate::entities::Evidencia;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct EvidenciaRepository {
    connection_pool: SqlitePool,
}

impl EvidenciaRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, asignacion_id: &i64) -> Result<Vec<Evidencia>, Error> {
        sqlx::query_as::<_, Evidencia>(
            "SELECT * FROM evidencias WHERE asignacion_id = ? ORDER BY subido_en",
        )
        .bind(asignacion_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Evidencia, CreateEvidenciaDTO> for EvidenciaRepository {
    #[instrument(skip(self, data), fields(asignacion_id = %data.asignacion_id))]
    async fn create(&self, data: &CreateEvidenciaDTO) -> Result<Evidencia, Error> {
        debug!("Saving evidence metadata");
        let evidencia = sqlx::query_as::<_, Evidencia>(
            r#"
            INSERT INTO evidencias (asignacion_id, nombre_archivo, ruta, tipo_mime, tamano, subido_en)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.asignacion_id)
        .bind(&data.nombre_archivo)
        .bind(&data.ruta)
        .bind(&data.tipo_mime)
        .bind(data.tamano)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Evidence created with id {}", evidencia.id);
        Ok(evidencia)
    }
}

impl Read<Evidencia, i64> for EvidenciaRepository {
    #[instrument(skip(self), fields(evidencia_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Evidencia>, Error> {
        sqlx::query_as::<_, Evidencia>("SELECT * FROM evidencias WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for EvidenciaRepository {
    #[instrument(skip(self), fields(evidencia_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM evidencias WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Evidence {} deleted", id);
        Ok(())
    }
}
