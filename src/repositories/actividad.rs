//! ActividadRepository - catálogo de actividades y actividades propias de cada psicólogo

use super::{Create, Read, Update};
use crate::dtos::{CreateActividadDTO, UpdateActividadDTO};
use crate::entities::Actividad;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct ActividadRepository {
    connection_pool: SqlitePool,
}

impl ActividadRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Actividades del catálogo de un módulo
    #[instrument(skip(self))]
    pub async fn list_de_modulo(&self, modulo_id: &i64) -> Result<Vec<Actividad>, Error> {
        sqlx::query_as::<_, Actividad>(
            "SELECT * FROM actividades WHERE modulo_id = ? AND psicologo_id IS NULL ORDER BY id",
        )
        .bind(modulo_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Catálogo general más las propias del psicólogo (todas si `psicologo_id` es None)
    #[instrument(skip(self))]
    pub async fn list_visibles(
        &self,
        psicologo_id: Option<i64>,
        modulo_id: Option<i64>,
    ) -> Result<Vec<Actividad>, Error> {
        debug!("Listing visible activities");
        sqlx::query_as::<_, Actividad>(
            r#"
            SELECT * FROM actividades
            WHERE (?1 IS NULL OR psicologo_id IS NULL OR psicologo_id = ?1)
              AND (?2 IS NULL OR modulo_id = ?2)
            ORDER BY modulo_id, id
            "#,
        )
        .bind(psicologo_id)
        .bind(modulo_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Borra la actividad (y en cascada sus asignaciones) devolviendo las rutas de las evidencias
    #[instrument(skip(self), fields(actividad_id = %id))]
    pub async fn delete_con_evidencias(&self, id: &i64) -> Result<Vec<String>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let rutas: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT e.ruta FROM evidencias e
            JOIN actividades_asignadas a ON a.id = e.asignacion_id
            WHERE a.actividad_id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM actividades WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Activity {} deleted with {} evidences", id, rutas.len());
        Ok(rutas)
    }
}

impl Create<Actividad, CreateActividadDTO> for ActividadRepository {
    #[instrument(skip(self, data), fields(titulo = %data.datos.titulo))]
    async fn create(&self, data: &CreateActividadDTO) -> Result<Actividad, Error> {
        debug!("Creating activity");
        let datos = &data.datos;
        let actividad = sqlx::query_as::<_, Actividad>(
            r#"
            INSERT INTO actividades (modulo_id, psicologo_id, titulo, descripcion, instrucciones, creado_en)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(datos.modulo_id)
        .bind(data.psicologo_id)
        .bind(&datos.titulo)
        .bind(&datos.descripcion)
        .bind(&datos.instrucciones)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Activity created with id {}", actividad.id);
        Ok(actividad)
    }
}

impl Read<Actividad, i64> for ActividadRepository {
    #[instrument(skip(self), fields(actividad_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Actividad>, Error> {
        sqlx::query_as::<_, Actividad>("SELECT * FROM actividades WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Actividad, UpdateActividadDTO, i64> for ActividadRepository {
    #[instrument(skip(self, data), fields(actividad_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateActividadDTO) -> Result<Actividad, Error> {
        sqlx::query_as::<_, Actividad>(
            r#"
            UPDATE actividades SET
                modulo_id = COALESCE(?, modulo_id),
                titulo = COALESCE(?, titulo),
                descripcion = COALESCE(?, descripcion),
                instrucciones = COALESCE(?, instrucciones)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(data.modulo_id)
        .bind(&data.titulo)
        .bind(&data.descripcion)
        .bind(&data.instrucciones)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}
