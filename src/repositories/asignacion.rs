//! AsignacionRepository - actividades asignadas a pacientes

use super::{Create, Read};
use crate::dtos::{AsignacionDTO, CreateAsignacionDTO};
use crate::entities::{ActividadAsignada, EstadoAsignacion};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct AsignacionRepository {
    connection_pool: SqlitePool,
}

impl AsignacionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_de_paciente(&self, paciente_id: &i64) -> Result<Vec<AsignacionDTO>, Error> {
        debug!("Listing assignments of paciente");
        sqlx::query_as::<_, AsignacionDTO>(
            r#"
            SELECT a.*, act.titulo AS actividad_titulo
            FROM actividades_asignadas a
            INNER JOIN actividades act ON act.id = a.actividad_id
            WHERE a.paciente_id = ?
            ORDER BY a.asignada_en DESC
            "#,
        )
        .bind(paciente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// pendiente | en_progreso → completada. `None` si estaba en otro estado.
    #[instrument(skip(self, comentario))]
    pub async fn completar(
        &self,
        id: &i64,
        comentario: Option<&str>,
    ) -> Result<Option<ActividadAsignada>, Error> {
        let asignacion = sqlx::query_as::<_, ActividadAsignada>(
            r#"
            UPDATE actividades_asignadas
            SET estado = ?, comentario_paciente = COALESCE(?, comentario_paciente), completada_en = ?
            WHERE id = ? AND estado IN (?, ?)
            RETURNING *
            "#,
        )
        .bind(EstadoAsignacion::Completada)
        .bind(comentario)
        .bind(Utc::now())
        .bind(id)
        .bind(EstadoAsignacion::Pendiente)
        .bind(EstadoAsignacion::EnProgreso)
        .fetch_optional(&self.connection_pool)
        .await?;
        if asignacion.is_some() {
            info!("Assignment {} completed", id);
        }
        Ok(asignacion)
    }

    /// completada → revisada. `None` si no estaba completada.
    #[instrument(skip(self, retroalimentacion))]
    pub async fn revisar(
        &self,
        id: &i64,
        retroalimentacion: &str,
    ) -> Result<Option<ActividadAsignada>, Error> {
        sqlx::query_as::<_, ActividadAsignada>(
            r#"
            UPDATE actividades_asignadas SET estado = ?, retroalimentacion = ?
            WHERE id = ? AND estado = ?
            RETURNING *
            "#,
        )
        .bind(EstadoAsignacion::Revisada)
        .bind(retroalimentacion)
        .bind(id)
        .bind(EstadoAsignacion::Completada)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Primera evidencia subida: pendiente → en_progreso
    #[instrument(skip(self))]
    pub async fn marcar_en_progreso(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("UPDATE actividades_asignadas SET estado = ? WHERE id = ? AND estado = ?")
            .bind(EstadoAsignacion::EnProgreso)
            .bind(id)
            .bind(EstadoAsignacion::Pendiente)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    /// Borra la asignación y devuelve las rutas de sus evidencias
    #[instrument(skip(self), fields(asignacion_id = %id))]
    pub async fn delete_con_evidencias(&self, id: &i64) -> Result<Vec<String>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let rutas: Vec<String> =
            sqlx::query_scalar("SELECT ruta FROM evidencias WHERE asignacion_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        sqlx::query("DELETE FROM actividades_asignadas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Assignment {} deleted with {} evidences", id, rutas.len());
        Ok(rutas)
    }
}

impl Create<ActividadAsignada, CreateAsignacionDTO> for AsignacionRepository {
    #[instrument(skip(self, data), fields(paciente_id = %data.paciente_id))]
    async fn create(&self, data: &CreateAsignacionDTO) -> Result<ActividadAsignada, Error> {
        debug!("Assigning activity");
        let asignacion = sqlx::query_as::<_, ActividadAsignada>(
            r#"
            INSERT INTO actividades_asignadas
                (actividad_id, paciente_id, psicologo_id, fecha_limite, estado, asignada_en)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.actividad_id)
        .bind(data.paciente_id)
        .bind(data.psicologo_id)
        .bind(data.fecha_limite)
        .bind(EstadoAsignacion::Pendiente)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Assignment created with id {}", asignacion.id);
        Ok(asignacion)
    }
}

impl Read<ActividadAsignada, i64> for AsignacionRepository {
    #[instrument(skip(self), fields(asignacion_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<ActividadAsignada>, Error> {
        sqlx::query_as::<_, ActividadAsignada>("SELECT * FROM actividades_asignadas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
