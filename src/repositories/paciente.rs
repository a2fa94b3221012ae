//! PacienteRepository - pacientes de cada psicólogo

use super::cascada::{limpiar_usuario, rutas_evidencias_paciente};
use super::{Create, Read, Update};
use crate::dtos::{CreatePacienteDTO, UpdatePacienteDTO};
use crate::entities::{Paciente, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct PacienteRepository {
    connection_pool: SqlitePool,
}

impl PacienteRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Paciente>, Error> {
        debug!("Finding paciente by email");
        sqlx::query_as::<_, Paciente>("SELECT * FROM pacientes WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Lee un paciente solo si pertenece al psicólogo indicado
    #[instrument(skip(self))]
    pub async fn read_de_psicologo(
        &self,
        id: &i64,
        psicologo_id: &i64,
    ) -> Result<Option<Paciente>, Error> {
        debug!("Reading paciente owned by psicologo");
        sqlx::query_as::<_, Paciente>("SELECT * FROM pacientes WHERE id = ? AND psicologo_id = ?")
            .bind(id)
            .bind(psicologo_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Pacientes de un psicólogo; `buscar` filtra por prefijo de nombre o apellidos
    #[instrument(skip(self))]
    pub async fn list_de_psicologo(
        &self,
        psicologo_id: &i64,
        buscar: Option<&str>,
    ) -> Result<Vec<Paciente>, Error> {
        debug!("Listing pacientes of psicologo");
        let patron = buscar
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| format!("{}%", b.replace('%', "").replace('_', "")));

        sqlx::query_as::<_, Paciente>(
            r#"
            SELECT * FROM pacientes
            WHERE psicologo_id = ?1
              AND (?2 IS NULL OR nombre LIKE ?2 OR apellidos LIKE ?2)
            ORDER BY apellidos, nombre
            "#,
        )
        .bind(psicologo_id)
        .bind(patron)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Activa la cuenta fijando la contraseña elegida por el paciente
    #[instrument(skip(self, password_hash))]
    pub async fn activar(&self, id: &i64, password_hash: &str) -> Result<(), Error> {
        sqlx::query("UPDATE pacientes SET activo = 1, password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Paciente {} activated", id);
        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    pub async fn set_password(&self, id: &i64, password_hash: &str) -> Result<(), Error> {
        sqlx::query("UPDATE pacientes SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    /// Borra el paciente y sus datos en una transacción.
    /// Devuelve las rutas de evidencias a borrar del disco tras el commit.
    #[instrument(skip(self), fields(paciente_id = %id))]
    pub async fn delete_cascada(&self, id: &i64) -> Result<Vec<String>, Error> {
        debug!("Deleting paciente with cascade");
        let mut tx = self.connection_pool.begin().await?;

        let rutas = rutas_evidencias_paciente(&mut tx, *id).await?;
        limpiar_usuario(&mut tx, TipoUsuario::Paciente, *id, Utc::now()).await?;

        let result = sqlx::query("DELETE FROM pacientes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        tx.commit().await?;
        info!("Paciente {} deleted", id);
        Ok(rutas)
    }
}

impl Create<Paciente, CreatePacienteDTO> for PacienteRepository {
    #[instrument(skip(self, data), fields(psicologo_id = %data.psicologo_id))]
    async fn create(&self, data: &CreatePacienteDTO) -> Result<Paciente, Error> {
        debug!("Creating paciente");
        let datos = &data.datos;
        let paciente = sqlx::query_as::<_, Paciente>(
            r#"
            INSERT INTO pacientes
                (psicologo_id, nombre, apellidos, email, telefono, fecha_nacimiento,
                 tipo_duelo, motivo_consulta, password, activo, creado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.psicologo_id)
        .bind(&datos.nombre)
        .bind(&datos.apellidos)
        .bind(&datos.email)
        .bind(&datos.telefono)
        .bind(datos.fecha_nacimiento)
        .bind(&datos.tipo_duelo)
        .bind(&datos.motivo_consulta)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Paciente created with id {}", paciente.id);
        Ok(paciente)
    }
}

impl Read<Paciente, i64> for PacienteRepository {
    #[instrument(skip(self), fields(paciente_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Paciente>, Error> {
        debug!("Reading paciente by id");
        sqlx::query_as::<_, Paciente>("SELECT * FROM pacientes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Paciente, UpdatePacienteDTO, i64> for PacienteRepository {
    #[instrument(skip(self, data), fields(paciente_id = %id))]
    async fn update(&self, id: &i64, data: &UpdatePacienteDTO) -> Result<Paciente, Error> {
        debug!("Updating paciente");
        sqlx::query_as::<_, Paciente>(
            r#"
            UPDATE pacientes SET
                nombre = COALESCE(?, nombre),
                apellidos = COALESCE(?, apellidos),
                telefono = COALESCE(?, telefono),
                fecha_nacimiento = COALESCE(?, fecha_nacimiento),
                tipo_duelo = COALESCE(?, tipo_duelo),
                motivo_consulta = COALESCE(?, motivo_consulta)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&data.nombre)
        .bind(&data.apellidos)
        .bind(&data.telefono)
        .bind(data.fecha_nacimiento)
        .bind(&data.tipo_duelo)
        .bind(&data.motivo_consulta)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}
