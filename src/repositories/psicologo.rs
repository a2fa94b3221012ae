//! PsicologoRepository - cuentas de psicólogos

use super::cascada::{limpiar_usuario, rutas_evidencias_paciente};
use super::{Create, Read, Update};
use crate::dtos::{CreatePsicologoDTO, UpdatePsicologoDTO};
use crate::entities::{Psicologo, TipoUsuario};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct PsicologoRepository {
    connection_pool: SqlitePool,
}

impl PsicologoRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Psicologo>, Error> {
        debug!("Finding psicologo by email");
        sqlx::query_as::<_, Psicologo>("SELECT * FROM psicologos WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn cedula_en_uso(&self, cedula: &str) -> Result<bool, Error> {
        let existe: Option<i64> = sqlx::query_scalar("SELECT id FROM psicologos WHERE cedula = ?")
            .bind(cedula)
            .fetch_optional(&self.connection_pool)
            .await?;
        Ok(existe.is_some())
    }

    /// El email debe ser único entre admins, psicólogos y pacientes
    #[instrument(skip(self))]
    pub async fn email_en_uso(&self, email: &str) -> Result<bool, Error> {
        debug!("Checking email across all account tables");
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM admins WHERE email = ?1)
                 + (SELECT COUNT(*) FROM psicologos WHERE email = ?1)
                 + (SELECT COUNT(*) FROM pacientes WHERE email = ?1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(total > 0)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, activo: Option<bool>) -> Result<Vec<Psicologo>, Error> {
        debug!("Listing psicologos");
        sqlx::query_as::<_, Psicologo>(
            r#"
            SELECT * FROM psicologos
            WHERE ?1 IS NULL OR activo = ?1
            ORDER BY apellidos, nombre
            "#,
        )
        .bind(activo)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn activar(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("UPDATE psicologos SET activo = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Psicologo {} activated", id);
        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    pub async fn set_password(&self, id: &i64, password_hash: &str) -> Result<(), Error> {
        sqlx::query("UPDATE psicologos SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_suspendido(&self, id: &i64, suspendido: bool) -> Result<Psicologo, Error> {
        let psicologo = sqlx::query_as::<_, Psicologo>(
            "UPDATE psicologos SET suspendido = ? WHERE id = ? RETURNING *",
        )
        .bind(suspendido)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Psicologo {} suspendido = {}", id, suspendido);
        Ok(psicologo)
    }

    /// Borra la cuenta y todo lo que cuelga de ella en una transacción.
    /// Devuelve las rutas de evidencias a borrar del disco tras el commit.
    #[instrument(skip(self), fields(psicologo_id = %id))]
    pub async fn delete_cascada(&self, id: &i64) -> Result<Vec<String>, Error> {
        debug!("Deleting psicologo with cascade");
        let ahora = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let pacientes: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM pacientes WHERE psicologo_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let mut rutas = Vec::new();
        for paciente_id in &pacientes {
            rutas.extend(rutas_evidencias_paciente(&mut tx, *paciente_id).await?);
            limpiar_usuario(&mut tx, TipoUsuario::Paciente, *paciente_id, ahora).await?;
        }
        limpiar_usuario(&mut tx, TipoUsuario::Psicologo, *id, ahora).await?;

        // citas, chats, asignaciones, aplicaciones y notas caen por ON DELETE CASCADE
        sqlx::query("DELETE FROM pacientes WHERE psicologo_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM psicologos WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        tx.commit().await?;
        info!(
            "Psicologo {} deleted with {} patients",
            id,
            pacientes.len()
        );
        Ok(rutas)
    }
}

impl Create<Psicologo, CreatePsicologoDTO> for PsicologoRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &CreatePsicologoDTO) -> Result<Psicologo, Error> {
        debug!("Creating psicologo");
        let psicologo = sqlx::query_as::<_, Psicologo>(
            r#"
            INSERT INTO psicologos
                (nombre, apellidos, email, cedula, telefono, especialidad, password, activo, suspendido, creado_en)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?)
            RETURNING *
            "#,
        )
        .bind(&data.nombre)
        .bind(&data.apellidos)
        .bind(&data.email)
        .bind(&data.cedula)
        .bind(&data.telefono)
        .bind(&data.especialidad)
        .bind(&data.password)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Psicologo created with id {}", psicologo.id);
        Ok(psicologo)
    }
}

impl Read<Psicologo, i64> for PsicologoRepository {
    #[instrument(skip(self), fields(psicologo_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Psicologo>, Error> {
        debug!("Reading psicologo by id");
        sqlx::query_as::<_, Psicologo>("SELECT * FROM psicologos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Psicologo, UpdatePsicologoDTO, i64> for PsicologoRepository {
    #[instrument(skip(self, data), fields(psicologo_id = %id))]
    async fn update(&self, id: &i64, data: &UpdatePsicologoDTO) -> Result<Psicologo, Error> {
        debug!("Updating psicologo profile");
        sqlx::query_as::<_, Psicologo>(
            r#"
            UPDATE psicologos SET
                nombre = COALESCE(?, nombre),
                apellidos = COALESCE(?, apellidos),
                telefono = COALESCE(?, telefono),
                especialidad = COALESCE(?, especialidad)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&data.nombre)
        .bind(&data.apellidos)
        .bind(&data.telefono)
        .bind(&data.especialidad)
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }
}
