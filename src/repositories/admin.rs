//! AdminRepository - administradores de la plataforma

use super::{Create, Read};
use crate::dtos::CreateAdminDTO;
use crate::entities::Admin;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct AdminRepository {
    connection_pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, Error> {
        debug!("Finding admin by email");
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await
    }

    #[instrument(skip(self, password_hash))]
    pub async fn set_password(&self, id: &i64, password_hash: &str) -> Result<(), Error> {
        sqlx::query("UPDATE admins SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }
}

impl Create<Admin, CreateAdminDTO> for AdminRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &CreateAdminDTO) -> Result<Admin, Error> {
        debug!("Creating admin");
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (nombre, email, password, creado_en)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.password)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Admin created with id {}", admin.id);
        Ok(admin)
    }
}

impl Read<Admin, i64> for AdminRepository {
    #[instrument(skip(self), fields(admin_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Admin>, Error> {
        debug!("Reading admin by id");
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
