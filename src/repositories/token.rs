//! TokenRepository - tokens de activación y recuperación (solo se guarda el hash)

use crate::entities::{PropositoToken, TipoUsuario, TokenCuenta};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct TokenRepository {
    connection_pool: SqlitePool,
}

impl TokenRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Guarda un token nuevo e invalida los anteriores del mismo propósito
    #[instrument(skip(self, token_hash))]
    pub async fn emitir(
        &self,
        tipo_usuario: TipoUsuario,
        usuario_id: i64,
        proposito: PropositoToken,
        token_hash: &str,
        expira_en: DateTime<Utc>,
    ) -> Result<TokenCuenta, Error> {
        debug!("Issuing account token");
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE tokens_cuenta SET usado = 1
            WHERE tipo_usuario = ? AND usuario_id = ? AND proposito = ? AND usado = 0
            "#,
        )
        .bind(tipo_usuario)
        .bind(usuario_id)
        .bind(proposito)
        .execute(&mut *tx)
        .await?;

        let token = sqlx::query_as::<_, TokenCuenta>(
            r#"
            INSERT INTO tokens_cuenta
                (tipo_usuario, usuario_id, proposito, token_hash, expira_en, usado, creado_en)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(tipo_usuario)
        .bind(usuario_id)
        .bind(proposito)
        .bind(token_hash)
        .bind(expira_en)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Token {} issued for {} {}", token.id, tipo_usuario, usuario_id);
        Ok(token)
    }

    #[instrument(skip(self, token_hash))]
    pub async fn find_by_hash(
        &self,
        token_hash: &str,
        proposito: PropositoToken,
    ) -> Result<Option<TokenCuenta>, Error> {
        debug!("Finding account token by hash");
        sqlx::query_as::<_, TokenCuenta>(
            "SELECT * FROM tokens_cuenta WHERE token_hash = ? AND proposito = ?",
        )
        .bind(token_hash)
        .bind(proposito)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Marca el token como usado. Devuelve `false` si otro request lo consumió antes.
    #[instrument(skip(self))]
    pub async fn consumir(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE tokens_cuenta SET usado = 1 WHERE id = ? AND usado = 0")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
