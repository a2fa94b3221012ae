//! Borrado en cascada de cuentas
//!
//! Las claves foráneas cubren las tablas que referencian directamente a
//! psicólogos y pacientes. Las referencias polimórficas `(tipo, id)`
//! (notificaciones, tokens, participación en foros) se limpian aquí,
//! siempre dentro de la transacción del borrado.

use crate::entities::TipoUsuario;
use chrono::{DateTime, Utc};
use sqlx::{Error, SqliteConnection};
use tracing::debug;

/// Elimina el rastro polimórfico de un usuario. Sus mensajes de foro
/// quedan como eliminados para no romper los hilos ni la bitácora.
pub(crate) async fn limpiar_usuario(
    conn: &mut SqliteConnection,
    tipo: TipoUsuario,
    id: i64,
    ahora: DateTime<Utc>,
) -> Result<(), Error> {
    debug!("Cleaning polymorphic references of {} {}", tipo, id);

    sqlx::query("DELETE FROM notificaciones WHERE destinatario_tipo = ? AND destinatario_id = ?")
        .bind(tipo)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM tokens_cuenta WHERE tipo_usuario = ? AND usuario_id = ?")
        .bind(tipo)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM foro_participantes WHERE usuario_tipo = ? AND usuario_id = ?")
        .bind(tipo)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM foro_baneos WHERE usuario_tipo = ? AND usuario_id = ?")
        .bind(tipo)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        UPDATE mensajes_foro
        SET eliminado = 1, contenido = '', eliminado_por_tipo = ?, eliminado_por_id = ?, eliminado_en = ?
        WHERE autor_tipo = ? AND autor_id = ? AND eliminado = 0
        "#,
    )
    .bind(tipo)
    .bind(id)
    .bind(ahora)
    .bind(tipo)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rutas de las evidencias de un paciente, para borrarlas del disco tras el commit
pub(crate) async fn rutas_evidencias_paciente(
    conn: &mut SqliteConnection,
    paciente_id: i64,
) -> Result<Vec<String>, Error> {
    sqlx::query_scalar(
        r#"
        SELECT e.ruta FROM evidencias e
        INNER JOIN actividades_asignadas a ON a.id = e.asignacion_id
        WHERE a.paciente_id = ?
        "#,
    )
    .bind(paciente_id)
    .fetch_all(&mut *conn)
    .await
}
