//! Integration tests para perfil de psicólogo y gestión de pacientes
//!
//! Test para:
//! - GET/PATCH/DELETE /psicologos/me
//! - PATCH /psicologos/me/password
//! - POST/GET /pacientes
//! - GET/PATCH/DELETE /pacientes/{id}
//! - GET /pacientes/me

mod common;

#[cfg(test)]
mod paciente_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    // ============================================================
    // /psicologos/me
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_perfil_y_actualizacion(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await;
        response.assert_status_ok();
        let perfil: Value = response.json();
        assert_eq!(perfil["cedula"], "1234567");

        let response = server
            .patch("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"especialidad": "Duelo infantil"}))
            .await;
        response.assert_status_ok();
        let perfil: Value = response.json();
        assert_eq!(perfil["especialidad"], "Duelo infantil");
        assert_eq!(perfil["nombre"], "Ana");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_perfil_solo_psicologos(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .get("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_cambiar_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/psicologos/me/password")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"actual": "NoEsLaMia1", "nueva": "OtraClave22"}))
            .await
            .assert_status_unauthorized();

        server
            .patch("/psicologos/me/password")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"actual": PASSWORD, "nueva": "OtraClave22"}))
            .await
            .assert_status_ok();

        server
            .post("/auth/login")
            .json(&json!({"email": "ana@acompanar.test", "password": "OtraClave22"}))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_delete_cuenta_en_cascada(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        server
            .delete("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let pacientes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pacientes WHERE psicologo_id = 1")
                .fetch_one(&pool)
                .await?;
        assert_eq!(pacientes, 0);
        let asignaciones: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM actividades_asignadas")
                .fetch_one(&pool)
                .await?;
        assert_eq!(asignaciones, 0);

        // La actividad de catálogo sobrevive
        let actividades: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actividades")
            .fetch_one(&pool)
            .await?;
        assert_eq!(actividades, 2);

        // El token ya no sirve
        server
            .get("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    // ============================================================
    // /pacientes
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_crear_paciente(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/pacientes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({
                "nombre": "Pedro",
                "apellidos": "Quintana",
                "email": "PEDRO@acompanar.test",
                "fecha_nacimiento": "1975-09-30",
                "tipo_duelo": "perdida_pareja"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let paciente: Value = response.json();
        assert_eq!(paciente["psicologo_id"], 1);
        assert_eq!(paciente["email"], "pedro@acompanar.test");
        assert_eq!(paciente["activo"], false);

        let enviados = state.mailer.enviados();
        assert_eq!(enviados.len(), 1);
        assert_eq!(enviados[0].para, "pedro@acompanar.test");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_crear_paciente_conflictos_y_validacion(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Email de un psicólogo
        server
            .post("/pacientes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"nombre": "X", "apellidos": "Y", "email": "bruno@acompanar.test"}))
            .await
            .assert_status(StatusCode::CONFLICT);

        // Fecha de nacimiento futura
        let manana = (Utc::now() + Duration::days(1)).date_naive();
        server
            .post("/pacientes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({
                "nombre": "X",
                "apellidos": "Y",
                "email": "futuro@acompanar.test",
                "fecha_nacimiento": manana
            }))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_list_pacientes_propios(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/pacientes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await;
        response.assert_status_ok();
        let pacientes: Vec<Value> = response.json();
        assert_eq!(pacientes.len(), 3);
        assert!(pacientes.iter().all(|p| p["psicologo_id"] == 1));

        let response = server
            .get("/pacientes")
            .add_query_param("buscar", "Mar")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await;
        let pacientes: Vec<Value> = response.json();
        assert_eq!(pacientes.len(), 1);
        assert_eq!(pacientes[0]["nombre"], "Mario");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_paciente_ajeno_es_404(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Nora es paciente de Bruno
        server
            .get("/pacientes/3")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();
        server
            .patch("/pacientes/3")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"nombre": "Cambio"}))
            .await
            .assert_status_not_found();
        server
            .delete("/pacientes/3")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_update_y_delete_paciente(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .patch("/pacientes/2")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"motivo_consulta": "Pérdida de su hermano"}))
            .await;
        response.assert_status_ok();
        let paciente: Value = response.json();
        assert_eq!(paciente["motivo_consulta"], "Pérdida de su hermano");
        assert_eq!(paciente["nombre"], "Mario");

        server
            .delete("/pacientes/2")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/pacientes/2")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_mi_ficha(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/pacientes/me")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await;
        response.assert_status_ok();
        let ficha: Value = response.json();
        assert_eq!(ficha["id"], 1);
        assert_eq!(ficha["tipo_duelo"], "perdida_progenitor");

        server
            .get("/pacientes/me")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
