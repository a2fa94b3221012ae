//! Integration tests para los endpoints de autenticación
//!
//! Test para:
//! - POST /auth/registro
//! - POST /auth/activar
//! - POST /auth/login
//! - POST /auth/recuperar
//! - POST /auth/restablecer
//! - authentication_middleware
//!
//! Estos test usan `#[sqlx::test]` que:
//! - Crea automáticamente una base de datos de test aislada
//! - Aplica las migrations de `migrations/`
//! - Aplica los fixtures indicados de `fixtures/`

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use acompanar::core::Config;
    use acompanar::services::bootstrap_admin;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    fn registro(email: &str, cedula: &str) -> Value {
        json!({
            "nombre": "Elena",
            "apellidos": "Castro Molina",
            "email": email,
            "cedula": cedula,
            "especialidad": "Duelo perinatal",
            "password": "Segura2025"
        })
    }

    // ============================================================
    // POST /auth/registro + POST /auth/activar
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_registro_activacion_login(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/auth/registro")
            .json(&registro("Elena@Acompanar.test", "9876543"))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let perfil: Value = response.json();
        assert_eq!(perfil["email"], "elena@acompanar.test");
        assert_eq!(perfil["activo"], false);
        assert!(perfil.get("password").is_none());

        // Sin activar no se puede entrar
        let login = json!({"email": "elena@acompanar.test", "password": "Segura2025"});
        server
            .post("/auth/login")
            .json(&login)
            .await
            .assert_status_unauthorized();

        let token = token_del_correo(&state, "elena@acompanar.test");
        server
            .post("/auth/activar")
            .json(&json!({"token": token}))
            .await
            .assert_status_ok();

        let response = server.post("/auth/login").json(&login).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["tipo"], "psicologo");
        assert!(body["token"].as_str().is_some());

        // El token es de un solo uso
        server
            .post("/auth/activar")
            .json(&json!({"token": token}))
            .await
            .assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_registro_email_duplicado(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // El email ya existe como paciente
        let response = server
            .post("/auth/registro")
            .json(&registro("lucia@acompanar.test", "9876543"))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_registro_cedula_duplicada(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/auth/registro")
            .json(&registro("nuevo@acompanar.test", "1234567"))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_registro_validaciones(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Cédula de 6 dígitos
        server
            .post("/auth/registro")
            .json(&registro("uno@acompanar.test", "123456"))
            .await
            .assert_status_bad_request();

        // Contraseña sin dígitos
        let mut body = registro("dos@acompanar.test", "7654321");
        body["password"] = json!("sinnumeros");
        server
            .post("/auth/registro")
            .json(&body)
            .await
            .assert_status_bad_request();

        // Email inválido
        server
            .post("/auth/registro")
            .json(&registro("no-es-un-email", "7654321"))
            .await
            .assert_status_bad_request();

        Ok(())
    }

    // ============================================================
    // POST /auth/login
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_login_success(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "ana@acompanar.test", "password": PASSWORD}))
            .await;
        response.assert_status_ok();

        let headers = response.headers();
        assert!(
            headers.get("set-cookie").is_some(),
            "Set-Cookie header should be present"
        );
        let auth_header = headers
            .get("authorization")
            .expect("Authorization header should be present")
            .to_str()
            .unwrap();
        assert!(auth_header.starts_with("Bearer "));

        let body: Value = response.json();
        assert_eq!(body["usuario"]["id"], 1);
        assert_eq!(body["usuario"]["nombre"], "Ana García López");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_login_por_tipo(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        for (email, tipo) in [
            ("admin@acompanar.test", "admin"),
            ("lucia@acompanar.test", "paciente"),
        ] {
            let response = server
                .post("/auth/login")
                .json(&json!({"email": email, "password": PASSWORD}))
                .await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["tipo"], tipo);
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_login_wrong_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/auth/login")
            .json(&json!({"email": "ana@acompanar.test", "password": "Incorrecta1"}))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_login_nonexistent_user(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/auth/login")
            .json(&json!({"email": "nadie@acompanar.test", "password": PASSWORD}))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_login_cuenta_inactiva_y_suspendida(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/auth/login")
            .json(&json!({"email": "carla@acompanar.test", "password": PASSWORD}))
            .await
            .assert_status_unauthorized();

        server
            .post("/auth/login")
            .json(&json!({"email": "diego@acompanar.test", "password": PASSWORD}))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    // ============================================================
    // POST /auth/recuperar + POST /auth/restablecer
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_recuperar_y_restablecer(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/auth/recuperar")
            .json(&json!({"email": "bruno@acompanar.test"}))
            .await
            .assert_status_ok();
        let token = token_del_correo(&state, "bruno@acompanar.test");

        // Contraseña débil: el token no se consume
        server
            .post("/auth/restablecer")
            .json(&json!({"token": token, "password": "corta"}))
            .await
            .assert_status_bad_request();

        server
            .post("/auth/restablecer")
            .json(&json!({"token": token, "password": "NuevaClave9"}))
            .await
            .assert_status_ok();

        server
            .post("/auth/login")
            .json(&json!({"email": "bruno@acompanar.test", "password": PASSWORD}))
            .await
            .assert_status_unauthorized();
        server
            .post("/auth/login")
            .json(&json!({"email": "bruno@acompanar.test", "password": "NuevaClave9"}))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_recuperar_email_desconocido(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Misma respuesta exista o no la cuenta, y sin correo
        server
            .post("/auth/recuperar")
            .json(&json!({"email": "nadie@acompanar.test"}))
            .await
            .assert_status_ok();
        assert!(state.mailer.enviados().is_empty());
        Ok(())
    }

    // ============================================================
    // Activación de pacientes
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_activar_paciente_exige_password(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/pacientes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({
                "nombre": "Pedro",
                "apellidos": "Quintana",
                "email": "pedro@acompanar.test"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let token = token_del_correo(&state, "pedro@acompanar.test");

        server
            .post("/auth/activar")
            .json(&json!({"token": token}))
            .await
            .assert_status_bad_request();

        server
            .post("/auth/activar")
            .json(&json!({"token": token, "password": "MiClave2025"}))
            .await
            .assert_status_ok();

        server
            .post("/auth/login")
            .json(&json!({"email": "pedro@acompanar.test", "password": "MiClave2025"}))
            .await
            .assert_status_ok();
        Ok(())
    }

    // ============================================================
    // authentication_middleware
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_middleware_sin_token(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server.get("/psicologos/me").await.assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_middleware_token_invalido(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .get("/psicologos/me")
            .add_header(AUTHORIZATION, bearer("no.es.un.jwt"))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_middleware_cuenta_suspendida(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let token = create_test_jwt(
            4,
            acompanar::entities::TipoUsuario::Psicologo,
            "diego@acompanar.test",
        );
        server
            .get("/psicologos/me")
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    // ============================================================
    // Admin inicial
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios")))]
    async fn test_bootstrap_admin(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let config = Config {
            admin_email: Some("Root@Acompanar.test".to_string()),
            admin_password: Some("RootClave1".to_string()),
            ..test_config()
        };
        bootstrap_admin(&state, &config).await.unwrap();
        // Idempotente
        bootstrap_admin(&state, &config).await.unwrap();

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "root@acompanar.test", "password": "RootClave1"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["tipo"], "admin");
        Ok(())
    }
}
