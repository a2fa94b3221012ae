//! Integration tests para tests psicométricos
//!
//! Fixture `terapia`: test 1 con tres preguntas de 0 a 3 y una aplicación
//! pendiente para Lucía.
//!
//! Test para:
//! - GET/POST /tests, GET/DELETE /tests/{id}
//! - GET/POST /pacientes/{id}/tests, GET /pacientes/me/tests
//! - GET /aplicaciones/{id}, POST /aplicaciones/{id}/respuestas

mod common;

#[cfg(test)]
mod psicometria_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    // ============================================================
    // Tests
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_crear_test_admin(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let cuerpo = json!({
            "nombre": "Escala de añoranza",
            "modulo_id": 2,
            "preguntas": [
                {"texto": "Echo de menos su voz", "valor_min": 1, "valor_max": 5},
                {"texto": "Sueño con la persona", "valor_min": 1, "valor_max": 5}
            ]
        });

        server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&cuerpo)
            .await
            .assert_status_forbidden();

        let response = server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .json(&cuerpo)
            .await;
        response.assert_status(StatusCode::CREATED);
        let test: Value = response.json();
        let preguntas = test["preguntas"].as_array().unwrap();
        assert_eq!(preguntas.len(), 2);
        assert_eq!(preguntas[0]["orden"], 1);
        assert_eq!(preguntas[1]["orden"], 2);

        let tests: Vec<Value> = server
            .get("/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert_eq!(tests.len(), 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_crear_test_invalido(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Sin preguntas
        server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .json(&json!({"nombre": "Vacío", "preguntas": []}))
            .await
            .assert_status_bad_request();

        // Rango invertido
        let response = server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .json(&json!({
                "nombre": "Rango roto",
                "preguntas": [
                    {"texto": "Bien", "valor_min": 0, "valor_max": 3},
                    {"texto": "Mal", "valor_min": 3, "valor_max": 3}
                ]
            }))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["details"].as_str().unwrap().contains("preguntas[1]"));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_crear_test_valores_extremos(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .json(&json!({
                "nombre": "Escala sin límites",
                "preguntas": [
                    {"texto": "Primera", "valor_min": 0, "valor_max": i64::MAX},
                    {"texto": "Segunda", "valor_min": 0, "valor_max": i64::MAX}
                ]
            }))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["details"].as_str().unwrap().contains("valor_max"));

        // En el límite sí se admite
        server
            .post("/tests")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .json(&json!({
                "nombre": "Escala amplia",
                "preguntas": [{"texto": "Única", "valor_min": -1000, "valor_max": 1000}]
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let tests: Vec<Value> = server
            .get("/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert_eq!(tests.len(), 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_delete_test(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .delete("/tests/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_forbidden();
        server
            .delete("/tests/1")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/tests/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();

        // Las aplicaciones del test desaparecen con él
        let mias: Vec<Value> = server
            .get("/pacientes/me/tests")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .json();
        assert!(mias.is_empty());
        Ok(())
    }

    // ============================================================
    // Aplicaciones
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_asignar_test(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/pacientes/2/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"test_id": 1}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let aplicacion: Value = response.json();
        assert_eq!(aplicacion["estado"], "pendiente");
        assert!(aplicacion["puntaje_total"].is_null());

        let notificaciones: Vec<Value> = server
            .get("/notificaciones")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .json();
        assert_eq!(notificaciones[0]["tipo"], "test");

        let aplicaciones: Vec<Value> = server
            .get("/pacientes/2/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert_eq!(aplicaciones.len(), 1);
        assert_eq!(aplicaciones[0]["test_nombre"], "Inventario de duelo breve");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_asignar_test_conflictos(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Lucía ya lo tiene pendiente
        server
            .post("/pacientes/1/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"test_id": 1}))
            .await
            .assert_status(StatusCode::CONFLICT);
        server
            .post("/pacientes/1/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"test_id": 99}))
            .await
            .assert_status_not_found();
        server
            .post("/pacientes/3/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"test_id": 1}))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_responder_calcula_puntaje(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/aplicaciones/1/respuestas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"respuestas": [
                {"pregunta_id": 3, "valor": 1},
                {"pregunta_id": 1, "valor": 3},
                {"pregunta_id": 2, "valor": 2}
            ]}))
            .await;
        response.assert_status_ok();
        let aplicacion: Value = response.json();
        assert_eq!(aplicacion["estado"], "completada");
        assert_eq!(aplicacion["puntaje_total"], 6);
        assert_eq!(aplicacion["resultados"].as_array().unwrap().len(), 3);
        assert_eq!(aplicacion["test"]["nombre"], "Inventario de duelo breve");

        let notificaciones: Vec<Value> = server
            .get("/notificaciones")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert!(notificaciones.iter().any(|n| n["titulo"] == "Test respondido"));

        // Segunda vez
        server
            .post("/aplicaciones/1/respuestas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"respuestas": [
                {"pregunta_id": 1, "valor": 0},
                {"pregunta_id": 2, "valor": 0},
                {"pregunta_id": 3, "valor": 0}
            ]}))
            .await
            .assert_status(StatusCode::CONFLICT);

        // Tras responder se puede volver a asignar
        server
            .post("/pacientes/1/tests")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"test_id": 1}))
            .await
            .assert_status(StatusCode::CREATED);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_responder_invalido(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        let casos = [
            // falta una
            json!([{"pregunta_id": 1, "valor": 1}, {"pregunta_id": 2, "valor": 1}]),
            // repetida
            json!([
                {"pregunta_id": 1, "valor": 1},
                {"pregunta_id": 1, "valor": 2},
                {"pregunta_id": 2, "valor": 1}
            ]),
            // fuera de rango
            json!([
                {"pregunta_id": 1, "valor": 1},
                {"pregunta_id": 2, "valor": 4},
                {"pregunta_id": 3, "valor": 1}
            ]),
        ];
        for respuestas in casos {
            server
                .post("/aplicaciones/1/respuestas")
                .add_header(AUTHORIZATION, bearer(&token_lucia()))
                .json(&json!({"respuestas": respuestas}))
                .await
                .assert_status_bad_request();
        }

        let guardadas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resultados_test")
            .fetch_one(&pool)
            .await?;
        assert_eq!(guardadas, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "terapia")))]
    async fn test_aplicacion_visibilidad(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/aplicaciones/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await;
        response.assert_status_ok();
        let aplicacion: Value = response.json();
        assert_eq!(aplicacion["test"]["preguntas"].as_array().unwrap().len(), 3);

        server
            .get("/aplicaciones/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_not_found();
        server
            .get("/aplicaciones/1")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status_not_found();

        // Solo la paciente responde
        server
            .post("/aplicaciones/1/respuestas")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"respuestas": []}))
            .await
            .assert_status_forbidden();
        server
            .post("/aplicaciones/1/respuestas")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .json(&json!({"respuestas": []}))
            .await
            .assert_status_not_found();
        Ok(())
    }
}
