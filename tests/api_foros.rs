//! Integration tests para foros y moderación
//!
//! Fixture `foros`: foro 1 público (Ana admin, Bruno moderador, Lucía miembro),
//! foro 2 privado (solo Ana). Tema 1 abierto, tema 2 cerrado.
//!
//! Test para:
//! - GET/POST /foros, GET/PATCH/DELETE /foros/{foro_id}
//! - POST /foros/{foro_id}/unirse, POST /foros/{foro_id}/salir
//! - participantes, temas y mensajes
//! - baneos, roles, expulsiones, cierre de temas y bitácora
//! - foro_participante_middleware

mod common;

#[cfg(test)]
mod foro_tests {
    use super::common::*;
    use acompanar::jobs::barrido_diario;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn banear(server: &TestServer, token: &str, body: Value) -> axum_test::TestResponse {
        server
            .post("/foros/1/baneos")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&body)
            .await
    }

    async fn bitacora(server: &TestServer) -> Vec<Value> {
        server
            .get("/foros/1/moderacion")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json()
    }

    // ============================================================
    // Foros
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_list_foros_visibles(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let foros: Vec<Value> = server
            .get("/foros")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .json();
        assert_eq!(foros.len(), 1);
        assert_eq!(foros[0]["id"], 1);
        assert!(foros[0]["mi_rol"].is_null());

        let foros: Vec<Value> = server
            .get("/foros")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert_eq!(foros.len(), 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_crear_foro_creador_es_admin(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/foros")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .json(&json!({"titulo": "Duelo perinatal", "publico": true}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let foro: Value = response.json();

        let detalle: Value = server
            .get(&format!("/foros/{}", foro["id"]))
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .json();
        assert_eq!(detalle["mi_rol"], "admin");

        // Los pacientes no crean foros
        server
            .post("/foros")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"titulo": "Mío", "publico": true}))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_foro_privado(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .get("/foros/2")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_forbidden();
        server
            .post("/foros/2/unirse")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_forbidden();
        server
            .get("/foros/2/temas")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_forbidden();

        // Los admins de la plataforma actúan como admin de cualquier foro
        let response = server
            .get("/foros/2")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .await;
        response.assert_status_ok();
        let foro: Value = response.json();
        assert_eq!(foro["mi_rol"], "admin");

        // Ana añade a Bruno
        server
            .post("/foros/2/participantes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"usuario_tipo": "psicologo", "usuario_id": 2}))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .get("/foros/2/temas")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_update_y_delete_foro(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/foros/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .json(&json!({"titulo": "Nuevo título"}))
            .await
            .assert_status_forbidden();

        let response = server
            .patch("/foros/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"titulo": "Nuevo título"}))
            .await;
        response.assert_status_ok();
        let foro: Value = response.json();
        assert_eq!(foro["titulo"], "Nuevo título");

        server
            .delete("/foros/1")
            .add_header(AUTHORIZATION, bearer(&token_admin()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/foros/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // Participación
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_unirse_y_salir(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await;
        response.assert_status(StatusCode::CREATED);
        let participante: Value = response.json();
        assert_eq!(participante["rol"], "miembro");

        server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status(StatusCode::CONFLICT);

        let participantes: Vec<Value> = server
            .get("/foros/1/participantes")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .json();
        assert_eq!(participantes.len(), 4);

        server
            .post("/foros/1/salir")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_ultimo_admin_no_sale(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/foros/1/salir")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status(StatusCode::CONFLICT);

        // Con otro admin ya puede
        server
            .patch("/foros/1/participantes/psicologo/2/rol")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"rol": "admin"}))
            .await
            .assert_status_ok();
        server
            .post("/foros/1/salir")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        Ok(())
    }

    // ============================================================
    // Temas y mensajes
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_publicar_y_tema_cerrado(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let temas: Vec<Value> = server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .json();
        assert_eq!(temas.len(), 2);

        server
            .post("/foros/1/temas/1/mensajes")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"contenido": "Gracias por el espacio"}))
            .await
            .assert_status(StatusCode::CREATED);

        // El autor del tema recibe aviso
        let notificaciones: Vec<Value> = server
            .get("/notificaciones")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert!(notificaciones.iter().any(|n| n["tipo"] == "foro"));

        server
            .post("/foros/1/temas/2/mensajes")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"contenido": "¿Puedo escribir aquí?"}))
            .await
            .assert_status_forbidden();

        // Tema de otro foro
        server
            .get("/foros/2/temas/1")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_crear_tema(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"titulo": "Fechas difíciles", "contenido": "Se acerca su cumpleaños"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let tema: Value = response.json();
        assert_eq!(tema["cerrado"], false);

        let mensajes: Vec<Value> = server
            .get(&format!("/foros/1/temas/{}/mensajes", tema["id"]))
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .json();
        assert_eq!(mensajes.len(), 1);
        assert_eq!(mensajes[0]["contenido"], "Se acerca su cumpleaños");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_editar_mensaje_solo_autor(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .json(&json!({"contenido": "Editado por otro"}))
            .await
            .assert_status_forbidden();

        let response = server
            .patch("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"contenido": "Hola a todos, soy Lucía, de Valencia"}))
            .await;
        response.assert_status_ok();
        let mensaje: Value = response.json();
        assert!(!mensaje["editado_en"].is_null());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_moderador_elimina_mensaje(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Un miembro no borra mensajes ajenos
        server
            .delete("/foros/1/mensajes/2")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();

        server
            .delete("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status(StatusCode::CONFLICT);

        let mensajes: Vec<Value> = server
            .get("/foros/1/temas/1/mensajes")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .json();
        let borrado = mensajes.iter().find(|m| m["id"] == 1).unwrap();
        assert_eq!(borrado["eliminado"], true);
        assert!(borrado["contenido"].is_null());

        // El autor edita un mensaje borrado: conflicto
        server
            .patch("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .json(&json!({"contenido": "Vuelvo"}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let entradas = bitacora(&server).await;
        assert_eq!(entradas.len(), 1);
        assert_eq!(entradas[0]["accion"], "eliminar_mensaje");
        assert_eq!(entradas[0]["objetivo_tipo"], "paciente");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_autor_elimina_sin_bitacora(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .delete("/foros/1/mensajes/1")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert!(bitacora(&server).await.is_empty());
        Ok(())
    }

    // ============================================================
    // Baneos
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_baneo_bloquea_y_se_levanta(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = banear(
            &server,
            &token_bruno(),
            json!({
                "usuario_tipo": "paciente",
                "usuario_id": 1,
                "motivo": "Lenguaje ofensivo",
                "duracion_horas": 24
            }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        let baneo: Value = response.json();
        assert_eq!(baneo["activo"], true);
        assert!(!baneo["fin"].is_null());

        let response = server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await;
        response.assert_status_forbidden();
        let error: Value = response.json();
        assert!(error["details"].as_str().unwrap().contains("Lenguaje ofensivo"));

        server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();

        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "paciente", "usuario_id": 1, "motivo": "Otra vez"}),
        )
        .await
        .assert_status(StatusCode::CONFLICT);

        let activos: Vec<Value> = server
            .get("/foros/1/baneos")
            .add_query_param("activos", true)
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .json();
        assert_eq!(activos.len(), 1);

        let response = server
            .delete(&format!("/foros/1/baneos/{}", baneo["id"]))
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await;
        response.assert_status_ok();
        let levantado: Value = response.json();
        assert_eq!(levantado["activo"], false);

        server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_ok();

        let acciones: Vec<Value> = bitacora(&server)
            .await
            .into_iter()
            .map(|e| e["accion"].clone())
            .collect();
        assert_eq!(acciones, vec![json!("desbanear"), json!("banear")]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_reglas_de_baneo(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Moderador contra admin del foro
        banear(
            &server,
            &token_bruno(),
            json!({"usuario_tipo": "psicologo", "usuario_id": 1, "motivo": "x"}),
        )
        .await
        .assert_status_forbidden();

        // Un miembro no modera
        banear(
            &server,
            &token_lucia(),
            json!({"usuario_tipo": "psicologo", "usuario_id": 2, "motivo": "x"}),
        )
        .await
        .assert_status_forbidden();

        // A sí mismo
        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "psicologo", "usuario_id": 1, "motivo": "x"}),
        )
        .await
        .assert_status_bad_request();

        // Admin de la plataforma
        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "admin", "usuario_id": 1, "motivo": "x"}),
        )
        .await
        .assert_status_forbidden();

        // El admin del foro sí puede banear a un moderador
        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "psicologo", "usuario_id": 2, "motivo": "Abuso de moderación"}),
        )
        .await
        .assert_status(StatusCode::CREATED);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_baneo_preventivo_impide_unirse(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "paciente", "usuario_id": 2, "motivo": "Spam en otros foros"}),
        )
        .await
        .assert_status(StatusCode::CREATED);

        server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status_forbidden();

        server
            .post("/foros/1/participantes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"usuario_tipo": "paciente", "usuario_id": 2}))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_baneado_puede_salir(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        banear(
            &server,
            &token_bruno(),
            json!({"usuario_tipo": "paciente", "usuario_id": 1, "motivo": "Mensajes repetidos"}),
        )
        .await
        .assert_status(StatusCode::CREATED);

        server
            .post("/foros/1/salir")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let participantes: Vec<Value> = server
            .get("/foros/1/participantes")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .await
            .json();
        assert_eq!(participantes.len(), 2);

        // El baneo sigue vigente tras salir
        server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();
        server
            .post("/foros/1/salir")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_not_found();
        server
            .post("/foros/99/salir")
            .add_header(AUTHORIZATION, bearer(&token_mario()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_baneo_expirado_se_cierra(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());

        let inicio = Utc::now() - Duration::hours(48);
        let fin = Utc::now() - Duration::hours(24);
        sqlx::query(
            r#"
            INSERT INTO foro_baneos
                (foro_id, usuario_tipo, usuario_id, motivo, baneado_por_tipo, baneado_por_id, inicio, fin, activo)
            VALUES (1, 'paciente', 1, 'Expirado', 'psicologo', 1, ?, ?, 1)
            "#,
        )
        .bind(inicio)
        .bind(fin)
        .execute(&pool)
        .await?;

        let barrido = barrido_diario(&state, Utc::now()).await.unwrap();
        assert_eq!(barrido.baneos_cerrados, 1);

        server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_ok();

        // Se puede volver a banear
        banear(
            &server,
            &token_ana(),
            json!({"usuario_tipo": "paciente", "usuario_id": 1, "motivo": "Reincide"}),
        )
        .await
        .assert_status(StatusCode::CREATED);
        Ok(())
    }

    // ============================================================
    // Roles, expulsiones y temas
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_cambiar_rol(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .patch("/foros/1/participantes/paciente/1/rol")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .json(&json!({"rol": "moderador"}))
            .await
            .assert_status_forbidden();

        server
            .patch("/foros/1/participantes/psicologo/1/rol")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"rol": "miembro"}))
            .await
            .assert_status_bad_request();

        let response = server
            .patch("/foros/1/participantes/paciente/1/rol")
            .add_header(AUTHORIZATION, bearer(&token_ana()))
            .json(&json!({"rol": "moderador"}))
            .await;
        response.assert_status_ok();
        let participante: Value = response.json();
        assert_eq!(participante["rol"], "moderador");

        let entradas = bitacora(&server).await;
        assert_eq!(entradas[0]["accion"], "cambiar_rol");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_expulsar(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .delete("/foros/1/participantes/psicologo/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_forbidden();

        server
            .delete("/foros/1/participantes/paciente/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/foros/1/temas")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();

        // Sin baneo puede volver a unirse
        server
            .post("/foros/1/unirse")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete("/foros/1/participantes/paciente/3")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("usuarios", "foros")))]
    async fn test_cerrar_abrir_y_eliminar_tema(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        server
            .post("/foros/1/temas/1/cerrar")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();

        let response = server
            .post("/foros/1/temas/1/cerrar")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await;
        response.assert_status_ok();
        let tema: Value = response.json();
        assert_eq!(tema["cerrado"], true);

        let response = server
            .post("/foros/1/temas/2/abrir")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await;
        let tema: Value = response.json();
        assert_eq!(tema["cerrado"], false);

        server
            .delete("/foros/1/temas/1")
            .add_header(AUTHORIZATION, bearer(&token_bruno()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/foros/1/temas/1")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_not_found();

        let acciones: Vec<Value> = bitacora(&server)
            .await
            .into_iter()
            .map(|e| e["accion"].clone())
            .collect();
        assert_eq!(
            acciones,
            vec![json!("eliminar_tema"), json!("abrir_tema"), json!("cerrar_tema")]
        );

        // La bitácora es solo para moderadores
        server
            .get("/foros/1/moderacion")
            .add_header(AUTHORIZATION, bearer(&token_lucia()))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
