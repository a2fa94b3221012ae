//! Test services - tests psicométricos, aplicaciones y respuestas

use super::comun::{es_psicologo_o_paciente, notificar, paciente_propio};
use crate::core::{Actor, AppError, AppState, require_tipo};
use crate::dtos::{
    AplicacionDTO, AplicacionResumenDTO, AsignarTestDTO, CreateAplicacionDTO,
    CreateNotificacionDTO, CreateTestDTO, RespuestaDTO, RespuestasDTO, TestDTO,
};
use crate::entities::{
    AplicacionTest, EstadoAplicacion, PreguntaTest, TipoNotificacion, TipoUsuario,
};
use crate::repositories::{Create, Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use futures::future;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Comprueba que cada pregunta tenga exactamente una respuesta dentro de su rango
/// y devuelve el puntaje total
fn puntuar(preguntas: &[PreguntaTest], respuestas: &[RespuestaDTO]) -> Result<i64, String> {
    if respuestas.len() != preguntas.len() {
        return Err(format!(
            "Se esperaban {} respuestas y llegaron {}",
            preguntas.len(),
            respuestas.len()
        ));
    }

    let mut vistas = HashSet::new();
    let mut total: i64 = 0;
    for respuesta in respuestas {
        let pregunta = preguntas
            .iter()
            .find(|p| p.id == respuesta.pregunta_id)
            .ok_or_else(|| format!("La pregunta {} no es de este test", respuesta.pregunta_id))?;
        if !vistas.insert(pregunta.id) {
            return Err(format!("La pregunta {} está respondida dos veces", pregunta.id));
        }
        if !pregunta.admite(respuesta.valor) {
            return Err(format!(
                "Pregunta {}: el valor debe estar entre {} y {}",
                pregunta.id, pregunta.valor_min, pregunta.valor_max
            ));
        }
        total = total
            .checked_add(respuesta.valor)
            .ok_or_else(|| "El puntaje total se sale del rango admitido".to_string())?;
    }
    Ok(total)
}

async fn aplicacion(state: &AppState, aplicacion_id: i64) -> Result<AplicacionTest, AppError> {
    state
        .aplicacion
        .read(&aplicacion_id)
        .await?
        .ok_or_else(|| AppError::not_found("Aplicación no encontrada"))
}

async fn test_completo(state: &AppState, test_id: i64) -> Result<TestDTO, AppError> {
    state
        .test
        .read_completo(&test_id)
        .await?
        .ok_or_else(|| AppError::not_found("Test no encontrado"))
}

#[instrument(skip(state))]
pub async fn list_tests(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TestDTO>>, AppError> {
    debug!("Listing tests");
    let tests = state.test.list().await?;
    let preguntas = future::try_join_all(tests.iter().map(|t| state.test.preguntas(&t.id))).await?;
    let resultado = tests
        .into_iter()
        .zip(preguntas)
        .map(|(test, preguntas)| TestDTO { test, preguntas })
        .collect();
    Ok(Json(resultado))
}

#[instrument(skip(state))]
pub async fn get_test(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<i64>,
) -> Result<Json<TestDTO>, AppError> {
    Ok(Json(test_completo(&state, test_id).await?))
}

#[instrument(skip(state, actor, body), fields(admin_id = %actor.id))]
pub async fn crear_test(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateTestDTO>,
) -> Result<(StatusCode, Json<TestDTO>), AppError> {
    debug!("Creating test");
    // 1. Solo admins
    // 2. Al menos una pregunta, cada una con valor_min < valor_max
    // 3. Test y preguntas en una transacción
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    body.validate()?;
    if let Some((i, _)) = body
        .preguntas
        .iter()
        .enumerate()
        .find(|(_, p)| p.valor_min >= p.valor_max)
    {
        return Err(AppError::bad_request("Error de validación")
            .with_details(format!("preguntas[{}]: valor_min debe ser menor que valor_max", i)));
    }
    if let Some(modulo_id) = body.modulo_id {
        state
            .modulo
            .read(&modulo_id)
            .await?
            .ok_or_else(|| AppError::bad_request("El módulo indicado no existe"))?;
    }

    let test = state.test.create_con_preguntas(&body).await?;
    info!("Test {} created with {} questions", test.test.id, test.preguntas.len());
    Ok((StatusCode::CREATED, Json(test)))
}

#[instrument(skip(state, actor), fields(admin_id = %actor.id))]
pub async fn delete_test(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(test_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_tipo(&actor, &[TipoUsuario::Admin])?;
    test_completo(&state, test_id).await?;
    state.test.delete(&test_id).await?;
    info!("Test {} deleted", test_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor, body), fields(psicologo_id = %actor.id))]
pub async fn asignar_test(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
    Json(body): Json<AsignarTestDTO>,
) -> Result<(StatusCode, Json<AplicacionTest>), AppError> {
    debug!("Assigning test");
    // 1. Paciente propio y test existente
    // 2. 409 si el mismo test sigue pendiente para el paciente
    // 3. Crear la aplicación y avisar al paciente
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    let paciente = paciente_propio(&state, &actor, paciente_id).await?;
    let test = test_completo(&state, body.test_id).await?;

    if state
        .aplicacion
        .existe_pendiente(&test.test.id, &paciente.id)
        .await?
    {
        warn!("Test {} already pending for paciente {}", test.test.id, paciente.id);
        return Err(AppError::conflict("El paciente ya tiene este test pendiente"));
    }

    let aplicacion = state
        .aplicacion
        .create(&CreateAplicacionDTO {
            test_id: test.test.id,
            paciente_id: paciente.id,
            psicologo_id: actor.id,
        })
        .await?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Paciente,
            paciente.id,
            TipoNotificacion::Test,
            "Nuevo test",
            format!("Tienes pendiente el test \"{}\"", test.test.nombre),
        ),
    )
    .await;
    Ok((StatusCode::CREATED, Json(aplicacion)))
}

#[instrument(skip(state, actor), fields(psicologo_id = %actor.id))]
pub async fn list_aplicaciones_paciente(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(paciente_id): Path<i64>,
) -> Result<Json<Vec<AplicacionResumenDTO>>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Psicologo])?;
    paciente_propio(&state, &actor, paciente_id).await?;
    Ok(Json(state.aplicacion.list_de_paciente(&paciente_id).await?))
}

#[instrument(skip(state, actor), fields(paciente_id = %actor.id))]
pub async fn mis_aplicaciones(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<AplicacionResumenDTO>>, AppError> {
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    Ok(Json(state.aplicacion.list_de_paciente(&actor.id).await?))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn get_aplicacion(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(aplicacion_id): Path<i64>,
) -> Result<Json<AplicacionDTO>, AppError> {
    let aplicacion = aplicacion(&state, aplicacion_id).await?;
    if !es_psicologo_o_paciente(&actor, aplicacion.psicologo_id, aplicacion.paciente_id) {
        return Err(AppError::not_found("Aplicación no encontrada"));
    }
    let test = test_completo(&state, aplicacion.test_id).await?;
    let resultados = state.aplicacion.resultados(&aplicacion.id).await?;
    Ok(Json(AplicacionDTO {
        aplicacion,
        test,
        resultados,
    }))
}

#[debug_handler]
#[instrument(skip(state, actor, body), fields(paciente_id = %actor.id))]
pub async fn responder(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(aplicacion_id): Path<i64>,
    Json(body): Json<RespuestasDTO>,
) -> Result<Json<AplicacionDTO>, AppError> {
    debug!("Answering test");
    // 1. Solo el paciente de la aplicación, y solo si sigue pendiente
    // 2. Una respuesta por pregunta, dentro de rango
    // 3. Guardar respuestas y puntaje en una transacción
    // 4. Avisar al psicólogo
    require_tipo(&actor, &[TipoUsuario::Paciente])?;
    let aplicacion = aplicacion(&state, aplicacion_id).await?;
    if aplicacion.paciente_id != actor.id {
        return Err(AppError::not_found("Aplicación no encontrada"));
    }
    if aplicacion.estado == EstadoAplicacion::Completada {
        return Err(AppError::conflict("El test ya fue respondido"));
    }

    let test = test_completo(&state, aplicacion.test_id).await?;
    let total = puntuar(&test.preguntas, &body.respuestas).map_err(|detalle| {
        warn!("Invalid answers: {}", detalle);
        AppError::bad_request("Respuestas inválidas").with_details(detalle)
    })?;

    let completada = state
        .aplicacion
        .responder(&aplicacion.id, &body.respuestas, total)
        .await?
        .ok_or_else(|| AppError::conflict("El test ya fue respondido"))?;

    notificar(
        &state,
        CreateNotificacionDTO::new(
            TipoUsuario::Psicologo,
            completada.psicologo_id,
            TipoNotificacion::Test,
            "Test respondido",
            format!(
                "{} respondió \"{}\" (puntaje {})",
                actor.nombre, test.test.nombre, total
            ),
        ),
    )
    .await;

    let resultados = state.aplicacion.resultados(&completada.id).await?;
    info!("Aplicacion {} completed with score {}", completada.id, total);
    Ok(Json(AplicacionDTO {
        aplicacion: completada,
        test,
        resultados,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pregunta(id: i64, min: i64, max: i64) -> PreguntaTest {
        PreguntaTest {
            id,
            test_id: 1,
            texto: format!("Pregunta {}", id),
            orden: id,
            valor_min: min,
            valor_max: max,
        }
    }

    fn respuesta(pregunta_id: i64, valor: i64) -> RespuestaDTO {
        RespuestaDTO { pregunta_id, valor }
    }

    #[test]
    fn test_puntuar_suma_valores() {
        let preguntas = vec![pregunta(1, 0, 3), pregunta(2, 0, 3)];
        let total = puntuar(&preguntas, &[respuesta(2, 3), respuesta(1, 1)]).unwrap();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_puntuar_rechaza_faltantes_y_duplicadas() {
        let preguntas = vec![pregunta(1, 0, 3), pregunta(2, 0, 3)];
        assert!(puntuar(&preguntas, &[respuesta(1, 1)]).is_err());
        assert!(puntuar(&preguntas, &[respuesta(1, 1), respuesta(1, 2)]).is_err());
    }

    #[test]
    fn test_puntuar_rechaza_fuera_de_rango_y_ajenas() {
        let preguntas = vec![pregunta(1, 1, 5)];
        assert!(puntuar(&preguntas, &[respuesta(1, 0)]).is_err());
        assert!(puntuar(&preguntas, &[respuesta(1, 6)]).is_err());
        assert!(puntuar(&preguntas, &[respuesta(9, 3)]).is_err());
        assert_eq!(puntuar(&preguntas, &[respuesta(1, 5)]), Ok(5));
    }

    #[test]
    fn test_puntuar_rechaza_desbordamiento() {
        let preguntas = vec![pregunta(1, 0, i64::MAX), pregunta(2, 0, i64::MAX)];
        let total = puntuar(&preguntas, &[respuesta(1, i64::MAX), respuesta(2, i64::MAX)]);
        assert!(total.is_err());
    }
}
