//! Server library - expone los módulos principales para los tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod jobs;
pub mod repositories;
pub mod services;

// Re-export de los tipos principales para facilitar el import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// Margen para las cabeceras multipart por encima del tamaño máximo de archivo
const MARGEN_MULTIPART: usize = 64 * 1024;

/// Crea el router principal de la aplicación
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .merge(configure_usuario_routes(state.clone()))
        .merge(configure_agenda_routes(state.clone()))
        .nest("/chats", configure_chat_routes(state.clone()))
        .merge(configure_soporte_routes(state.clone()))
        .nest("/foros", configure_foro_routes(state.clone()))
        .merge(configure_terapia_routes(state.clone()))
        .merge(configure_test_routes(state.clone()))
        .merge(configure_varios_routes(state.clone()))
        .merge(configure_admin_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura las routes de autenticación (registro, login, tokens)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::auth::*;
    Router::new()
        .route("/registro", post(registrar_psicologo))
        .route("/activar", post(activar_cuenta))
        .route("/login", post(login))
        .route("/recuperar", post(recuperar_password))
        .route("/restablecer", post(restablecer_password))
}

/// Perfil del psicólogo y gestión de pacientes
fn configure_usuario_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::{paciente, psicologo};

    Router::new()
        .route(
            "/psicologos/me",
            get(psicologo::get_perfil)
                .patch(psicologo::update_perfil)
                .delete(psicologo::delete_cuenta),
        )
        .route("/psicologos/me/password", patch(psicologo::cambiar_password))
        .route(
            "/pacientes",
            get(paciente::list_pacientes).post(paciente::crear_paciente),
        )
        .route("/pacientes/me", get(paciente::get_mi_ficha))
        .route(
            "/pacientes/{id}",
            get(paciente::get_paciente)
                .patch(paciente::update_paciente)
                .delete(paciente::delete_paciente),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Agendas semanales y citas
fn configure_agenda_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::agenda::*;

    Router::new()
        .route("/agendas", get(get_agenda))
        .route("/agendas/{id}", patch(update_agenda))
        .route("/citas", get(list_citas).post(crear_cita))
        .route(
            "/citas/{id}",
            get(get_cita).patch(update_cita).delete(delete_cita),
        )
        .route("/citas/{id}/confirmar", post(confirmar_cita))
        .route("/pacientes/me/citas", get(mis_citas))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura las routes del chat psicólogo-paciente
fn configure_chat_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, chat_membership_middleware};
    use services::chat::*;

    // Rutas que NO requieren membership (solo autenticación)
    let public_routes = Router::new()
        .route("/", get(list_chats).post(crear_chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // Rutas que requieren membership (autenticación + membership middleware)
    let member_routes = Router::new()
        .route("/{chat_id}/mensajes", get(get_mensajes).post(enviar_mensaje))
        .route("/{chat_id}/leidos", post(marcar_leidos))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            chat_membership_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(member_routes)
}

/// Chat de soporte entre psicólogos y administración
fn configure_soporte_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::soporte::*;

    Router::new()
        .route(
            "/soporte/mensajes",
            get(get_mis_mensajes).post(enviar_mi_mensaje),
        )
        .route("/admin/soporte", get(list_hilos))
        .route(
            "/admin/soporte/{chat_id}/mensajes",
            get(get_mensajes_hilo).post(responder_hilo),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura las routes de foros y moderación
fn configure_foro_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, foro_participante_middleware};
    use services::{foro, moderacion};

    // El acceso al foro se resuelve dentro de cada handler
    let public_routes = Router::new()
        .route("/", get(foro::list_foros).post(foro::crear_foro))
        .route(
            "/{foro_id}",
            get(foro::get_foro)
                .patch(foro::update_foro)
                .delete(foro::delete_foro),
        )
        .route("/{foro_id}/unirse", post(foro::unirse))
        .route("/{foro_id}/salir", post(foro::salir))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    let member_routes = Router::new()
        .route(
            "/{foro_id}/participantes",
            get(foro::list_participantes).post(foro::agregar_participante),
        )
        .route(
            "/{foro_id}/participantes/{usuario_tipo}/{usuario_id}",
            delete(moderacion::expulsar),
        )
        .route(
            "/{foro_id}/participantes/{usuario_tipo}/{usuario_id}/rol",
            patch(moderacion::cambiar_rol),
        )
        .route(
            "/{foro_id}/temas",
            get(foro::list_temas).post(foro::crear_tema),
        )
        .route(
            "/{foro_id}/temas/{tema_id}",
            get(foro::get_tema).delete(moderacion::eliminar_tema),
        )
        .route(
            "/{foro_id}/temas/{tema_id}/mensajes",
            get(foro::list_mensajes).post(foro::publicar_mensaje),
        )
        .route("/{foro_id}/temas/{tema_id}/cerrar", post(moderacion::cerrar_tema))
        .route("/{foro_id}/temas/{tema_id}/abrir", post(moderacion::abrir_tema))
        .route(
            "/{foro_id}/mensajes/{mensaje_id}",
            patch(foro::editar_mensaje).delete(foro::eliminar_mensaje),
        )
        .route(
            "/{foro_id}/baneos",
            get(moderacion::list_baneos).post(moderacion::banear),
        )
        .route(
            "/{foro_id}/baneos/{baneo_id}",
            delete(moderacion::levantar_baneo),
        )
        .route("/{foro_id}/moderacion", get(moderacion::list_bitacora))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            foro_participante_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(member_routes)
}

/// Módulos, actividades, asignaciones y evidencias
fn configure_terapia_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::{actividad, modulo};

    let limite = state.max_upload_bytes + MARGEN_MULTIPART;

    Router::new()
        .route(
            "/modulos",
            get(modulo::list_modulos).post(modulo::crear_modulo),
        )
        .route(
            "/modulos/{id}",
            get(modulo::get_modulo)
                .patch(modulo::update_modulo)
                .delete(modulo::delete_modulo),
        )
        .route(
            "/actividades",
            get(actividad::list_actividades).post(actividad::crear_actividad),
        )
        .route(
            "/actividades/{id}",
            patch(actividad::update_actividad).delete(actividad::delete_actividad),
        )
        .route(
            "/pacientes/{id}/actividades",
            get(actividad::list_asignaciones_paciente).post(actividad::asignar_actividad),
        )
        .route("/pacientes/me/actividades", get(actividad::mis_asignaciones))
        .route(
            "/asignaciones/{id}",
            delete(actividad::delete_asignacion),
        )
        .route(
            "/asignaciones/{id}/completar",
            post(actividad::completar_asignacion),
        )
        .route(
            "/asignaciones/{id}/retroalimentacion",
            patch(actividad::retroalimentar),
        )
        .route(
            "/asignaciones/{id}/evidencias",
            get(actividad::list_evidencias)
                .post(actividad::subir_evidencia)
                .layer(DefaultBodyLimit::max(limite)),
        )
        .route(
            "/evidencias/{id}",
            delete(actividad::delete_evidencia),
        )
        .route("/evidencias/{id}/archivo", get(actividad::descargar_evidencia))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Tests psicométricos y sus aplicaciones
fn configure_test_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::test::*;

    Router::new()
        .route("/tests", get(list_tests).post(crear_test))
        .route("/tests/{id}", get(get_test).delete(delete_test))
        .route(
            "/pacientes/{id}/tests",
            get(list_aplicaciones_paciente).post(asignar_test),
        )
        .route("/pacientes/me/tests", get(mis_aplicaciones))
        .route("/aplicaciones/{id}", get(get_aplicacion))
        .route("/aplicaciones/{id}/respuestas", post(responder))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Notas clínicas, notificaciones y reportes
fn configure_varios_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::{nota, notificacion, reporte};

    Router::new()
        .route(
            "/pacientes/{id}/notas",
            get(nota::list_notas).post(nota::crear_nota),
        )
        .route(
            "/notas/{id}",
            get(nota::get_nota)
                .patch(nota::update_nota)
                .delete(nota::delete_nota),
        )
        .route("/notificaciones", get(notificacion::list_notificaciones))
        .route("/notificaciones/leidas", post(notificacion::marcar_todas))
        .route(
            "/notificaciones/{id}",
            delete(notificacion::delete_notificacion),
        )
        .route("/notificaciones/{id}/leida", post(notificacion::marcar_leida))
        .route("/reportes/resumen", get(reporte::resumen))
        .route("/reportes/pacientes/{id}", get(reporte::reporte_paciente))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Administración de la plataforma
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::admin::*;

    Router::new()
        .route("/admin/psicologos", get(list_psicologos))
        .route(
            "/admin/psicologos/{id}",
            delete(delete_psicologo),
        )
        .route("/admin/psicologos/{id}/suspension", patch(set_suspension))
        .route("/admin/estadisticas", get(estadisticas))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
