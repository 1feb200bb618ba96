use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod actions;
pub mod auth;
pub mod departments;
pub mod document_types;
pub mod documents;
pub mod health;
pub mod persons;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let departments_routes = Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/:id",
            patch(departments::update_department).delete(departments::delete_department),
        );

    let sites_routes = Router::new()
        .route(
            "/",
            get(departments::list_sites).post(departments::create_site),
        )
        .route(
            "/:id",
            patch(departments::update_site).delete(departments::delete_site),
        );

    let persons_routes = Router::new()
        .route("/", get(persons::list_persons).post(persons::create_person))
        .route(
            "/:id",
            get(persons::get_person)
                .patch(persons::update_person)
                .delete(persons::delete_person),
        )
        .route(
            "/:id/phones",
            get(persons::list_phones).post(persons::add_phone),
        )
        .route(
            "/:id/usernames",
            get(persons::list_username_mappings).post(persons::add_username_mapping),
        );

    let users_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            patch(users::update_user).delete(users::delete_user),
        );

    let actions_routes = Router::new()
        .route("/", get(actions::list_actions).post(actions::create_action))
        .route(
            "/:id",
            patch(actions::update_action).delete(actions::delete_action),
        );

    let document_types_routes = Router::new()
        .route(
            "/",
            get(document_types::list_document_types).post(document_types::create_document_type),
        )
        .route(
            "/:id",
            patch(document_types::update_document_type)
                .delete(document_types::delete_document_type),
        );

    let documents_routes = Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/:id",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/:id/actions",
            get(documents::list_document_actions).post(documents::record_document_action),
        );

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/departments", departments_routes)
        .nest("/api/sites", sites_routes)
        .nest("/api/persons", persons_routes)
        .nest("/api/users", users_routes)
        .nest("/api/actions", actions_routes)
        .nest("/api/document-types", document_types_routes)
        .nest("/api/documents", documents_routes)
        .route("/api/phones/:id", delete(persons::delete_phone))
        .route(
            "/api/person-usernames/:id",
            delete(persons::delete_username_mapping),
        )
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
}
