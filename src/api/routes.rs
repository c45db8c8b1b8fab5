use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

const ALLOWED_METHODS: &str = "GET, POST, DELETE, OPTIONS, PUT";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

pub fn create_router(state: Arc<AppState>) -> Router {
    // Answers preflights and stamps the allowed origin on every response
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
            Method::PUT,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/change-password",
            post(handlers::change_password).put(handlers::change_password),
        )
        .route(
            "/counter",
            get(handlers::get_counter)
                .post(handlers::increment_counter)
                .delete(handlers::reset_counter),
        )
        .route("/version", get(handlers::version))
        .route("/health", get(handlers::health))
        .layer(cors)
        // Non-preflight responses advertise the allowed methods and headers too
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
