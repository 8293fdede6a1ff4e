use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod conversations;
pub mod error;
pub mod listings;
pub mod middleware;
pub mod notifications;
pub mod state;
pub mod wizard;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let signed_in = Router::new()
        .merge(wizard::routes())
        .merge(conversations::routes())
        .merge(notifications::routes())
        .route_layer(from_fn(middleware::signed_in_middleware));

    let admin = admin::routes().route_layer(from_fn(middleware::admin_middleware));

    Router::new()
        .merge(listings::routes())
        .merge(signed_in)
        .merge(admin)
        .layer(from_fn_with_state(state.clone(), middleware::session_middleware))
        .route("/health", get(health))
        .merge(auth::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
