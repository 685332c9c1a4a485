use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{director, messages, operator, user};
use crate::middleware::token_auth;
use crate::state::AppState;

/// Create the main API router with all versions
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", v1_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn v1_router(state: AppState) -> Router {
    Router::new()
        // MessageAPI
        .route("/messages/get", post(messages::get))
        .route("/messages/get-all", post(messages::get_all))
        .route("/messages/put", post(messages::put))
        .route("/messages/delete", post(messages::delete))
        .route("/messages/delete-all", post(messages::delete_all))
        .route("/messages/watch", post(messages::watch))
        // OperatorAPI
        .route("/operator/status", post(operator::set_user_status))
        // DirectorAPI
        .route("/director/actors", get(director::get_actors))
        .route("/director/result", post(director::put_result))
        // UserAPI
        .route("/user/ready", post(user::im_ready))
        .route("/user/ping", get(user::ping))
        .layer(from_fn_with_state(state.clone(), token_auth))
        .with_state(state)
}
