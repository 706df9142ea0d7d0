pub mod error;
pub mod harness;
pub mod users;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, service::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    Router::new()
        .nest("/api/v1", v1_router(state))
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs,
                ))),
        )
        .layer(TraceLayer::new_for_http())
}

fn v1_router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user).patch(users::update_user))
        .route("/users/random", get(users::get_random_user))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/slow/:latency", get(users::get_user_slowly))
        .route("/harness/load", post(harness::run_batch_load))
        .route("/harness/sweep", post(harness::run_sweep))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
