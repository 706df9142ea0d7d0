//! User CRUD and slow-read endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rand::thread_rng;

use crate::api::error::ApiError;
use crate::domain::{NewUser, User};
use crate::service::AppState;

/// POST /api/v1/users
pub async fn create_user(
    State(st): State<AppState>,
    Json(user): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let created = st.service.create(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(st): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    match st.service.read(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound(format!("user {id}"))),
    }
}

/// PATCH /api/v1/users - updates the user identified by the body's id
pub async fn update_user(
    State(st): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(st.service.update(user).await?))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(st): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    st.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users
pub async fn list_users(State(st): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(st.service.find_all().await?))
}

/// GET /api/v1/users/:id/slow/:latency - read through the latency-injected path
pub async fn get_user_slowly(
    State(st): State<AppState>,
    Path((id, latency_class)): Path<(u64, u32)>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(st.service.find_one_slowly(latency_class, id).await?))
}

/// GET /api/v1/users/random - slow read of a randomly picked (class, id) pair
pub async fn get_random_user(State(st): State<AppState>) -> Result<Json<User>, ApiError> {
    // Pick before awaiting; ThreadRng must not cross an await point.
    let probe = st.service.random_probe(&mut thread_rng());
    let user = st
        .service
        .find_one_slowly(probe.latency_class, probe.id)
        .await?;
    Ok(Json(user))
}
