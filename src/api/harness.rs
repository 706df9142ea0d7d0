//! Harness trigger endpoints.
//!
//! Both triggers block until the harness returns and answer with an empty
//! acknowledgement. Per-item failures and sweep timeouts are absorbed here;
//! they are visible in logs and report fields only. A 500 means the
//! dispatcher itself could not run the work to completion.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::api::error::ApiError;
use crate::service::AppState;

/// POST /api/v1/harness/load - seed the store with synthetic users
pub async fn run_batch_load(State(st): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    st.service.seed_users().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/harness/sweep - exhaust the slow read path concurrently
pub async fn run_sweep(State(st): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    st.service.sweep_slow_reads().await?;
    Ok(StatusCode::NO_CONTENT)
}
