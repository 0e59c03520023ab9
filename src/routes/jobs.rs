// SPDX-License-Identifier: MIT

//! Scheduled and maintenance job endpoints.
//!
//! `/jobs/expire-appointments` is invoked hourly by Cloud Scheduler;
//! `/jobs/init-device-tokens` is a one-off repair job for legacy user
//! documents, triggered by running its (paused) scheduler job on demand.
//! Both endpoints reject requests that did not come through the scheduler.

use crate::services::notifier::EXPIRED_CANCEL_REASON;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;

/// Job routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs/expire-appointments", post(expire_appointments))
        .route("/jobs/init-device-tokens", post(init_device_tokens))
}

/// Check that the request comes from Cloud Scheduler.
/// The platform strips this header from external requests, so its presence
/// guarantees internal origin.
fn is_from_scheduler(headers: &HeaderMap) -> bool {
    headers
        .get("x-cloudscheduler")
        .and_then(|h| h.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false)
}

/// Cancel pending appointments whose scheduled time has passed.
async fn expire_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> StatusCode {
    if !is_from_scheduler(&headers) {
        tracing::warn!("Blocked expire-appointments request without scheduler header");
        return StatusCode::FORBIDDEN;
    }

    let now = chrono::Utc::now();

    let expired = match state.db.find_expired_pending(now).await {
        Ok(citas) => citas,
        Err(e) => {
            tracing::error!(error = %e, "Failed to query expired appointments");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    // Second guard against clock skew between query evaluation and `now`;
    // the query already filters server-side.
    let ids: Vec<String> = expired
        .iter()
        .filter(|cita| cita.is_expired(now))
        .filter_map(|cita| cita.id.clone())
        .collect();

    if ids.is_empty() {
        tracing::info!("No expired appointments to cancel");
        return StatusCode::OK;
    }

    if let Err(e) = state
        .db
        .cancel_appointments(&ids, EXPIRED_CANCEL_REASON)
        .await
    {
        tracing::error!(error = %e, "Failed to cancel expired appointments");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    tracing::info!(count = ids.len(), "Expired appointments cancelled");
    StatusCode::OK
}

/// Initialize `deviceTokens` on user documents that lack the field.
async fn init_device_tokens(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> StatusCode {
    if !is_from_scheduler(&headers) {
        tracing::warn!("Blocked init-device-tokens request without scheduler header");
        return StatusCode::FORBIDDEN;
    }

    match state.db.init_missing_device_tokens().await {
        Ok(repaired) => {
            tracing::info!(repaired, "Device-token repair complete");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Device-token repair failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
