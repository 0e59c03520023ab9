// SPDX-License-Identifier: MIT

//! Firestore trigger endpoints.
//!
//! One route per document trigger binding. Payloads carry the before/after
//! snapshots and the path parameters of the triggering document. Handlers
//! always answer 200 on no-op paths and on best-effort delivery failures;
//! only primary data-path failures return 500 so the platform redelivers.

use crate::models::{Appointment, Message, Subscription};
use crate::services::notifier;
use crate::services::Notification;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Firestore trigger routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/appointment-created", post(appointment_created))
        .route("/events/appointment-updated", post(appointment_updated))
        .route("/events/message-created", post(message_created))
        .route("/events/subscription-written", post(subscription_written))
}

/// Creation event for `citas/{citaId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentCreatedEvent {
    cita_id: String,
    cita: Appointment,
}

/// Update event for `citas/{citaId}` with both snapshots.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentUpdatedEvent {
    cita_id: String,
    before: Appointment,
    after: Appointment,
}

/// Creation event for `chats/{chatId}/messages/{messageId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageCreatedEvent {
    chat_id: String,
    message: Message,
}

/// Write event (create/update/delete) for
/// `customers/{userId}/subscriptions/{subscriptionId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionWrittenEvent {
    user_id: String,
    #[serde(default)]
    before: Option<Subscription>,
    #[serde(default)]
    after: Option<Subscription>,
}

/// Parse an event payload, or `None` with a log entry.
///
/// A malformed payload can never become valid on redelivery, so the callers
/// answer 200 for it rather than putting the event into a retry loop.
fn parse_event<T: for<'de> Deserialize<'de>>(event: serde_json::Value) -> Option<T> {
    match serde_json::from_value(event) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse trigger event");
            None
        }
    }
}

/// New appointment: notify the practitioner.
async fn appointment_created(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    let Some(event) = parse_event::<AppointmentCreatedEvent>(payload) else {
        return StatusCode::OK;
    };

    let Some(kine_id) = event.cita.kine_id.as_deref() else {
        // Appointment without a practitioner; nothing to notify.
        return StatusCode::OK;
    };

    let user = match state.db.get_user(kine_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, kine_id, "Failed to fetch practitioner");
            // Fetch failure on creation fails the invocation so the
            // platform retries the event.
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let tokens = user.map(|u| u.tokens().to_vec()).unwrap_or_default();

    state
        .fcm
        .send_to_tokens(
            &tokens,
            Notification::new(
                notifier::TITLE_NEW_APPOINTMENT,
                notifier::new_appointment_body(event.cita.paciente_nombre.as_deref()),
            ),
            &[
                ("type", json!("cita")),
                ("citaId", json!(event.cita_id)),
                ("pacienteId", json!(event.cita.paciente_id.unwrap_or_default())),
            ],
        )
        .await;

    StatusCode::OK
}

/// Appointment status change: notify the patient on notifiable transitions.
async fn appointment_updated(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    let Some(event) = parse_event::<AppointmentUpdatedEvent>(payload) else {
        return StatusCode::OK;
    };

    if event.before.estado == event.after.estado {
        return StatusCode::OK;
    }

    let Some(body) =
        notifier::status_change_body(event.after.kine_nombre.as_deref(), event.after.estado)
    else {
        tracing::debug!(
            cita_id = %event.cita_id,
            estado = %event.after.estado,
            "Status transition does not notify"
        );
        return StatusCode::OK;
    };

    let Some(paciente_id) = event.after.paciente_id.as_deref() else {
        tracing::warn!(cita_id = %event.cita_id, "Appointment has no patient to notify");
        return StatusCode::OK;
    };

    // Delivery path: lookup and send failures never fail the invocation.
    let tokens = match state.db.get_user(paciente_id).await {
        Ok(user) => user.map(|u| u.tokens().to_vec()).unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, paciente_id, "Failed to fetch patient for notification");
            return StatusCode::OK;
        }
    };

    state
        .fcm
        .send_to_tokens(
            &tokens,
            Notification::new(notifier::TITLE_APPOINTMENT_STATUS, body),
            &[
                ("type", json!("cita_estado")),
                ("citaId", json!(event.cita_id)),
                ("estado", json!(event.after.estado.as_str())),
            ],
        )
        .await;

    StatusCode::OK
}

/// New chat message: notify the recipient with a preview.
async fn message_created(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    let Some(event) = parse_event::<MessageCreatedEvent>(payload) else {
        return StatusCode::OK;
    };

    let Some(receiver_id) = event.message.receiver_id.as_deref() else {
        tracing::warn!(chat_id = %event.chat_id, "Message without receiverId, skipping");
        return StatusCode::OK;
    };

    // Delivery path: lookup and send failures never disrupt chat persistence.
    let tokens = match state.db.get_user(receiver_id).await {
        Ok(user) => user.map(|u| u.tokens().to_vec()).unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, receiver_id, "Failed to fetch message recipient");
            return StatusCode::OK;
        }
    };

    if tokens.is_empty() {
        tracing::debug!(receiver_id, "Recipient has no device tokens");
        return StatusCode::OK;
    }

    state
        .fcm
        .send_to_tokens(
            &tokens,
            Notification::new(
                notifier::TITLE_NEW_MESSAGE,
                notifier::new_message_body(
                    event.message.sender_name.as_deref(),
                    event.message.text(),
                ),
            ),
            &[
                ("type", json!("mensaje")),
                (
                    "chatWith",
                    json!(event.message.sender_id.unwrap_or_default()),
                ),
                ("chatId", json!(event.chat_id)),
            ],
        )
        .await;

    StatusCode::OK
}

/// Subscription write: re-derive the user's plan tier from the new status.
async fn subscription_written(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    let Some(event) = parse_event::<SubscriptionWrittenEvent>(payload) else {
        return StatusCode::OK;
    };

    let Some(after) = event.after else {
        // Subscription deleted; the plan is left as-is.
        return StatusCode::OK;
    };

    if event
        .before
        .is_some_and(|before| before.status == after.status)
    {
        // Unchanged status, skip the redundant write.
        return StatusCode::OK;
    }

    let Some(fields) = notifier::plan_for_status(after.status) else {
        tracing::info!(
            user_id = %event.user_id,
            status = ?after.status,
            "Subscription status does not change the plan tier"
        );
        return StatusCode::OK;
    };

    // Primary data path: a failed plan update returns 500 so the platform
    // redelivers the write. The update is idempotent.
    if let Err(e) = state.db.update_user_plan(&event.user_id, &fields).await {
        tracing::error!(error = %e, user_id = %event.user_id, "Failed to update user plan");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    StatusCode::OK
}
