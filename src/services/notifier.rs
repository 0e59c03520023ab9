// SPDX-License-Identifier: MIT

//! Notification and plan-sync decision logic.
//!
//! Pure functions shared by the trigger handlers: what to say for a status
//! transition, how to preview a chat message, which plan tier a subscription
//! status maps to. Keeping these free of I/O keeps the handlers thin and the
//! decision tables directly testable.

use crate::models::{AppointmentStatus, PlanFields, SubscriptionStatus};

pub const TITLE_NEW_APPOINTMENT: &str = "📅 Nueva solicitud de cita";
pub const TITLE_NEW_MESSAGE: &str = "💬 Nuevo mensaje";
pub const TITLE_APPOINTMENT_STATUS: &str = "📅 Estado de tu cita";

/// Reason note written by the expiry sweep.
pub const EXPIRED_CANCEL_REASON: &str = "Cita vencida: cancelada automáticamente";

/// Maximum characters of a chat message shown in the push preview.
pub const PREVIEW_MAX_CHARS: usize = 60;

/// Body for the new-appointment notification to the practitioner.
pub fn new_appointment_body(paciente_nombre: Option<&str>) -> String {
    format!(
        "{} ha solicitado una cita.",
        paciente_nombre.unwrap_or("Un paciente")
    )
}

/// Preview of a chat message: the first [`PREVIEW_MAX_CHARS`] characters,
/// with an ellipsis marker when the original is longer.
pub fn message_preview(text: &str) -> String {
    let preview: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    if text.chars().count() > PREVIEW_MAX_CHARS {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Body for the new-message notification to the recipient.
pub fn new_message_body(sender_name: Option<&str>, text: &str) -> String {
    format!(
        "{}: {}",
        sender_name.unwrap_or("Alguien"),
        message_preview(text)
    )
}

/// Message for the patient when an appointment transitions to `after`.
///
/// Returns `None` for transitions that do not notify (e.g. completion).
/// The caller is responsible for skipping unchanged statuses.
pub fn status_change_body(kine_nombre: Option<&str>, after: AppointmentStatus) -> Option<String> {
    let kine = kine_nombre.unwrap_or("tu kinesiólogo");

    if after.is_accepted() {
        Some(format!("Tu cita con {} fue aceptada ✅", kine))
    } else if after.is_rejected() {
        Some(format!("Tu cita con {} fue rechazada ❌", kine))
    } else if after == AppointmentStatus::Cancelada {
        Some(format!("Tu cita con {} fue cancelada", kine))
    } else {
        None
    }
}

/// Plan tier a subscription status maps to.
///
/// `None` means the status does not change the billing tier: unrecognized or
/// in-between provider states (`past_due`, `incomplete`, `paused`, unknown)
/// deliberately leave the plan untouched.
pub fn plan_for_status(status: SubscriptionStatus) -> Option<PlanFields> {
    match status {
        SubscriptionStatus::Active | SubscriptionStatus::Trialing => Some(PlanFields::pro()),
        SubscriptionStatus::Canceled
        | SubscriptionStatus::Unpaid
        | SubscriptionStatus::IncompleteExpired => Some(PlanFields::estandar()),
        SubscriptionStatus::PastDue
        | SubscriptionStatus::Incomplete
        | SubscriptionStatus::Paused
        | SubscriptionStatus::Unknown => None,
    }
}
