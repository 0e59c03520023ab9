// SPDX-License-Identifier: MIT

//! Appointment model and the canonical status vocabulary.
//!
//! Every reader and writer goes through [`AppointmentStatus`]; status strings
//! never appear as literals at call sites.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format a UTC timestamp the way appointment dates are stored: RFC3339 with
/// whole seconds and a `Z` suffix. Query cutoffs use the same formatter so
/// string range filters compare lexicographically.
pub(crate) fn format_rfc3339_secs(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serde for `fechaCita`: writes through [`format_rfc3339_secs`] so stored
/// values never carry fractional seconds, reads any RFC3339 string.
mod rfc3339_secs {
    use super::format_rfc3339_secs;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format_rfc3339_secs(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw).map(|parsed| parsed.with_timezone(&Utc))
            })
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

/// Appointment document stored in `citas/{citaId}`.
///
/// Created by the booking flow in the mobile app; this service only reacts
/// to lifecycle changes and expires stale pending appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Document ID, populated on reads from Firestore.
    #[serde(default, rename = "_firestore_id", skip_serializing)]
    pub id: Option<String>,
    /// Practitioner (kinesiologist) user ID
    #[serde(default)]
    pub kine_id: Option<String>,
    /// Patient user ID
    #[serde(default)]
    pub paciente_id: Option<String>,
    #[serde(default)]
    pub paciente_nombre: Option<String>,
    #[serde(default)]
    pub kine_nombre: Option<String>,
    pub estado: AppointmentStatus,
    /// Scheduled date/time, stored as a whole-second RFC3339 UTC string
    #[serde(default, with = "rfc3339_secs")]
    pub fecha_cita: Option<DateTime<Utc>>,
    /// Set when the sweeper auto-cancels an expired appointment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo_cancelacion: Option<String>,
}

impl Appointment {
    /// True if the appointment is still pending and its scheduled time has
    /// passed. Appointments without a scheduled time never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.estado == AppointmentStatus::Pendiente
            && self.fecha_cita.is_some_and(|fecha| fecha < now)
    }
}

/// Canonical appointment status tokens.
///
/// Upper-case is the single serialization; mixed-case documents are a data
/// bug, not something this service tolerates silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Pendiente,
    Aceptada,
    Confirmada,
    Denegada,
    Rechazada,
    Cancelada,
    Completada,
}

impl AppointmentStatus {
    /// Accepted-class statuses notify the patient with an acceptance message.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Aceptada | Self::Confirmada)
    }

    /// Rejected-class statuses notify the patient with a rejection message.
    pub fn is_rejected(self) -> bool {
        matches!(self, Self::Denegada | Self::Rechazada)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Aceptada => "ACEPTADA",
            Self::Confirmada => "CONFIRMADA",
            Self::Denegada => "DENEGADA",
            Self::Rechazada => "RECHAZADA",
            Self::Cancelada => "CANCELADA",
            Self::Completada => "COMPLETADA",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
