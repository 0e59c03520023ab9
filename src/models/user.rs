//! User model and plan-tier fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Patient capacity for the standard tier.
pub const STANDARD_PATIENT_LIMIT: i64 = 50;
/// Sentinel for "unlimited" patients on the pro tier.
pub const PRO_PATIENT_LIMIT: i64 = 9999;

/// User document stored in `usuarios/{userId}`.
///
/// Only the fields this service reads or writes are modelled; documents
/// carry more and those must never be clobbered (all writes use field masks).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document ID, populated on reads from Firestore.
    #[serde(default, rename = "_firestore_id", skip_serializing)]
    pub id: Option<String>,
    /// Push-delivery tokens; absent on legacy documents until the
    /// init-device-tokens job repairs them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_tokens: Option<Vec<String>>,
    #[serde(default)]
    pub plan: Option<PlanTier>,
    #[serde(default)]
    pub is_pro: Option<bool>,
    #[serde(default)]
    pub perfil_destacado: Option<bool>,
    #[serde(default)]
    pub limite_pacientes: Option<i64>,
}

impl User {
    pub fn tokens(&self) -> &[String] {
        self.device_tokens.as_deref().unwrap_or_default()
    }
}

/// Billing tier, encoded on the user document as `plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Pro,
    Estandar,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pro => f.write_str("pro"),
            Self::Estandar => f.write_str("estandar"),
        }
    }
}

/// The plan fields written together when a user's tier changes.
///
/// Applied as a partial update (field mask), never a full overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFields {
    pub plan: PlanTier,
    pub is_pro: bool,
    pub perfil_destacado: bool,
    pub limite_pacientes: i64,
}

impl PlanFields {
    pub fn pro() -> Self {
        Self {
            plan: PlanTier::Pro,
            is_pro: true,
            perfil_destacado: true,
            limite_pacientes: PRO_PATIENT_LIMIT,
        }
    }

    pub fn estandar() -> Self {
        Self {
            plan: PlanTier::Estandar,
            is_pro: false,
            perfil_destacado: false,
            limite_pacientes: STANDARD_PATIENT_LIMIT,
        }
    }
}
